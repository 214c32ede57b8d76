//! Conflict-aware import of a portable bundle into a vector store.

use tracing::debug;

use tribal_core::errors::StorageError;
use tribal_core::model::{EmbeddingMetadata, MemoryEntry, PortableBundle};
use tribal_core::traits::VectorStore;

/// How to handle an id collision between an incoming bundle entry and an
/// entry already present in the target store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictResolution {
    /// Keep the existing entry; ignore the incoming one.
    Skip,
    /// Replace the existing entry unconditionally.
    Overwrite,
    /// Keep whichever entry has the newer `updated_at`.
    Merge,
}

impl Default for ConflictResolution {
    fn default() -> Self {
        ConflictResolution::Skip
    }
}

/// How to handle embeddings whose source model differs from the target's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReembeddingStrategy {
    /// Keep embeddings as-is regardless of model mismatch.
    Keep,
    /// Always drop embeddings; the caller re-embeds afterward.
    Drop,
    /// Drop only when source and target metadata are incompatible.
    Auto,
}

impl Default for ReembeddingStrategy {
    fn default() -> Self {
        ReembeddingStrategy::Auto
    }
}

#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub conflict_resolution: ConflictResolution,
    pub embedding_strategy: ReembeddingStrategy,
    /// When set, no mutations reach the store; every count still reflects
    /// what would have happened.
    pub dry_run: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ImportSummary {
    pub total: usize,
    pub imported: usize,
    pub skipped: usize,
    pub overwritten: usize,
    pub errors: usize,
    pub needs_reembedding: bool,
    pub duration_ms: u64,
    pub error_details: Vec<String>,
}

/// Import every entry in `bundle` into `store`, resolving id collisions
/// per `options.conflict_resolution` and embedding compatibility per
/// `options.embedding_strategy`.
pub fn import_bundle(
    bundle: &PortableBundle,
    store: &dyn VectorStore,
    target_metadata: &EmbeddingMetadata,
    options: &ImportOptions,
) -> ImportSummary {
    let start = std::time::Instant::now();
    let mut summary = ImportSummary {
        total: bundle.entries.len(),
        ..Default::default()
    };

    let compatible = bundle.manifest.embedding.compatible_with(target_metadata);
    let should_drop = match options.embedding_strategy {
        ReembeddingStrategy::Drop => true,
        ReembeddingStrategy::Auto => !compatible,
        ReembeddingStrategy::Keep => false,
    };
    summary.needs_reembedding = should_drop;

    for source_entry in &bundle.entries {
        let mut entry = source_entry.clone();
        if should_drop {
            entry.embedding = None;
        }

        let existing = match store.get(&entry.id) {
            Ok(existing) => existing,
            Err(err) => {
                summary.errors += 1;
                summary.error_details.push(format!("{}: {err}", entry.id));
                continue;
            }
        };

        match existing {
            None => import_new(entry, store, options, &mut summary),
            Some(existing_entry) => resolve_conflict(entry, existing_entry, store, options, &mut summary),
        }
    }

    summary.duration_ms = start.elapsed().as_millis() as u64;
    debug!(
        imported = summary.imported,
        skipped = summary.skipped,
        overwritten = summary.overwritten,
        errors = summary.errors,
        "bundle import complete"
    );
    summary
}

fn import_new(entry: MemoryEntry, store: &dyn VectorStore, options: &ImportOptions, summary: &mut ImportSummary) {
    if options.dry_run {
        summary.imported += 1;
        return;
    }
    let id = entry.id.clone();
    match store.upsert(entry) {
        Ok(_) => summary.imported += 1,
        Err(err) => {
            summary.errors += 1;
            summary.error_details.push(format!("{id}: {err}"));
        }
    }
}

fn resolve_conflict(
    incoming: MemoryEntry,
    existing: MemoryEntry,
    store: &dyn VectorStore,
    options: &ImportOptions,
    summary: &mut ImportSummary,
) {
    let should_overwrite = match options.conflict_resolution {
        ConflictResolution::Skip => false,
        ConflictResolution::Overwrite => true,
        ConflictResolution::Merge => incoming.updated_at > existing.updated_at,
    };

    if !should_overwrite {
        summary.skipped += 1;
        return;
    }

    if options.dry_run {
        summary.overwritten += 1;
        return;
    }

    let id = incoming.id.clone();
    match store.upsert(incoming) {
        Ok(_) => summary.overwritten += 1,
        Err(err) => {
            summary.errors += 1;
            summary.error_details.push(format!("{id}: overwrite failed: {err}"));
        }
    }
}
