//! String <-> enum conversions for the columns that store them as TEXT.

use tribal_core::model::{DatePrecision, EntityType, RelationType, SourceType, TemporalRelationKind};

pub fn source_type_to_str(st: SourceType) -> &'static str {
    match st {
        SourceType::UserExplicit => "user_explicit",
        SourceType::AutoCapture => "auto_capture",
        SourceType::Correction => "correction",
        SourceType::CrossInstance => "cross_instance",
        SourceType::Legacy => "legacy",
        SourceType::Unknown => "unknown",
    }
}

pub fn source_type_from_str(s: &str) -> SourceType {
    match s {
        "user_explicit" => SourceType::UserExplicit,
        "auto_capture" => SourceType::AutoCapture,
        "correction" => SourceType::Correction,
        "cross_instance" => SourceType::CrossInstance,
        "legacy" => SourceType::Legacy,
        _ => SourceType::Unknown,
    }
}

pub fn entity_type_to_str(t: EntityType) -> &'static str {
    match t {
        EntityType::Service => "service",
        EntityType::Technology => "technology",
        EntityType::Database => "database",
        EntityType::Worker => "worker",
        EntityType::Cache => "cache",
        EntityType::Gateway => "gateway",
        EntityType::Server => "server",
        EntityType::Client => "client",
        EntityType::Person => "person",
        EntityType::Place => "place",
        EntityType::Organization => "organization",
        EntityType::Date => "date",
        EntityType::Event => "event",
        EntityType::Product => "product",
        EntityType::Concept => "concept",
    }
}

pub fn entity_type_from_str(s: &str) -> EntityType {
    match s {
        "service" => EntityType::Service,
        "technology" => EntityType::Technology,
        "database" => EntityType::Database,
        "worker" => EntityType::Worker,
        "cache" => EntityType::Cache,
        "gateway" => EntityType::Gateway,
        "server" => EntityType::Server,
        "client" => EntityType::Client,
        "person" => EntityType::Person,
        "place" => EntityType::Place,
        "organization" => EntityType::Organization,
        "date" => EntityType::Date,
        "event" => EntityType::Event,
        "product" => EntityType::Product,
        _ => EntityType::Concept,
    }
}

pub fn relation_type_to_str(t: RelationType) -> &'static str {
    match t {
        RelationType::Uses => "uses",
        RelationType::ConnectsTo => "connects_to",
        RelationType::StoresIn => "stores_in",
        RelationType::DependsOn => "depends_on",
        RelationType::Calls => "calls",
        RelationType::Handles => "handles",
    }
}

pub fn relation_type_from_str(s: &str) -> Option<RelationType> {
    Some(match s {
        "uses" => RelationType::Uses,
        "connects_to" => RelationType::ConnectsTo,
        "stores_in" => RelationType::StoresIn,
        "depends_on" => RelationType::DependsOn,
        "calls" => RelationType::Calls,
        "handles" => RelationType::Handles,
        _ => return None,
    })
}

pub fn temporal_relation_to_str(r: TemporalRelationKind) -> &'static str {
    match r {
        TemporalRelationKind::OccurredOn => "occurred_on",
        TemporalRelationKind::MentionedDate => "mentioned_date",
    }
}

pub fn temporal_relation_from_str(s: &str) -> TemporalRelationKind {
    match s {
        "occurred_on" => TemporalRelationKind::OccurredOn,
        _ => TemporalRelationKind::MentionedDate,
    }
}

pub fn precision_to_str(p: DatePrecision) -> &'static str {
    match p {
        DatePrecision::Day => "day",
        DatePrecision::Month => "month",
        DatePrecision::Year => "year",
    }
}

pub fn precision_from_str(s: &str) -> DatePrecision {
    match s {
        "month" => DatePrecision::Month,
        "year" => DatePrecision::Year,
        _ => DatePrecision::Day,
    }
}

/// Little-endian f32 packing for the `vector` BLOB column.
pub fn f32_vec_to_bytes(v: &[f32]) -> Vec<u8> {
    v.iter().flat_map(|f| f.to_le_bytes()).collect()
}

pub fn bytes_to_f32_vec(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// Cosine similarity; converts an L2 distance on normalized vectors via
/// `cos = max(0, 1 - dist^2 / 2)` where that path is used instead.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| (*x as f64) * (*y as f64)).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
