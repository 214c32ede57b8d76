//! Persistent `Bm25Store` implementation backed by SQLite FTS5.

use rusqlite::params;

use tribal_core::errors::StorageError;
use tribal_core::traits::{Bm25Hit, Bm25Store};

use crate::sqlite_err;
use crate::sqlite_store::SqliteStore;

/// Strip FTS5 operator-reserved punctuation and the `NEAR` keyword so a
/// caller-supplied query string cannot smuggle query syntax into the
/// engine. What survives is a bag of bareword tokens, ANDed by FTS5's
/// default (no explicit operator between terms).
fn sanitize_query(query: &str) -> String {
    let scrubbed: String = query
        .chars()
        .map(|c| match c {
            '"' | '*' | '^' | ':' | '(' | ')' | '-' => ' ',
            other => other,
        })
        .collect();

    scrubbed
        .split_whitespace()
        .filter(|tok| !tok.eq_ignore_ascii_case("NEAR") && !tok.eq_ignore_ascii_case("AND") && !tok.eq_ignore_ascii_case("OR") && !tok.eq_ignore_ascii_case("NOT"))
        .collect::<Vec<_>>()
        .join(" ")
}

impl Bm25Store for SqliteStore {
    fn index(&self, id: &str, content: &str, tags: &[String]) -> Result<(), StorageError> {
        let tags_joined = tags.join(" ");
        self.with_writer(|conn| {
            conn.execute("DELETE FROM memories_fts WHERE id = ?1", params![id])
                .map_err(sqlite_err)?;
            conn.execute(
                "INSERT INTO memories_fts (id, content, tags) VALUES (?1, ?2, ?3)",
                params![id, content, tags_joined],
            )
            .map_err(sqlite_err)?;
            Ok(())
        })
    }

    fn delete(&self, id: &str) -> Result<(), StorageError> {
        self.with_writer(|conn| {
            conn.execute("DELETE FROM memories_fts WHERE id = ?1", params![id])
                .map_err(sqlite_err)?;
            Ok(())
        })
    }

    fn search(&self, query: &str, limit: usize) -> Result<Vec<Bm25Hit>, StorageError> {
        let sanitized = sanitize_query(query);
        if sanitized.is_empty() {
            return Ok(vec![]);
        }

        self.with_reader(|conn| {
            let mut stmt = match conn.prepare(
                "SELECT id, rank FROM memories_fts WHERE memories_fts MATCH ?1 ORDER BY rank LIMIT ?2",
            ) {
                Ok(s) => s,
                Err(_) => return Ok(vec![]),
            };
            let rows = stmt.query_map(params![sanitized, limit as i64], |row| {
                Ok(Bm25Hit {
                    id: row.get(0)?,
                    rank: row.get(1)?,
                })
            });
            let rows = match rows {
                Ok(r) => r,
                Err(_) => return Ok(vec![]),
            };
            let mut out = Vec::new();
            for r in rows {
                match r {
                    Ok(hit) => out.push(hit),
                    // A residual syntax error mid-scan still yields an
                    // empty result rather than propagating.
                    Err(_) => return Ok(vec![]),
                }
            }
            Ok(out)
        })
    }

    fn count(&self) -> Result<usize, StorageError> {
        self.with_reader(|conn| {
            let n: i64 = conn
                .query_row("SELECT COUNT(*) FROM memories_fts", [], |r| r.get(0))
                .map_err(sqlite_err)?;
            Ok(n as usize)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    #[test]
    fn index_then_search_finds_match() {
        let store = new_store();
        store
            .index("m1", "the auth-service uses PostgreSQL", &["infra".to_string()])
            .unwrap();
        let hits = store.search("PostgreSQL", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "m1");
    }

    #[test]
    fn delete_removes_from_index() {
        let store = new_store();
        store.index("m1", "docker compose file", &[]).unwrap();
        store.delete("m1").unwrap();
        let hits = store.search("docker", 10).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn unbalanced_quotes_return_empty_not_error() {
        let store = new_store();
        store.index("m1", "some content", &[]).unwrap();
        let hits = store.search("\"unterminated", 10).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn reindexing_same_id_replaces_prior_entry() {
        let store = new_store();
        store.index("m1", "docker", &[]).unwrap();
        store.index("m1", "kubernetes", &[]).unwrap();
        assert_eq!(store.count().unwrap(), 1);
        assert!(store.search("docker", 10).unwrap().is_empty());
        assert!(!store.search("kubernetes", 10).unwrap().is_empty());
    }
}
