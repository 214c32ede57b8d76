//! Shared identifier validation. Any id used in a string-equality filter
//! against a persistent backend must pass this check first — a security
//! contract, not an optimization, per the vector/graph/session store
//! designs.

use std::sync::OnceLock;

use regex::Regex;

use crate::constants::ID_SHAPE_PATTERN;
use crate::errors::StorageError;

fn id_shape_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(ID_SHAPE_PATTERN).expect("static id shape pattern is valid"))
}

/// Validate that `value` is alphanumeric-plus-hyphen shaped, rejecting
/// anything else (including empty strings) before it reaches a query
/// builder that might embed it directly.
pub fn validate_id_shape(value: &str) -> Result<(), StorageError> {
    if id_shape_regex().is_match(value) {
        Ok(())
    } else {
        Err(StorageError::InvalidIdShape {
            value: value.to_string(),
            pattern: ID_SHAPE_PATTERN,
        })
    }
}
