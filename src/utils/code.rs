// src/utils/code.rs

use std::collections::HashSet;

use crate::store::{ExamStore, StoreError};

/// Length of a generated test code.
pub const CODE_LEN: usize = 8;

const MAX_ATTEMPTS: usize = 16;

/// A fresh random code: the first 8 hex digits of a v4 UUID.
pub fn new_code() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..CODE_LEN].to_string()
}

/// Codes end up in file names, so only `[A-Za-z0-9_-]` is accepted.
pub fn is_safe_code(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= 64
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Draws codes until one is not yet in the ledger.
pub async fn generate_unique_code(store: &dyn ExamStore) -> Result<String, StoreError> {
    let taken: HashSet<String> = store.codes().await?.into_iter().collect();
    for _ in 0..MAX_ATTEMPTS {
        let code = new_code();
        if !taken.contains(&code) {
            return Ok(code);
        }
        tracing::warn!("Generated test code {} collides with the ledger, retrying", code);
    }
    Err(StoreError::CodeSpaceExhausted(MAX_ATTEMPTS))
}
