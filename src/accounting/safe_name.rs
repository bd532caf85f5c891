// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! Maps an arbitrary user-visible model name to a stable, filesystem- and
//! SQL-identifier-safe token, so arbitrary names never appear in table
//! identifiers.

use sha2::{Digest, Sha256};

/// First 16 hex characters of the SHA-256 digest, prefixed so the result
/// is always a valid SQL identifier even for names that start with a digit.
pub fn safe_token(original: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(original.as_bytes());
    let digest = hasher.finalize();
    format!("m_{}", hex::encode(&digest[..8]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_deterministic() {
        assert_eq!(safe_token("llama-3-8b"), safe_token("llama-3-8b"));
    }

    #[test]
    fn differs_for_different_names() {
        assert_ne!(safe_token("llama-3-8b"), safe_token("llama-3-8b-instruct"));
    }

    #[test]
    fn is_a_valid_sql_identifier_shape() {
        let token = safe_token("!!!weird/name??");
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
        assert!(token.starts_with("m_"));
    }
}
