//! Checksum computation for bootstrap steps

use sha2::{Digest, Sha256};

/// SHA-256 of a SQL text, hex encoded
pub fn compute_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
