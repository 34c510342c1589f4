//! SHA-256 checksum utility for drift detection.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 checksum of a script's exact byte content,
/// rendered as 64 lowercase hex characters.
pub fn compute_checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let result = hasher.finalize();
    format!("{:x}", result)
}
