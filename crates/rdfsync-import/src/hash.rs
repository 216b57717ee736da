//! blake3 content hashing of input files.
//!
//! The digest lets the freshness check tell a real edit from a file whose
//! timestamp is too coarse to compare against the import time.

/// Hex-encoded blake3 digest of `bytes`.
pub fn content_hash(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}
