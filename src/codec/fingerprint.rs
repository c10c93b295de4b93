//! State hashes
//!
//! SHA-256 over the canonical encoding, rendered as lowercase hex.

use serde::Serialize;
use sha2::{Digest, Sha256};

use super::encode;
use crate::error::Result;

/// Fingerprint a value for use as an entry's `state_hash`
pub fn state_hash<V: Serialize + ?Sized>(value: &V) -> Result<String> {
    let text = encode(value)?;
    let digest = Sha256::digest(text.as_bytes());
    Ok(digest.iter().map(|b| format!("{:02x}", b)).collect())
}
