//! Deterministic hashing utilities.
//!
//! All content hashes are sha256 over canonical JSON bytes, prefixed with a
//! domain label so a content hash can never collide with another kind of key.

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::determinism::canonical_json;
use crate::errors::CorpusResult;

/// Hash raw bytes under a domain label.
pub fn hash_with_domain_hex(domain: &str, bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(domain.as_bytes());
    h.update([0u8]);
    h.update(bytes);
    hex::encode(h.finalize())
}

/// Hash a JSON value by its canonical encoding.
pub fn hash_canonical_json_hex(value: &Value) -> CorpusResult<String> {
    let bytes = canonical_json::to_canonical_bytes(value)?;
    Ok(hash_with_domain_hex(crate::domain::CONTENT, &bytes))
}
