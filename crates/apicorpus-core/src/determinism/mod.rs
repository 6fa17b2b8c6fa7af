//! Determinism helpers: canonical JSON and content hashing.

pub mod canonical_json;
pub mod hashing;
