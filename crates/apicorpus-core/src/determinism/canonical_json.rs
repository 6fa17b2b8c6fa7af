//! Canonical JSON encoding.
//!
//! Two semantically equal documents must produce identical bytes, otherwise
//! stored diffs and version control history are meaningless. The rules:
//! - object keys are sorted lexicographically (byte order) at every depth
//! - array order is preserved
//! - numbers and strings are emitted as serde_json formats them
//! - the pretty form uses two-space indentation and ends with a newline
//!
//! Keys are re-inserted in sorted order explicitly instead of relying on the
//! map type behind `serde_json::Map`, which changes when any crate in the
//! build enables `preserve_order`.

use itertools::Itertools;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::{CorpusError, CorpusResult};

fn canonicalize(v: &Value) -> Value {
    match v {
        Value::Object(obj) => {
            let mut out = Map::new();
            for (k, child) in obj.iter().sorted_by(|a, b| a.0.cmp(b.0)) {
                out.insert(k.clone(), canonicalize(child));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Compact canonical bytes, used for hashing.
pub fn to_canonical_bytes(v: &Value) -> CorpusResult<Vec<u8>> {
    let c = canonicalize(v);
    serde_json::to_vec(&c).map_err(|e| CorpusError::serialization(e.to_string()))
}

/// Pretty canonical bytes, used for everything written to the store.
pub fn to_canonical_pretty(v: &Value) -> CorpusResult<Vec<u8>> {
    let c = canonicalize(v);
    let mut buf = Vec::new();
    let fmt = serde_json::ser::PrettyFormatter::with_indent(b"  ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, fmt);
    c.serialize(&mut ser)
        .map_err(|e| CorpusError::serialization(e.to_string()))?;
    buf.push(b'\n');
    Ok(buf)
}

/// Serialize any value through `serde_json::Value` into the canonical pretty form.
pub fn serialize_canonical<T: Serialize>(value: &T) -> CorpusResult<Vec<u8>> {
    let v = serde_json::to_value(value)?;
    to_canonical_pretty(&v)
}
