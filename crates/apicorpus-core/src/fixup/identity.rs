//! Element identity for fixup matching.
//!
//! Two array elements are "the same element" when they share an identity key.
//! For objects the key comes from the first candidate field holding a
//! non-empty string or a number; everything else is keyed by its canonical
//! content hash. This is what lets a reordered list of operations or
//! parameters diff as moves instead of delete + insert pairs.

use std::fmt;

use serde_json::Value;

use crate::config::IdentityConfig;
use crate::determinism::hashing::hash_canonical_json_hex;
use crate::errors::CorpusResult;

/// Identity key of a single element.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElementKey {
    /// Declared identity: `(field, value)`.
    Field(String, String),
    /// Canonical content hash.
    Content(String),
}

impl ElementKey {
    /// Full textual form stored in fixup files.
    pub fn token(&self) -> String {
        match self {
            Self::Field(field, value) => format!("{field}={value}"),
            Self::Content(h) => format!("sha256:{h}"),
        }
    }
}

impl fmt::Display for ElementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(field, value) => write!(f, "{field}={value}"),
            Self::Content(h) => write!(f, "sha256:{}", &h[..h.len().min(12)]),
        }
    }
}

/// Ordered list of candidate identity fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityStrategy {
    fields: Vec<String>,
}

impl Default for IdentityStrategy {
    fn default() -> Self {
        Self::new(crate::defaults::IDENTITY_FIELDS.iter().copied())
    }
}

impl IdentityStrategy {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(cfg: &IdentityConfig) -> Self {
        Self::new(cfg.fields.iter().cloned())
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// First candidate field with a usable value, as `(field, value)`.
    pub fn declared_identity(&self, v: &Value) -> Option<(String, String)> {
        let obj = v.as_object()?;
        self.fields.iter().find_map(|field| {
            let value = match obj.get(field)? {
                Value::String(s) if !s.is_empty() => s.clone(),
                Value::Number(n) => n.to_string(),
                _ => return None,
            };
            Some((field.clone(), value))
        })
    }

    /// Identity key of `v`: declared identity if any, content hash otherwise.
    pub fn key(&self, v: &Value) -> CorpusResult<ElementKey> {
        if let Some((field, value)) = self.declared_identity(v) {
            return Ok(ElementKey::Field(field, value));
        }
        Ok(ElementKey::Content(hash_canonical_json_hex(v)?))
    }
}
