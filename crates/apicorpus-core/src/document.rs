//! Typed view over a canonical API description.
//!
//! The body stays an untyped JSON object because it is format-specific; only
//! the metadata the corpus relies on is read through accessors:
//!
//! ```text
//! info.x-providerName   provider (required)
//! info.x-serviceName    service (optional)
//! info.version          version (required)
//! info.x-preferred      preferred-version flag
//! info.x-origin         [{format, version, url}, ...], last entry is current
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{CorpusError, CorpusResult};

pub mod keys {
    pub const INFO: &str = "info";
    pub const VERSION: &str = "version";
    pub const PROVIDER: &str = "x-providerName";
    pub const SERVICE: &str = "x-serviceName";
    pub const PREFERRED: &str = "x-preferred";
    pub const ORIGIN: &str = "x-origin";
}

/// Where a canonical document was converted from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    pub format: String,
    #[serde(rename = "version", default, skip_serializing_if = "String::is_empty")]
    pub format_version: String,
    #[serde(rename = "url")]
    pub source_url: String,
}

impl Origin {
    pub fn new(format: impl Into<String>, format_version: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            format_version: format_version.into(),
            source_url: source_url.into(),
        }
    }
}

/// A converted API description.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalDocument {
    body: Value,
}

impl CanonicalDocument {
    /// Wrap a JSON body. The root must be an object.
    pub fn new(body: Value) -> CorpusResult<Self> {
        if !body.is_object() {
            return Err(CorpusError::invalid_argument(
                "canonical document must be a JSON object",
            ));
        }
        Ok(Self { body })
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn into_body(self) -> Value {
        self.body
    }

    pub fn info(&self) -> Option<&Map<String, Value>> {
        self.body.get(keys::INFO).and_then(Value::as_object)
    }

    fn info_str(&self, key: &str) -> Option<&str> {
        self.info().and_then(|i| i.get(key)).and_then(Value::as_str)
    }

    pub fn provider(&self) -> Option<&str> {
        self.info_str(keys::PROVIDER)
    }

    pub fn service(&self) -> Option<&str> {
        self.info_str(keys::SERVICE)
    }

    pub fn version(&self) -> Option<&str> {
        self.info_str(keys::VERSION)
    }

    /// `Some(flag)` only when the document declares `x-preferred` explicitly.
    pub fn preferred(&self) -> Option<bool> {
        self.info()
            .and_then(|i| i.get(keys::PREFERRED))
            .and_then(Value::as_bool)
    }

    /// Full origin trail; malformed entries are skipped.
    pub fn origins(&self) -> Vec<Origin> {
        match self.info().and_then(|i| i.get(keys::ORIGIN)) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|o| serde_json::from_value(o.clone()).ok())
                .collect(),
            Some(single @ Value::Object(_)) => serde_json::from_value(single.clone())
                .ok()
                .into_iter()
                .collect(),
            _ => Vec::new(),
        }
    }

    /// The current origin (last entry of the trail).
    pub fn origin(&self) -> Option<Origin> {
        self.origins().pop()
    }

    /// Record `origin` as the current origin.
    ///
    /// An entry with the same format and URL as the current one is replaced
    /// in place so that re-running a conversion does not grow the trail.
    pub fn stamp_origin(&mut self, origin: Origin) -> CorpusResult<()> {
        let mut trail = self.origins();
        match trail.last_mut() {
            Some(last) if last.format == origin.format && last.source_url == origin.source_url => {
                *last = origin;
            }
            _ => trail.push(origin),
        }
        let trail = serde_json::to_value(trail)?;
        self.info_mut()?.insert(keys::ORIGIN.to_string(), trail);
        Ok(())
    }

    fn info_mut(&mut self) -> CorpusResult<&mut Map<String, Value>> {
        let root = self
            .body
            .as_object_mut()
            .ok_or_else(|| CorpusError::invariant("document root is not an object"))?;
        root.entry(keys::INFO.to_string())
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
            .ok_or_else(|| CorpusError::identity("info must be an object"))
    }
}
