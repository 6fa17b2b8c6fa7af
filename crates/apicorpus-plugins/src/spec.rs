//! Static plugin declarations.
//!
//! Specs are data-only and used for registration and `--json` listings.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;

/// Stable plugin identifier, e.g. `builtin.swagger_2`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PluginId(pub String);

impl PluginId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PluginSpec {
    pub id: PluginId,

    /// Human-readable display name.
    pub name: String,

    pub version: String,

    /// Source format ids this plugin handles. Empty for validators.
    pub formats: Vec<String>,

    /// Arbitrary metadata for listings.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, String>,
}

impl PluginSpec {
    pub fn new(id: impl Into<String>, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: PluginId::new(id),
            name: name.into(),
            version: version.into(),
            formats: Vec::new(),
            meta: BTreeMap::new(),
        }
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.formats.push(format.into());
        self
    }

    pub fn meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    pub fn handles(&self, format: &str) -> bool {
        self.formats.iter().any(|f| f == format)
    }

    /// Basic quality checks.
    pub fn validate(&self) -> Result<()> {
        if self.id.as_str().trim().is_empty() {
            anyhow::bail!("plugin id is empty");
        }
        if !self.id.as_str().is_ascii() {
            anyhow::bail!("plugin id must be ASCII");
        }
        if self.name.trim().is_empty() {
            anyhow::bail!("plugin name is empty");
        }
        if self.version.trim().is_empty() {
            anyhow::bail!("plugin version is empty");
        }
        for f in &self.formats {
            let ok = !f.is_empty()
                && f.bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_');
            if !ok {
                anyhow::bail!("format id {f:?} must match [a-z0-9_]+");
            }
        }
        Ok(())
    }
}
