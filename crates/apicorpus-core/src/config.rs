//! Configuration structures for apicorpus-core.
//!
//! This module defines explicit, serializable configuration objects used by
//! the store and the CLI to control the storage layout, fixup identity
//! hashing and the process exit status.
//!
//! The core crate itself does not read files or environment variables. All
//! configuration must be provided explicitly by the caller.

use serde::{Deserialize, Serialize};

use crate::errors::{CorpusError, CorpusResult};

/// Global configuration container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    pub layout: LayoutConfig,
    pub identity: IdentityConfig,
    pub exit: ExitConfig,
}

/// File names used inside the collection tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub spec_file: String,
    pub patch_file: String,
    pub fixup_file: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            spec_file: crate::defaults::SPEC_FILE.to_string(),
            patch_file: crate::defaults::PATCH_FILE.to_string(),
            fixup_file: crate::defaults::FIXUP_FILE.to_string(),
        }
    }
}

/// Fixup identity hashing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Candidate identity fields, tried in order.
    pub fields: Vec<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            fields: crate::defaults::IDENTITY_FIELDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Process exit status policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExitConfig {
    /// Exit code used when any document failed.
    pub failure_code: u8,
}

impl Default for ExitConfig {
    fn default() -> Self {
        Self {
            failure_code: crate::defaults::FAILURE_EXIT_CODE,
        }
    }
}

/// Validate a full configuration object.
pub fn validate_config(cfg: &CorpusConfig) -> CorpusResult<()> {
    let names = [
        ("spec_file", &cfg.layout.spec_file),
        ("patch_file", &cfg.layout.patch_file),
        ("fixup_file", &cfg.layout.fixup_file),
    ];
    for (field, name) in names {
        if name.is_empty() || name.contains('/') || name.contains('\\') {
            return Err(CorpusError::invalid_argument(format!(
                "layout.{field} must be a bare file name, got {name:?}"
            )));
        }
    }

    let l = &cfg.layout;
    if l.spec_file == l.patch_file || l.spec_file == l.fixup_file || l.patch_file == l.fixup_file {
        return Err(CorpusError::invalid_argument(
            "layout file names must be distinct",
        ));
    }

    if cfg.identity.fields.is_empty() {
        return Err(CorpusError::invalid_argument(
            "identity.fields must name at least one field",
        ));
    }
    if cfg.identity.fields.iter().any(|f| f.is_empty()) {
        return Err(CorpusError::invalid_argument(
            "identity.fields must not contain empty names",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = CorpusConfig::default();
        validate_config(&cfg).unwrap();
        assert_eq!(cfg.exit.failure_code, 255);
        assert_eq!(cfg.identity.fields, vec!["id", "name", "operationId"]);
    }

    #[test]
    fn clashing_file_names_detected() {
        let mut cfg = CorpusConfig::default();
        cfg.layout.patch_file = cfg.layout.spec_file.clone();
        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn nested_file_name_detected() {
        let mut cfg = CorpusConfig::default();
        cfg.layout.fixup_file = "a/fixup.json".to_string();
        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn empty_identity_field_list_rejected() {
        let mut cfg = CorpusConfig::default();
        cfg.identity.fields.clear();
        assert!(validate_config(&cfg).is_err());
        cfg.identity.fields = vec!["name".into(), String::new()];
        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: CorpusConfig = serde_json::from_str(r#"{"exit":{"failure_code":0}}"#).unwrap();
        assert_eq!(cfg.exit.failure_code, 0);
        assert_eq!(cfg.layout, LayoutConfig::default());
    }
}
