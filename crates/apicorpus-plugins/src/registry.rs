//! Plugin registry.
//!
//! Converters are keyed by source format id; every format resolves to
//! exactly one converter. Validators run in plugin id order and their
//! reports are merged. Iteration order is stable because both maps are
//! `BTreeMap`s.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

use crate::plugin::{Converter, ValidationReport, Validator};
use crate::spec::PluginSpec;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid plugin spec {id}: {reason}")]
    InvalidSpec { id: String, reason: String },

    #[error("plugin id already registered: {0}")]
    DuplicateId(String),

    #[error("format {format} is already handled by {owner}")]
    DuplicateFormat { format: String, owner: String },

    #[error("no converter for format {format:?} (known: {})", .known.join(", "))]
    UnknownFormat { format: String, known: Vec<String> },
}

pub struct RegisteredConverter {
    pub spec: PluginSpec,
    pub converter: Box<dyn Converter>,
}

pub struct RegisteredValidator {
    pub spec: PluginSpec,
    pub validator: Box<dyn Validator>,
}

#[derive(Default)]
pub struct PluginRegistry {
    converters: BTreeMap<String, RegisteredConverter>,
    /// format id -> plugin id
    formats: BTreeMap<String, String>,
    validators: BTreeMap<String, RegisteredValidator>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.converters.len() + self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register a converter for every format listed in its spec.
    pub fn register_converter(&mut self, spec: PluginSpec, converter: Box<dyn Converter>) -> Result<(), RegistryError> {
        self.check_new(&spec)?;
        if spec.formats.is_empty() {
            return Err(RegistryError::InvalidSpec {
                id: spec.id.0.clone(),
                reason: "converter declares no formats".into(),
            });
        }
        for f in &spec.formats {
            if let Some(owner) = self.formats.get(f) {
                return Err(RegistryError::DuplicateFormat {
                    format: f.clone(),
                    owner: owner.clone(),
                });
            }
        }

        let id = spec.id.0.clone();
        for f in &spec.formats {
            self.formats.insert(f.clone(), id.clone());
        }
        self.converters.insert(id, RegisteredConverter { spec, converter });
        Ok(())
    }

    pub fn register_validator(&mut self, spec: PluginSpec, validator: Box<dyn Validator>) -> Result<(), RegistryError> {
        self.check_new(&spec)?;
        self.validators
            .insert(spec.id.0.clone(), RegisteredValidator { spec, validator });
        Ok(())
    }

    fn check_new(&self, spec: &PluginSpec) -> Result<(), RegistryError> {
        spec.validate().map_err(|e| RegistryError::InvalidSpec {
            id: spec.id.0.clone(),
            reason: e.to_string(),
        })?;
        let id = spec.id.as_str();
        if self.converters.contains_key(id) || self.validators.contains_key(id) {
            return Err(RegistryError::DuplicateId(id.to_string()));
        }
        Ok(())
    }

    /// Converter registered for `format`.
    pub fn converter_for(&self, format: &str) -> Result<&RegisteredConverter, RegistryError> {
        self.formats
            .get(format)
            .and_then(|id| self.converters.get(id))
            .ok_or_else(|| RegistryError::UnknownFormat {
                format: format.to_string(),
                known: self.formats(),
            })
    }

    /// Known format ids in sorted order.
    pub fn formats(&self) -> Vec<String> {
        self.formats.keys().cloned().collect()
    }

    /// Specs of every registered plugin, converters first, each group sorted by id.
    pub fn specs(&self) -> Vec<&PluginSpec> {
        self.converters
            .values()
            .map(|c| &c.spec)
            .chain(self.validators.values().map(|v| &v.spec))
            .collect()
    }

    /// Run every validator and merge the reports. No validators means no findings.
    pub fn validate(&self, document: &Value) -> ValidationReport {
        let mut report = ValidationReport::default();
        for v in self.validators.values() {
            report.merge(v.validator.validate(document));
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::{ConversionInput, Converted};
    use assert_matches::assert_matches;
    use serde_json::json;

    struct Echo;
    impl Converter for Echo {
        fn name(&self) -> &str {
            "echo"
        }
        fn version(&self) -> &str {
            "0.1.0"
        }
        fn convert(&self, input: &ConversionInput<'_>) -> anyhow::Result<Converted> {
            Ok(Converted {
                document: input.source.clone(),
                format_version: "1".into(),
            })
        }
    }

    struct AlwaysWarn;
    impl Validator for AlwaysWarn {
        fn validate(&self, _document: &Value) -> ValidationReport {
            let mut r = ValidationReport::default();
            r.warn("careful");
            r
        }
    }

    #[test]
    fn register_and_resolve_by_format() {
        let mut reg = PluginRegistry::new();
        let spec = PluginSpec::new("test.echo", "Echo", "0.1.0").format("raw").format("raw_alias");
        reg.register_converter(spec, Box::new(Echo)).unwrap();

        assert_eq!(reg.formats(), vec!["raw", "raw_alias"]);
        let c = reg.converter_for("raw_alias").unwrap();
        assert_eq!(c.converter.name(), "echo");

        let out = c
            .converter
            .convert(&ConversionInput {
                source: &json!({"a": 1}),
                source_url: "file:///a.json",
                format: "raw",
            })
            .unwrap();
        assert_eq!(out.document, json!({"a": 1}));
    }

    #[test]
    fn unknown_format_lists_known_ones() {
        let mut reg = PluginRegistry::new();
        reg.register_converter(PluginSpec::new("test.echo", "Echo", "0.1.0").format("raw"), Box::new(Echo))
            .unwrap();
        let e = reg.converter_for("raml").err().unwrap();
        assert_eq!(e.to_string(), "no converter for format \"raml\" (known: raw)");
    }

    #[test]
    fn duplicates_rejected() {
        let mut reg = PluginRegistry::new();
        reg.register_converter(PluginSpec::new("a", "A", "1").format("raw"), Box::new(Echo))
            .unwrap();
        assert_matches!(
            reg.register_converter(PluginSpec::new("b", "B", "1").format("raw"), Box::new(Echo)),
            Err(RegistryError::DuplicateFormat { ref owner, .. }) if owner == "a"
        );
        assert_matches!(
            reg.register_validator(PluginSpec::new("a", "A", "1"), Box::new(AlwaysWarn)),
            Err(RegistryError::DuplicateId(_))
        );
        assert_matches!(
            reg.register_converter(PluginSpec::new("c", "C", "1"), Box::new(Echo)),
            Err(RegistryError::InvalidSpec { .. })
        );
    }

    #[test]
    fn validators_merge() {
        let mut reg = PluginRegistry::new();
        assert!(reg.validate(&json!({})).is_ok());
        reg.register_validator(PluginSpec::new("w1", "W", "1"), Box::new(AlwaysWarn))
            .unwrap();
        reg.register_validator(PluginSpec::new("w2", "W", "1"), Box::new(AlwaysWarn))
            .unwrap();
        let r = reg.validate(&json!({}));
        assert!(r.is_ok());
        assert_eq!(r.warnings.len(), 2);
        assert!(r.to_error().is_none());
    }
}
