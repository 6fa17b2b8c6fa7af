//! Collaborator traits.

use serde::Serialize;
use serde_json::Value;

use apicorpus_core::CorpusError;

/// What a converter receives for one source document.
#[derive(Debug, Clone, Copy)]
pub struct ConversionInput<'a> {
    pub source: &'a Value,
    pub source_url: &'a str,
    /// Format id the document was registered under (`swagger_2`, ...).
    pub format: &'a str,
}

/// Converter output: the canonical body plus the detected source format version.
#[derive(Debug, Clone, PartialEq)]
pub struct Converted {
    pub document: Value,
    pub format_version: String,
}

/// Turns a source document into the canonical format.
pub trait Converter: Send + Sync {
    fn name(&self) -> &str;

    fn version(&self) -> &str;

    fn convert(&self, input: &ConversionInput<'_>) -> anyhow::Result<Converted>;
}

/// Errors block persistence; warnings are only logged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    pub fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// The blocking part of the report as a [`CorpusError::Validation`].
    pub fn to_error(&self) -> Option<CorpusError> {
        if self.is_ok() {
            None
        } else {
            Some(CorpusError::Validation(self.errors.clone()))
        }
    }
}

/// Checks a canonical document.
pub trait Validator: Send + Sync {
    fn validate(&self, document: &Value) -> ValidationReport;
}
