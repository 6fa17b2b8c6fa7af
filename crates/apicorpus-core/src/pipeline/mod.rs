//! Per-document pipeline states and run reports.
//!
//! Each document moves through a fixed sequence of states:
//!
//! ```text
//! Fetched -> Converted -> Patched -> Validated -> Persisted
//!     \          \           \           \
//!      `----------`-----------`-----------`--> Failed(stage)
//! ```
//!
//! The orchestrator that drives the sequence lives in the CLI crate because
//! it performs I/O; this module only holds the state machine and the report
//! types so that every producer renders failures the same way.
//!
//! Document-level errors are folded into [`FailureReport`]s. The whole run
//! yields a [`RunOutcome`], which is turned into a process exit status only
//! at the outermost boundary.

use serde::Serialize;
use serde_json::Value;

use crate::config::ExitConfig;
use crate::errors::{CorpusError, CorpusResult};

pub mod stages;

/// Stage of the document pipeline at which something happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageId {
    Fetch,
    Convert,
    Identity,
    Fixup,
    Patch,
    Validate,
    Persist,
}

impl StageId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Convert => "convert",
            Self::Identity => "identity",
            Self::Fixup => "fixup",
            Self::Patch => "patch",
            Self::Validate => "validate",
            Self::Persist => "persist",
        }
    }

    /// Stage a document-level error is attributed to by default.
    pub fn of_error(e: &CorpusError) -> Self {
        match e {
            CorpusError::Identity(_) => Self::Identity,
            CorpusError::Conversion(_) => Self::Convert,
            CorpusError::PatchMerge(_) => Self::Patch,
            CorpusError::FixupApply(_) => Self::Fixup,
            CorpusError::Validation(_) => Self::Validate,
            _ => Self::Persist,
        }
    }
}

/// Lifecycle state of one document within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "stage", rename_all = "lowercase")]
pub enum DocumentState {
    Fetched,
    Converted,
    Patched,
    Validated,
    Persisted,
    Failed(StageId),
}

impl DocumentState {
    fn rank(&self) -> Option<u8> {
        match self {
            Self::Fetched => Some(0),
            Self::Converted => Some(1),
            Self::Patched => Some(2),
            Self::Validated => Some(3),
            Self::Persisted => Some(4),
            Self::Failed(_) => None,
        }
    }

    /// Move to `next`. Only single forward steps and failure are allowed.
    pub fn advance(self, next: DocumentState) -> CorpusResult<DocumentState> {
        match (self.rank(), next.rank()) {
            (Some(_), None) => Ok(next),
            (Some(a), Some(b)) if b == a + 1 => Ok(next),
            _ => Err(CorpusError::invariant(format!(
                "illegal document transition {self:?} -> {next:?}"
            ))),
        }
    }
}

/// Everything needed to diagnose one failed document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureReport {
    pub source_url: String,
    pub format: String,
    pub stage: StageId,
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Raw source document, when it was fetched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Value>,
    /// Partially processed canonical document, when conversion succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial: Option<Value>,
}

impl FailureReport {
    pub fn new(source_url: impl Into<String>, format: impl Into<String>, stage: StageId, error: &CorpusError) -> Self {
        let errors = match error {
            CorpusError::Validation(list) => list.clone(),
            other => vec![other.to_string()],
        };
        Self::from_messages(source_url, format, stage, errors)
    }

    /// Report for failures that never became a [`CorpusError`] (fetch errors).
    pub fn from_messages(
        source_url: impl Into<String>,
        format: impl Into<String>,
        stage: StageId,
        errors: Vec<String>,
    ) -> Self {
        Self {
            source_url: source_url.into(),
            format: format.into(),
            stage,
            errors,
            warnings: Vec::new(),
            source: None,
            partial: None,
        }
    }

    pub fn with_source(mut self, source: Option<Value>) -> Self {
        self.source = source;
        self
    }

    pub fn with_partial(mut self, partial: Option<Value>) -> Self {
        self.partial = partial;
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }
}

/// Result of processing one document.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DocumentReport {
    Persisted {
        #[serde(rename = "sourceUrl")]
        source_url: String,
        location: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        warnings: Vec<String>,
    },
    /// Checked without writing (validate-only runs).
    Checked {
        #[serde(rename = "sourceUrl")]
        source_url: String,
        location: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        warnings: Vec<String>,
    },
    Failed(FailureReport),
}

impl DocumentReport {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Aggregate result of a collection run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutcome {
    pub any_failed: bool,
    pub reports: Vec<DocumentReport>,
}

impl RunOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, report: DocumentReport) {
        self.any_failed |= report.is_failure();
        self.reports.push(report);
    }

    pub fn failures(&self) -> impl Iterator<Item = &FailureReport> {
        self.reports.iter().filter_map(|r| match r {
            DocumentReport::Failed(f) => Some(f),
            _ => None,
        })
    }

    pub fn succeeded(&self) -> usize {
        self.reports.iter().filter(|r| !r.is_failure()).count()
    }

    /// Process exit code for this outcome.
    pub fn exit_code(&self, cfg: &ExitConfig, force_success: bool) -> u8 {
        if self.any_failed && !force_success {
            cfg.failure_code
        } else {
            0
        }
    }
}
