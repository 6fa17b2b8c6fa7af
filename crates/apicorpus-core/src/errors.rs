//! Error types for apicorpus-core.
//!
//! Every fallible operation in the core crate returns [`CorpusResult`]. The
//! variants follow the document pipeline taxonomy:
//!
//! | Variant | Scope | Recovery |
//! |---------|-------|----------|
//! | `Identity` | one document | document skipped |
//! | `Conversion` | one document | document skipped |
//! | `PatchMerge` | one document | document skipped |
//! | `FixupApply` | one document | document skipped, previous copy kept |
//! | `Validation` | one document | not persisted |
//! | `PreferredVersionAmbiguity` | index build | index build aborted |
//! | `Invariant` | whole run | run aborted |
//!
//! Document-level errors never unwind past the orchestrator; they are folded
//! into a per-document failure report. [`CorpusError::is_fatal`] tells the two
//! groups apart.

use thiserror::Error;

/// Result alias used across the core crate.
pub type CorpusResult<T> = Result<T, CorpusError>;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A logic bug: expected and observed state disagree.
    #[error("invariant violated: {0}")]
    Invariant(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("malformed identity: {0}")]
    Identity(String),

    #[error("conversion failed: {0}")]
    Conversion(String),

    #[error("malformed patch document: {0}")]
    PatchMerge(String),

    #[error("fixup cannot be replayed: {0}")]
    FixupApply(String),

    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("ambiguous preferred version for {api_id}: {reason}")]
    PreferredVersionAmbiguity { api_id: String, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CorpusError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    pub fn identity(msg: impl Into<String>) -> Self {
        Self::Identity(msg.into())
    }

    pub fn conversion(msg: impl Into<String>) -> Self {
        Self::Conversion(msg.into())
    }

    pub fn patch_merge(msg: impl Into<String>) -> Self {
        Self::PatchMerge(msg.into())
    }

    pub fn fixup_apply(msg: impl Into<String>) -> Self {
        Self::FixupApply(msg.into())
    }

    pub fn ambiguous_preferred(api_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PreferredVersionAmbiguity {
            api_id: api_id.into(),
            reason: reason.into(),
        }
    }

    /// Fatal errors abort the whole run rather than a single document.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Invariant(_) | Self::PreferredVersionAmbiguity { .. }
        )
    }
}

impl From<serde_json::Error> for CorpusError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
