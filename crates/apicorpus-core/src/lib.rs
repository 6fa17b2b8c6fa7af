//! apicorpus-core
//!
//! Core primitives for apicorpus:
//! - Canonical identity (`provider[/service]/version`) and storage paths
//! - Canonical JSON encoding for deterministic, diff-friendly bytes
//! - Merge-patch overlays (RFC 7396 semantics) and their level stacking
//! - Identity-aware structural fixups: compute, apply, reverse
//! - Corpus-wide version index with preferred-version resolution
//! - Per-document pipeline stages and failure reports
//!
//! The core crate performs no filesystem or network I/O. The store and the
//! CLI load bytes and pass structures in.

pub mod config;
pub mod determinism;
pub mod document;
pub mod errors;
pub mod fixup;
pub mod identity;
pub mod index;
pub mod merge_patch;
pub mod pipeline;

pub use crate::errors::{CorpusError, CorpusResult};

#[cfg(test)]
pub(crate) mod testutil;

/// Domain separation labels for content hashes.
/// These must remain stable: fixup files on disk depend on them.
pub mod domain {
    pub const CONTENT: &str = "apicorpus.v1.content";
}

/// Default layout and policy values.
pub mod defaults {
    pub const SPEC_FILE: &str = "spec.json";
    pub const PATCH_FILE: &str = "patch.json";
    pub const FIXUP_FILE: &str = "fixup.json";

    /// Candidate identity fields for fixup element matching, in priority order.
    pub const IDENTITY_FIELDS: &[&str] = &["id", "name", "operationId"];

    pub const FAILURE_EXIT_CODE: u8 = 255;
}
