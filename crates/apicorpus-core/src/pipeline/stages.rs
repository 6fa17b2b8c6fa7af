//! Pure pipeline stages: overlay application and identity claims.
//!
//! Overlay order is fixed: the stored fixup is replayed on the pristine
//! conversion output first, the merge-patch stack is applied second. Fixups
//! are therefore always recorded against the fixed-up, pre-patch document and
//! never bake merge-patch effects into themselves.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::errors::{CorpusError, CorpusResult};
use crate::fixup::{apply_fixup_with, Delta, IdentityStrategy};
use crate::identity::ApiPath;
use crate::merge_patch::PatchStack;
use crate::pipeline::StageId;

/// Overlays stored for one identity.
#[derive(Debug, Clone, Default)]
pub struct Overlays {
    pub fixup: Option<Delta>,
    pub patches: PatchStack,
}

impl Overlays {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.fixup.is_none() && self.patches.is_empty()
    }
}

/// Pristine document with the stored fixup replayed. This is the baseline
/// shown to an operator for manual correction.
pub fn fixup_baseline(strategy: &IdentityStrategy, pristine: &Value, overlays: &Overlays) -> CorpusResult<Value> {
    match &overlays.fixup {
        Some(f) => apply_fixup_with(strategy, pristine, f),
        None => Ok(pristine.clone()),
    }
}

/// Apply fixup then merge patches. Errors carry the stage that failed.
pub fn apply_overlays(
    strategy: &IdentityStrategy,
    pristine: &Value,
    overlays: &Overlays,
) -> Result<Value, (StageId, CorpusError)> {
    let fixed = fixup_baseline(strategy, pristine, overlays).map_err(|e| (StageId::Fixup, e))?;
    Ok(overlays.patches.apply(&fixed))
}

/// Tracks identities claimed during one run.
#[derive(Debug, Default)]
pub struct IdentityClaims {
    claimed: BTreeMap<ApiPath, String>,
}

impl IdentityClaims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `path` for `source`. A second claim by another source fails.
    pub fn claim(&mut self, path: &ApiPath, source: &str) -> CorpusResult<()> {
        match self.claimed.get(path) {
            Some(owner) if owner != source => Err(CorpusError::identity(format!(
                "{path} is already produced by {owner}"
            ))),
            Some(_) => Ok(()),
            None => {
                self.claimed.insert(path.clone(), source.to_string());
                Ok(())
            }
        }
    }
}
