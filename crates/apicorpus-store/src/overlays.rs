//! Loading and recording per-identity overlays.
//!
//! Two overlay kinds live next to each document:
//! - merge patches, one optional file per identity prefix
//! - a single structural fixup at the version level
//!
//! A fixup always describes the cumulative correction from the pristine
//! conversion output. Recording a further correction first reverse-applies
//! the stored fixup to recover that baseline, then diffs again.

use serde_json::Value;
use tracing::{debug, info};

use apicorpus_core::fixup::{compute_fixup_with, unapply_fixup_with, Delta, IdentityStrategy};
use apicorpus_core::identity::ApiPath;
use apicorpus_core::merge_patch::PatchStack;
use apicorpus_core::pipeline::stages::Overlays;
use apicorpus_core::{CorpusError, CorpusResult};

use crate::fs::Store;

/// Collect the patch files for every prefix of `path`, shortest first.
/// Missing levels are skipped.
pub fn compute_effective_patch(store: &Store, path: &ApiPath) -> CorpusResult<PatchStack> {
    let mut stack = PatchStack::new();
    for prefix in path.prefixes() {
        let location = store.patch_location(&prefix);
        let patch = store.load(&location).map_err(|e| match e {
            CorpusError::Serialization(msg) => CorpusError::patch_merge(msg),
            other => other,
        })?;
        if let Some(patch) = patch {
            stack.push(location, &patch)?;
        }
    }
    if !stack.is_empty() {
        debug!(%path, levels = ?stack.levels(), "merge patches");
    }
    Ok(stack)
}

pub fn load_fixup(store: &Store, path: &ApiPath) -> CorpusResult<Option<Delta>> {
    let location = store.fixup_location(path);
    let raw = store.load(&location).map_err(|e| match e {
        CorpusError::Serialization(msg) => CorpusError::fixup_apply(msg),
        other => other,
    })?;
    raw.map(|v| {
        serde_json::from_value(v).map_err(|e| CorpusError::fixup_apply(format!("{location}: {e}")))
    })
    .transpose()
}

/// Persist `fixup` for `path`; `None` deletes any stored fixup.
pub fn save_fixup(store: &Store, path: &ApiPath, fixup: Option<&Delta>) -> CorpusResult<()> {
    let location = store.fixup_location(path);
    match fixup {
        Some(f) => store.save(&location, &serde_json::to_value(f)?),
        None => store.remove(&location).map(|_| ()),
    }
}

pub fn load_overlays(store: &Store, path: &ApiPath) -> CorpusResult<Overlays> {
    Ok(Overlays {
        fixup: load_fixup(store, path)?,
        patches: compute_effective_patch(store, path)?,
    })
}

/// Record a manual correction for `path`.
///
/// `current` is the document the operator started editing: the pristine
/// conversion output with `applied` replayed, before merge patches.
/// `edited` is what they saved. The stored fixup is replaced by the diff
/// from the pristine baseline to `edited`, or removed when the two are
/// equal. Returns the new fixup.
///
/// The store is only touched once the new fixup is known, so a fixup that
/// was not replayed into `current` stays on disk until then.
pub fn record_correction(
    store: &Store,
    strategy: &IdentityStrategy,
    path: &ApiPath,
    applied: Option<&Delta>,
    current: &Value,
    edited: &Value,
) -> CorpusResult<Option<Delta>> {
    let pristine = match applied {
        Some(existing) => unapply_fixup_with(strategy, current, existing)?,
        None => current.clone(),
    };
    let fixup = compute_fixup_with(strategy, &pristine, edited)?;
    save_fixup(store, path, fixup.as_ref())?;
    match &fixup {
        Some(f) => info!(%path, ops = f.op_count(), "recorded correction"),
        None => info!(%path, "correction is empty; fixup cleared"),
    }
    Ok(fixup)
}
