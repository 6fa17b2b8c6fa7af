//! Declarative merge-patch overlays.
//!
//! Application follows RFC 7396:
//! - an object patch is merged key by key into the target
//! - a `null` value deletes the key
//! - any other value (array, scalar) replaces the subtree wholesale
//!
//! Patches live at every level of the identity path. [`PatchStack`] applies
//! them root to leaf, so a deeper level wins on conflicting keys. The
//! composed effective patch keeps `null` markers so a provider-level deletion
//! is still visible after a version-level patch that does not mention the key.

use serde_json::{Map, Value};

use crate::errors::{CorpusError, CorpusResult};

/// Apply `patch` to `target` with RFC 7396 semantics.
pub fn apply_merge_patch(target: &Value, patch: &Value) -> Value {
    let Value::Object(patch_obj) = patch else {
        return patch.clone();
    };

    let mut out = match target {
        Value::Object(t) => t.clone(),
        _ => Map::new(),
    };

    for (k, pv) in patch_obj {
        if pv.is_null() {
            out.remove(k);
            continue;
        }
        let merged = match out.get(k) {
            Some(tv) => apply_merge_patch(tv, pv),
            None => apply_merge_patch(&Value::Null, pv),
        };
        out.insert(k.clone(), merged);
    }

    Value::Object(out)
}

/// Merge patch `next` over patch `acc`, keeping deletion markers.
pub fn compose_merge_patch(acc: &Value, next: &Value) -> Value {
    match (acc, next) {
        (Value::Object(a), Value::Object(n)) => {
            let mut out = a.clone();
            for (k, nv) in n {
                let composed = match out.get(k) {
                    Some(av) => compose_merge_patch(av, nv),
                    None => nv.clone(),
                };
                out.insert(k.clone(), composed);
            }
            Value::Object(out)
        }
        _ => next.clone(),
    }
}

/// Accumulates per-level patches in specificity order.
///
/// Levels are applied one after another rather than through the composed
/// patch: RFC 7396 cannot express "delete this object, then set a fresh one",
/// so composition alone would lose a shallow deletion followed by a deeper
/// object value for the same key.
#[derive(Debug, Clone, Default)]
pub struct PatchStack {
    levels: Vec<(String, Value)>,
}

impl PatchStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push the patch found at `level`. Levels must be pushed shortest first.
    pub fn push(&mut self, level: impl Into<String>, patch: &Value) -> CorpusResult<()> {
        let level = level.into();
        if !patch.is_object() {
            return Err(CorpusError::patch_merge(format!(
                "patch at {level} must be a JSON object"
            )));
        }
        self.levels.push((level, patch.clone()));
        Ok(())
    }

    /// Levels that contributed a patch, in push order.
    pub fn levels(&self) -> Vec<&str> {
        self.levels.iter().map(|(l, _)| l.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// All levels folded into one patch document, deeper levels winning.
    pub fn effective(&self) -> Value {
        self.levels
            .iter()
            .fold(Value::Object(Map::new()), |acc, (_, p)| compose_merge_patch(&acc, p))
    }

    /// Apply every level root to leaf. An empty stack leaves `doc` untouched.
    pub fn apply(&self, doc: &Value) -> Value {
        self.levels
            .iter()
            .fold(doc.clone(), |acc, (_, p)| apply_merge_patch(&acc, p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::arb_json;
    use assert_matches::assert_matches;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn rfc7396_examples() {
        let target = json!({"a": "b", "c": {"d": "e", "f": "g"}});
        let patch = json!({"a": "z", "c": {"f": null}});
        assert_eq!(
            apply_merge_patch(&target, &patch),
            json!({"a": "z", "c": {"d": "e"}})
        );

        assert_eq!(apply_merge_patch(&json!({"a": [1, 2]}), &json!({"a": [3]})), json!({"a": [3]}));
        assert_eq!(apply_merge_patch(&json!({"a": "b"}), &json!(["c"])), json!(["c"]));
        assert_eq!(apply_merge_patch(&json!([1]), &json!({"a": 1})), json!({"a": 1}));
        assert_eq!(apply_merge_patch(&json!({}), &json!({"a": {"bb": {"ccc": null}}})), json!({"a": {"bb": {}}}));
    }

    #[test]
    fn deeper_level_wins() {
        let mut stack = PatchStack::new();
        stack.push("acme", &json!({"a": 1, "b": 1})).unwrap();
        stack.push("acme/v1", &json!({"b": 2})).unwrap();

        let out = stack.apply(&json!({}));
        assert_eq!(out, json!({"a": 1, "b": 2}));
        assert_eq!(stack.levels(), vec!["acme", "acme/v1"]);
        assert_eq!(stack.effective(), json!({"a": 1, "b": 2}));
    }

    #[test]
    fn shallow_delete_then_deeper_object() {
        let mut stack = PatchStack::new();
        stack.push("acme", &json!({"x-logo": null})).unwrap();
        stack.push("acme/v1", &json!({"x-logo": {"url": "https://acme.com/logo.png"}})).unwrap();

        let out = stack.apply(&json!({"x-logo": {"url": "old", "backgroundColor": "#fff"}}));
        assert_eq!(out, json!({"x-logo": {"url": "https://acme.com/logo.png"}}));
    }

    #[test]
    fn null_deletes_even_across_levels() {
        let mut stack = PatchStack::new();
        stack.push("acme", &json!({"host": null})).unwrap();
        stack.push("acme/v1", &json!({"info": {"title": "Acme"}})).unwrap();

        let out = stack.apply(&json!({"host": "api.acme.com", "info": {"title": "x", "version": "v1"}}));
        assert_eq!(out, json!({"info": {"title": "Acme", "version": "v1"}}));
    }

    #[test]
    fn non_object_patch_rejected() {
        let mut stack = PatchStack::new();
        let e = stack.push("acme", &json!([1])).unwrap_err();
        assert_matches!(e, CorpusError::PatchMerge(_));
    }

    #[test]
    fn empty_stack_is_noop() {
        let doc = json!({"a": 1});
        assert_eq!(PatchStack::new().apply(&doc), doc);
    }

    proptest! {
        #[test]
        fn application_is_idempotent(doc in arb_json(), p1 in arb_json(), p2 in arb_json()) {
            let mut stack = PatchStack::new();
            if p1.is_object() {
                stack.push("p", &p1).unwrap();
            }
            if p2.is_object() {
                stack.push("p/v", &p2).unwrap();
            }
            let once = stack.apply(&doc);
            let twice = stack.apply(&once);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn single_patch_is_idempotent(doc in arb_json(), p in arb_json()) {
            let once = apply_merge_patch(&doc, &p);
            prop_assert_eq!(apply_merge_patch(&once, &p), once);
        }
    }
}
