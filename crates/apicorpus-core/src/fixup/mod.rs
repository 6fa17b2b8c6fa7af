//! Structural fixups: identity-aware diffs between a pristine conversion and
//! a manually corrected document.
//!
//! A fixup is a [`Delta`] tree. Objects are diffed key by key, arrays are
//! diffed by element identity (see [`IdentityStrategy`]): elements present on
//! both sides are matched by key, so reordering shows up as moves and edits
//! inside a moved element stay small.
//!
//! Every delta carries the values it removes or replaces, which makes it
//! reversible: `unapply_fixup(apply_fixup(p, f), f) == p`. That property is
//! what allows a correction to be re-recorded cumulatively against the
//! pristine baseline.
//!
//! Wire format (stored as `fixup.json`, canonical JSON):
//!
//! ```json
//! {"op": "object", "members": {
//!   "host": {"op": "replace", "old": "a.example.com", "new": "api.example.com"},
//!   "tags": {"op": "array",
//!            "moved":    [{"from": 0, "to": 2, "key": "name=users"}],
//!            "removed":  [{"at": 1, "value": {"name": "legacy"}}],
//!            "inserted": [{"at": 0, "value": {"name": "pets"}}],
//!            "changed":  [{"at": 2, "key": "name=users", "delta": {"op": "object", "members": {}}}]}
//! }}
//! ```
//!
//! Array indices: `removed.at` and `moved.from` index the original array,
//! `inserted.at`, `moved.to` and `changed.at` index the edited array.
//! `key` is the element identity (see [`ElementKey::token`]); moved and
//! changed elements must still carry it when the fixup is replayed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::CorpusResult;

mod apply;
mod diff;
pub mod identity;

pub use identity::{ElementKey, IdentityStrategy};

/// The stored fixup for one identity.
pub type FixupDocument = Delta;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Delta {
    /// Member absent in the original.
    Add { value: Value },
    /// Member absent in the edited document.
    Remove { value: Value },
    /// Value changed kind or scalar value.
    Replace { old: Value, new: Value },
    /// Per-member changes of an object present on both sides.
    Object { members: BTreeMap<String, Delta> },
    /// Identity-matched changes of an array present on both sides.
    Array(ArrayDelta),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrayDelta {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed: Vec<Indexed>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub moved: Vec<Move>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inserted: Vec<Indexed>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changed: Vec<Changed>,
}

impl ArrayDelta {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
            && self.moved.is_empty()
            && self.inserted.is_empty()
            && self.changed.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indexed {
    pub at: usize,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub from: usize,
    pub to: usize,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Changed {
    pub at: usize,
    pub key: String,
    pub delta: Delta,
}

impl Delta {
    /// Number of leaf operations, for logging.
    pub fn op_count(&self) -> usize {
        match self {
            Self::Add { .. } | Self::Remove { .. } | Self::Replace { .. } => 1,
            Self::Object { members } => members.values().map(Delta::op_count).sum(),
            Self::Array(a) => {
                a.removed.len()
                    + a.moved.len()
                    + a.inserted.len()
                    + a.changed.iter().map(|c| c.delta.op_count()).sum::<usize>()
            }
        }
    }
}

/// Diff `original` against `edited` with the default identity fields.
/// Returns `None` when the documents are equal.
pub fn compute_fixup(original: &Value, edited: &Value) -> CorpusResult<Option<Delta>> {
    compute_fixup_with(&IdentityStrategy::default(), original, edited)
}

pub fn compute_fixup_with(
    strategy: &IdentityStrategy,
    original: &Value,
    edited: &Value,
) -> CorpusResult<Option<Delta>> {
    diff::diff(strategy, original, edited)
}

/// Replay a stored fixup on a pristine document.
pub fn apply_fixup(doc: &Value, fixup: &Delta) -> CorpusResult<Value> {
    apply_fixup_with(&IdentityStrategy::default(), doc, fixup)
}

pub fn apply_fixup_with(strategy: &IdentityStrategy, doc: &Value, fixup: &Delta) -> CorpusResult<Value> {
    apply::apply(strategy, doc, fixup, "")
}

/// The delta that undoes `fixup`.
pub fn reverse_fixup(fixup: &Delta) -> Delta {
    apply::reverse(fixup)
}

/// Reverse-apply `fixup` to a corrected document, recovering the pristine one.
pub fn unapply_fixup(doc: &Value, fixup: &Delta) -> CorpusResult<Value> {
    unapply_fixup_with(&IdentityStrategy::default(), doc, fixup)
}

pub fn unapply_fixup_with(strategy: &IdentityStrategy, doc: &Value, fixup: &Delta) -> CorpusResult<Value> {
    apply::apply(strategy, doc, &reverse_fixup(fixup), "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::determinism::canonical_json::to_canonical_pretty;
    use crate::testutil::{arb_json, arb_named_list};
    use proptest::prelude::*;
    use serde_json::json;

    fn round_trip(p: &Value, e: &Value) {
        let Some(f) = compute_fixup(p, e).unwrap() else {
            assert_eq!(p, e);
            return;
        };
        let applied = apply_fixup(p, &f).unwrap();
        assert_eq!(to_canonical_pretty(&applied).unwrap(), to_canonical_pretty(e).unwrap());
        let restored = unapply_fixup(&applied, &f).unwrap();
        assert_eq!(to_canonical_pretty(&restored).unwrap(), to_canonical_pretty(p).unwrap());
    }

    #[test]
    fn equal_documents_have_no_fixup() {
        let v = json!({"a": [1, 2, {"b": null}]});
        assert!(compute_fixup(&v, &v.clone()).unwrap().is_none());
    }

    #[test]
    fn reordered_operations_are_moves() {
        let p = json!({"tags": [{"name": "a"}, {"name": "b"}, {"name": "c"}]});
        let e = json!({"tags": [{"name": "c"}, {"name": "a"}, {"name": "b"}]});
        let f = compute_fixup(&p, &e).unwrap().unwrap();

        let Delta::Object { members } = &f else { panic!("expected object delta") };
        let Delta::Array(a) = &members["tags"] else { panic!("expected array delta") };
        assert_eq!(
            a.moved,
            vec![Move {
                from: 2,
                to: 0,
                key: "name=c".into()
            }]
        );
        assert!(a.removed.is_empty() && a.inserted.is_empty());
        round_trip(&p, &e);
    }

    #[test]
    fn edit_inside_moved_element_stays_nested() {
        let p = json!([{"operationId": "list", "summary": "List"}, {"operationId": "get"}]);
        let e = json!([{"operationId": "get"}, {"operationId": "list", "summary": "List all"}]);
        let f = compute_fixup(&p, &e).unwrap().unwrap();
        let Delta::Array(a) = &f else { panic!("expected array delta") };
        assert_eq!(a.inserted.len() + a.removed.len(), 0);
        assert_eq!(a.changed.len(), 1);
        assert_eq!(f.op_count(), 2);
        round_trip(&p, &e);
    }

    #[test]
    fn mixed_changes_round_trip() {
        let p = json!({
            "host": "a.example.com",
            "schemes": ["http"],
            "paths": {"/pets": {"get": {"parameters": [
                {"name": "limit", "in": "query"},
                {"name": "offset", "in": "query"},
                {"in": "header", "type": "string"}
            ]}}}
        });
        let e = json!({
            "host": "api.example.com",
            "schemes": ["https", "http"],
            "paths": {"/pets": {"get": {"parameters": [
                {"name": "offset", "in": "query"},
                {"name": "limit", "in": "query", "required": false},
                {"name": "cursor", "in": "query"}
            ]}}},
            "x-fixed": true
        });
        round_trip(&p, &e);
    }

    #[test]
    fn wire_format_is_stable() {
        let p = json!({"a": 1, "l": [{"id": "x"}, {"id": "y"}]});
        let e = json!({"a": 2, "l": [{"id": "y"}], "n": null});
        let f = compute_fixup(&p, &e).unwrap().unwrap();
        let wire = serde_json::to_value(&f).unwrap();
        assert_eq!(
            wire,
            json!({"op": "object", "members": {
                "a": {"op": "replace", "old": 1, "new": 2},
                "l": {"op": "array", "removed": [{"at": 0, "value": {"id": "x"}}]},
                "n": {"op": "add", "value": null}
            }})
        );
        let back: Delta = serde_json::from_value(wire).unwrap();
        assert_eq!(back, f);
    }

    #[test]
    fn removed_element_identity_mismatch_fails() {
        let p = json!([{"name": "a"}, {"name": "b"}]);
        let e = json!([{"name": "b"}]);
        let f = compute_fixup(&p, &e).unwrap().unwrap();

        // upstream renamed the element the fixup deletes
        let upstream = json!([{"name": "z"}, {"name": "b"}]);
        let err = apply_fixup(&upstream, &f).unwrap_err();
        assert!(matches!(err, crate::CorpusError::FixupApply(_)));
    }

    #[test]
    fn change_follows_element_identity() {
        let p = json!({"tags": [{"name": "pets"}, {"name": "users"}]});
        let e = json!({"tags": [{"name": "pets", "description": "Pets"}, {"name": "users"}]});
        let f = compute_fixup(&p, &e).unwrap().unwrap();

        // upstream prepends a tag; the change no longer sits at index 0
        let upstream = json!({"tags": [{"name": "admin"}, {"name": "pets"}, {"name": "users"}]});
        let err = apply_fixup(&upstream, &f).unwrap_err();
        assert!(matches!(err, crate::CorpusError::FixupApply(ref m) if m.contains("name=pets")), "{err}");
    }

    #[test]
    fn move_follows_element_identity() {
        let p = json!([{"name": "a"}, {"name": "b"}, {"name": "c"}]);
        let e = json!([{"name": "c"}, {"name": "a"}, {"name": "b"}]);
        let f = compute_fixup(&p, &e).unwrap().unwrap();

        let upstream = json!([{"name": "a"}, {"name": "b"}, {"name": "x"}, {"name": "c"}]);
        let err = apply_fixup(&upstream, &f).unwrap_err();
        assert!(matches!(err, crate::CorpusError::FixupApply(_)));
    }

    #[test]
    fn object_delta_on_scalar_fails() {
        let f = compute_fixup(&json!({"a": {"b": 1}}), &json!({"a": {"b": 2}})).unwrap().unwrap();
        assert!(apply_fixup(&json!({"a": 5}), &f).is_err());
    }

    proptest! {
        #[test]
        fn fixup_round_trips(p in arb_json(), e in arb_json()) {
            round_trip(&p, &e);
        }

        #[test]
        fn named_lists_round_trip(p in arb_named_list(), e in arb_named_list()) {
            round_trip(&p, &e);
        }

        #[test]
        fn reverse_is_involution(p in arb_named_list(), e in arb_named_list()) {
            if let Some(f) = compute_fixup(&p, &e).unwrap() {
                prop_assert_eq!(reverse_fixup(&reverse_fixup(&f)), f);
            }
        }
    }
}
