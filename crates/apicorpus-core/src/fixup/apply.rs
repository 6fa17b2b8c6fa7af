//! Delta application and reversal.

use std::collections::BTreeSet;

use serde_json::Value;

use super::identity::IdentityStrategy;
use super::{ArrayDelta, Changed, Delta, Indexed, Move};
use crate::errors::{CorpusError, CorpusResult};

pub(super) fn apply(s: &IdentityStrategy, target: &Value, delta: &Delta, path: &str) -> CorpusResult<Value> {
    match delta {
        Delta::Add { value } => Ok(value.clone()),
        Delta::Replace { new, .. } => Ok(new.clone()),
        Delta::Remove { .. } => Err(CorpusError::fixup_apply(format!(
            "{}: removal of the document itself",
            display_path(path)
        ))),
        Delta::Object { members } => {
            let Value::Object(obj) = target else {
                return Err(CorpusError::fixup_apply(format!(
                    "{}: expected object, found {}",
                    display_path(path),
                    kind(target)
                )));
            };
            let mut out = obj.clone();
            for (k, d) in members {
                let child_path = format!("{path}/{}", escape(k));
                match d {
                    Delta::Remove { .. } => {
                        out.remove(k);
                    }
                    Delta::Add { value } => {
                        out.insert(k.clone(), value.clone());
                    }
                    Delta::Replace { new, .. } => {
                        out.insert(k.clone(), new.clone());
                    }
                    nested => {
                        let current = out.get(k).ok_or_else(|| {
                            CorpusError::fixup_apply(format!("{child_path}: member is missing"))
                        })?;
                        let next = apply(s, current, nested, &child_path)?;
                        out.insert(k.clone(), next);
                    }
                }
            }
            Ok(Value::Object(out))
        }
        Delta::Array(ad) => {
            let Value::Array(items) = target else {
                return Err(CorpusError::fixup_apply(format!(
                    "{}: expected array, found {}",
                    display_path(path),
                    kind(target)
                )));
            };
            apply_array(s, items, ad, path).map(Value::Array)
        }
    }
}

fn apply_array(s: &IdentityStrategy, items: &[Value], ad: &ArrayDelta, path: &str) -> CorpusResult<Vec<Value>> {
    let n = items.len();
    let fail = |msg: String| CorpusError::fixup_apply(format!("{}: {msg}", display_path(path)));

    let mut taken = vec![false; n];
    for r in &ad.removed {
        if r.at >= n || taken[r.at] {
            return Err(fail(format!("removed index {} out of range or reused (len {n})", r.at)));
        }
        let expected = s.key(&r.value)?;
        let found = s.key(&items[r.at])?;
        if expected != found {
            return Err(fail(format!(
                "identity mismatch at {}: expected {expected}, found {found}",
                r.at
            )));
        }
        taken[r.at] = true;
    }
    for mv in &ad.moved {
        if mv.from >= n || taken[mv.from] {
            return Err(fail(format!("moved index {} out of range or reused (len {n})", mv.from)));
        }
        expect_key(s, &items[mv.from], &mv.key, mv.from, &fail)?;
        taken[mv.from] = true;
    }

    let m = n - ad.removed.len() + ad.inserted.len();
    let mut slots: Vec<Option<Value>> = vec![None; m];
    let placed = ad
        .inserted
        .iter()
        .map(|ins| (ins.at, ins.value.clone()))
        .chain(ad.moved.iter().map(|mv| (mv.to, items[mv.from].clone())));
    for (at, value) in placed {
        let slot = slots
            .get_mut(at)
            .filter(|slot| slot.is_none())
            .ok_or_else(|| fail(format!("target index {at} out of range or occupied (len {m})")))?;
        *slot = Some(value);
    }

    let mut stay = items
        .iter()
        .enumerate()
        .filter(|(i, _)| !taken[*i])
        .map(|(_, v)| v.clone());
    let mut out = Vec::with_capacity(m);
    for slot in slots {
        match slot {
            Some(v) => out.push(v),
            None => out.push(
                stay.next()
                    .ok_or_else(|| CorpusError::invariant("array delta slot accounting"))?,
            ),
        }
    }

    for c in &ad.changed {
        let child_path = format!("{path}/{}", c.at);
        let current = out
            .get(c.at)
            .ok_or_else(|| fail(format!("changed index {} out of range (len {m})", c.at)))?;
        expect_key(s, current, &c.key, c.at, &fail)?;
        let next = apply(s, current, &c.delta, &child_path)?;
        out[c.at] = next;
    }

    Ok(out)
}

fn expect_key(
    s: &IdentityStrategy,
    item: &Value,
    expected: &str,
    at: usize,
    fail: &dyn Fn(String) -> CorpusError,
) -> CorpusResult<()> {
    let found = s.key(item)?.token();
    if found != expected {
        return Err(fail(format!("identity mismatch at {at}: expected {expected}, found {found}")));
    }
    Ok(())
}

pub(super) fn reverse(delta: &Delta) -> Delta {
    match delta {
        Delta::Add { value } => Delta::Remove { value: value.clone() },
        Delta::Remove { value } => Delta::Add { value: value.clone() },
        Delta::Replace { old, new } => Delta::Replace {
            old: new.clone(),
            new: old.clone(),
        },
        Delta::Object { members } => Delta::Object {
            members: members.iter().map(|(k, d)| (k.clone(), reverse(d))).collect(),
        },
        Delta::Array(ad) => Delta::Array(reverse_array(ad)),
    }
}

fn reverse_array(ad: &ArrayDelta) -> ArrayDelta {
    // Positions that do not hold a stayed element, on each side.
    let edited_fixed: BTreeSet<usize> = ad
        .inserted
        .iter()
        .map(|i| i.at)
        .chain(ad.moved.iter().map(|m| m.to))
        .collect();
    let original_fixed: BTreeSet<usize> = ad
        .removed
        .iter()
        .map(|r| r.at)
        .chain(ad.moved.iter().map(|m| m.from))
        .collect();

    let to_original = |j: usize| -> usize {
        if let Some(mv) = ad.moved.iter().find(|mv| mv.to == j) {
            return mv.from;
        }
        let rank = j - edited_fixed.range(..j).count();
        nth_free(&original_fixed, rank)
    };

    let mut moved: Vec<Move> = ad
        .moved
        .iter()
        .map(|mv| Move {
            from: mv.to,
            to: mv.from,
            key: mv.key.clone(),
        })
        .collect();
    moved.sort_unstable_by_key(|mv| mv.to);

    let mut changed: Vec<Changed> = ad
        .changed
        .iter()
        .map(|c| Changed {
            at: to_original(c.at),
            key: c.key.clone(),
            delta: reverse(&c.delta),
        })
        .collect();
    changed.sort_unstable_by_key(|c| c.at);

    ArrayDelta {
        removed: ad.inserted.iter().map(|i| Indexed { at: i.at, value: i.value.clone() }).collect(),
        moved,
        inserted: ad.removed.iter().map(|r| Indexed { at: r.at, value: r.value.clone() }).collect(),
        changed,
    }
}

/// The `rank`-th (0-based) index not contained in `fixed`.
fn nth_free(fixed: &BTreeSet<usize>, rank: usize) -> usize {
    let mut seen = 0;
    let mut idx = 0;
    loop {
        if !fixed.contains(&idx) {
            if seen == rank {
                return idx;
            }
            seen += 1;
        }
        idx += 1;
    }
}

fn escape(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "/"
    } else {
        path
    }
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
