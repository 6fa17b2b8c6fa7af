//! Delta computation.

use std::collections::{BTreeMap, VecDeque};

use serde_json::{Map, Value};

use super::identity::{ElementKey, IdentityStrategy};
use super::{ArrayDelta, Changed, Delta, Indexed, Move};
use crate::errors::CorpusResult;

pub(super) fn diff(s: &IdentityStrategy, a: &Value, b: &Value) -> CorpusResult<Option<Delta>> {
    if a == b {
        return Ok(None);
    }
    match (a, b) {
        (Value::Object(ao), Value::Object(bo)) => diff_object(s, ao, bo),
        (Value::Array(aa), Value::Array(ba)) => diff_array(s, aa, ba),
        _ => Ok(Some(Delta::Replace {
            old: a.clone(),
            new: b.clone(),
        })),
    }
}

fn diff_object(
    s: &IdentityStrategy,
    a: &Map<String, Value>,
    b: &Map<String, Value>,
) -> CorpusResult<Option<Delta>> {
    let mut members = BTreeMap::new();

    for (k, av) in a {
        match b.get(k) {
            None => {
                members.insert(k.clone(), Delta::Remove { value: av.clone() });
            }
            Some(bv) => {
                if let Some(d) = diff(s, av, bv)? {
                    members.insert(k.clone(), d);
                }
            }
        }
    }
    for (k, bv) in b {
        if !a.contains_key(k) {
            members.insert(k.clone(), Delta::Add { value: bv.clone() });
        }
    }

    if members.is_empty() {
        return Ok(None);
    }
    Ok(Some(Delta::Object { members }))
}

fn diff_array(s: &IdentityStrategy, a: &[Value], b: &[Value]) -> CorpusResult<Option<Delta>> {
    let ka = a.iter().map(|v| s.key(v)).collect::<CorpusResult<Vec<_>>>()?;
    let kb = b.iter().map(|v| s.key(v)).collect::<CorpusResult<Vec<_>>>()?;

    let pairs = lcs_pairs(&ka, &kb);
    let mut a_matched = vec![false; a.len()];
    let mut b_matched = vec![false; b.len()];
    for &(i, j) in &pairs {
        a_matched[i] = true;
        b_matched[j] = true;
    }

    // Unmatched originals by key, oldest index first.
    let mut pending: BTreeMap<&ElementKey, VecDeque<usize>> = BTreeMap::new();
    for (i, k) in ka.iter().enumerate() {
        if !a_matched[i] {
            pending.entry(k).or_default().push_back(i);
        }
    }

    let mut out = ArrayDelta::default();
    let mut matched = pairs;
    for (j, k) in kb.iter().enumerate() {
        if b_matched[j] {
            continue;
        }
        match pending.get_mut(k).and_then(VecDeque::pop_front) {
            Some(i) => {
                out.moved.push(Move {
                    from: i,
                    to: j,
                    key: k.token(),
                });
                matched.push((i, j));
            }
            None => out.inserted.push(Indexed {
                at: j,
                value: b[j].clone(),
            }),
        }
    }

    let mut removed: Vec<usize> = pending.into_values().flatten().collect();
    removed.sort_unstable();
    out.removed = removed
        .into_iter()
        .map(|i| Indexed {
            at: i,
            value: a[i].clone(),
        })
        .collect();

    matched.sort_unstable_by_key(|&(_, j)| j);
    for (i, j) in matched {
        if let Some(delta) = diff(s, &a[i], &b[j])? {
            out.changed.push(Changed {
                at: j,
                key: kb[j].token(),
                delta,
            });
        }
    }

    if out.is_empty() {
        return Ok(None);
    }
    Ok(Some(Delta::Array(out)))
}

/// Longest common subsequence of two key sequences as `(i, j)` index pairs,
/// increasing in both coordinates.
fn lcs_pairs<K: PartialEq>(a: &[K], b: &[K]) -> Vec<(usize, usize)> {
    let mut head = 0;
    while head < a.len() && head < b.len() && a[head] == b[head] {
        head += 1;
    }
    let mut tail = 0;
    while tail < a.len() - head && tail < b.len() - head && a[a.len() - 1 - tail] == b[b.len() - 1 - tail] {
        tail += 1;
    }

    let am = &a[head..a.len() - tail];
    let bm = &b[head..b.len() - tail];
    let (n, m) = (am.len(), bm.len());

    // table[i][j] = LCS length of am[i..] and bm[j..]
    let mut table = vec![vec![0u32; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i][j] = if am[i] == bm[j] {
                table[i + 1][j + 1] + 1
            } else {
                table[i + 1][j].max(table[i][j + 1])
            };
        }
    }

    let mut pairs: Vec<(usize, usize)> = (0..head).map(|k| (k, k)).collect();
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if am[i] == bm[j] {
            pairs.push((head + i, head + j));
            i += 1;
            j += 1;
        } else if table[i + 1][j] >= table[i][j + 1] {
            i += 1;
        } else {
            j += 1;
        }
    }
    for k in 0..tail {
        pairs.push((a.len() - tail + k, b.len() - tail + k));
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lcs_basic() {
        let a = ["a", "b", "c", "d"];
        let b = ["b", "x", "c", "d"];
        assert_eq!(lcs_pairs(&a, &b), vec![(1, 0), (2, 2), (3, 3)]);
    }

    #[test]
    fn lcs_handles_empty_and_identical() {
        let e: [&str; 0] = [];
        assert!(lcs_pairs(&e, &["a"]).is_empty());
        assert_eq!(lcs_pairs(&["a", "b"], &["a", "b"]), vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn duplicate_keys_match_in_order() {
        let a = ["x", "x", "y"];
        let b = ["y", "x", "x"];
        let pairs = lcs_pairs(&a, &b);
        assert_eq!(pairs, vec![(0, 1), (1, 2)]);
    }
}
