//! Pure CPU kernels over sorted sparse entry lists
//!
//! Vector entries are `(key, value)` pairs sorted by key; matrix entries are
//! `(row, col, value)` triples in row-major order. Every kernel consumes its
//! inputs immutably and returns a freshly built, sorted output, so a caller
//! can compute first and commit only on success.
//!
//! Fold semantics follow the sparse discipline throughout: an output entry
//! exists only when at least one input contributed to it, and a fold that
//! does run starts from the given `init` value.

use crate::dtype::Value;
use crate::op::{BinaryOp, SelectOp, UnaryOp};
use std::collections::{BTreeMap, HashMap, HashSet};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// A sorted sparse vector entry
pub(super) type VEntry = (u32, Value);
/// A row-major sorted sparse matrix entry
pub(super) type MEntry = (u32, u32, Value);

/// Group row-major triples into `(row, contiguous slice)` pairs
fn rows_of(entries: &[MEntry]) -> Vec<(u32, &[MEntry])> {
    let mut out = Vec::new();
    let mut start = 0;
    while start < entries.len() {
        let row = entries[start].0;
        let mut end = start + 1;
        while end < entries.len() && entries[end].0 == row {
            end += 1;
        }
        out.push((row, &entries[start..end]));
        start = end;
    }
    out
}

/// Index triples by row for random access
fn row_index(entries: &[MEntry]) -> HashMap<u32, &[MEntry]> {
    rows_of(entries).into_iter().collect()
}

/// Mask indices whose stored value passes the gate.
///
/// Absent mask entries are never tested, so they can never pass.
fn mask_pass(mask: &[VEntry], select: &'static SelectOp) -> HashSet<u32> {
    mask.iter()
        .filter(|&&(_, v)| select.test(v))
        .map(|&(k, _)| k)
        .collect()
}

/// Fold the products of one sorted-by-col row against a sorted vector.
/// Returns `None` when the patterns do not overlap.
fn dot(
    row: &[MEntry],
    v: &[VEntry],
    mult: &'static BinaryOp,
    add: &'static BinaryOp,
    init: Value,
) -> Option<Value> {
    let mut acc = None;
    let mut i = 0;
    let mut j = 0;
    while i < row.len() && j < v.len() {
        let (_, col, mv) = row[i];
        let (key, vv) = v[j];
        match col.cmp(&key) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                let prod = mult.apply(mv, vv);
                acc = Some(add.apply(acc.unwrap_or(init), prod));
                i += 1;
                j += 1;
            }
        }
    }
    acc
}

/// `C = A (x) B` under `(mult, add)`
pub(super) fn mxm(
    a: &[MEntry],
    b: &[MEntry],
    mult: &'static BinaryOp,
    add: &'static BinaryOp,
    init: Value,
    par_threshold: usize,
) -> Vec<MEntry> {
    let b_rows = row_index(b);
    let a_rows = rows_of(a);

    let emit_row = |&(row, row_entries): &(u32, &[MEntry])| -> Vec<MEntry> {
        let mut acc: BTreeMap<u32, Value> = BTreeMap::new();
        for &(_, k, av) in row_entries {
            if let Some(b_row) = b_rows.get(&k) {
                for &(_, j, bv) in *b_row {
                    let prod = mult.apply(av, bv);
                    let cell = acc.entry(j).or_insert(init);
                    *cell = add.apply(*cell, prod);
                }
            }
        }
        acc.into_iter().map(|(j, v)| (row, j, v)).collect()
    };

    #[cfg(feature = "rayon")]
    if a.len() >= par_threshold {
        return a_rows.par_iter().map(emit_row).flatten().collect();
    }
    let _ = par_threshold;
    a_rows.iter().flat_map(|r| emit_row(r)).collect()
}

/// `C = A (x) B^T` computed only at mask entries passing `select`
pub(super) fn mxmt_masked(
    mask: &[MEntry],
    a: &[MEntry],
    b: &[MEntry],
    mult: &'static BinaryOp,
    add: &'static BinaryOp,
    select: &'static SelectOp,
    init: Value,
) -> Vec<MEntry> {
    let a_rows = row_index(a);
    let b_rows = row_index(b);
    let mut out = Vec::new();
    for &(i, j, mv) in mask {
        if !select.test(mv) {
            continue;
        }
        let (Some(a_row), Some(b_row)) = (a_rows.get(&i), b_rows.get(&j)) else {
            continue;
        };
        // Row j of B is column j of B^T; both slices are sorted by col.
        let b_as_vec: Vec<VEntry> = b_row.iter().map(|&(_, c, v)| (c, v)).collect();
        if let Some(v) = dot(a_row, &b_as_vec, mult, add, init) {
            out.push((i, j, v));
        }
    }
    out
}

/// `r = M (x) v`, computed only at mask entries passing `select`
pub(super) fn mxv_masked(
    mask: &[VEntry],
    m: &[MEntry],
    v: &[VEntry],
    mult: &'static BinaryOp,
    add: &'static BinaryOp,
    select: &'static SelectOp,
    init: Value,
) -> Vec<VEntry> {
    let m_rows = row_index(m);
    let mut out = Vec::new();
    for &(i, mv) in mask {
        if !select.test(mv) {
            continue;
        }
        if let Some(row) = m_rows.get(&i) {
            if let Some(val) = dot(row, v, mult, add, init) {
                out.push((i, val));
            }
        }
    }
    out
}

/// `r = v (x) M`, computed only at mask entries passing `select`
pub(super) fn vxm_masked(
    mask: &[VEntry],
    v: &[VEntry],
    m: &[MEntry],
    mult: &'static BinaryOp,
    add: &'static BinaryOp,
    select: &'static SelectOp,
    init: Value,
) -> Vec<VEntry> {
    let pass = mask_pass(mask, select);
    let v_map: HashMap<u32, Value> = v.iter().copied().collect();
    let mut acc: BTreeMap<u32, Value> = BTreeMap::new();
    for &(i, j, mval) in m {
        if !pass.contains(&j) {
            continue;
        }
        if let Some(&vv) = v_map.get(&i) {
            let prod = mult.apply(vv, mval);
            let cell = acc.entry(j).or_insert(init);
            *cell = add.apply(*cell, prod);
        }
    }
    acc.into_iter().collect()
}

/// Union merge of two sorted vectors; `op` combines both-present keys
pub(super) fn v_union(u: &[VEntry], v: &[VEntry], op: &'static BinaryOp) -> Vec<VEntry> {
    let mut out = Vec::with_capacity(u.len() + v.len());
    let mut i = 0;
    let mut j = 0;
    while i < u.len() && j < v.len() {
        match u[i].0.cmp(&v[j].0) {
            std::cmp::Ordering::Less => {
                out.push(u[i]);
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                out.push(v[j]);
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                out.push((u[i].0, op.apply(u[i].1, v[j].1)));
                i += 1;
                j += 1;
            }
        }
    }
    out.extend_from_slice(&u[i..]);
    out.extend_from_slice(&v[j..]);
    out
}

/// Union merge of `v` into `r` that also reports feedback: every key whose
/// stored value changed (combined to a new value, or newly inserted) is
/// echoed with its post-merge value.
pub(super) fn v_eadd_fdb(
    r: &[VEntry],
    v: &[VEntry],
    op: &'static BinaryOp,
) -> (Vec<VEntry>, Vec<VEntry>) {
    let mut out = Vec::with_capacity(r.len() + v.len());
    let mut fdb = Vec::new();
    let mut i = 0;
    let mut j = 0;
    while i < r.len() && j < v.len() {
        match r[i].0.cmp(&v[j].0) {
            std::cmp::Ordering::Less => {
                out.push(r[i]);
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                out.push(v[j]);
                fdb.push(v[j]);
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                let merged = (r[i].0, op.apply(r[i].1, v[j].1));
                if merged.1 != r[i].1 {
                    fdb.push(merged);
                }
                out.push(merged);
                i += 1;
                j += 1;
            }
        }
    }
    out.extend_from_slice(&r[i..]);
    for &e in &v[j..] {
        out.push(e);
        fdb.push(e);
    }
    (out, fdb)
}

/// Intersection merge of two sorted vectors
pub(super) fn v_intersection(u: &[VEntry], v: &[VEntry], op: &'static BinaryOp) -> Vec<VEntry> {
    let mut out = Vec::new();
    let mut i = 0;
    let mut j = 0;
    while i < u.len() && j < v.len() {
        match u[i].0.cmp(&v[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push((u[i].0, op.apply(u[i].1, v[j].1)));
                i += 1;
                j += 1;
            }
        }
    }
    out
}

/// Union merge of two row-major sorted matrices
pub(super) fn m_union(a: &[MEntry], b: &[MEntry], op: &'static BinaryOp) -> Vec<MEntry> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let mut i = 0;
    let mut j = 0;
    while i < a.len() && j < b.len() {
        let ka = (a[i].0, a[i].1);
        let kb = (b[j].0, b[j].1);
        match ka.cmp(&kb) {
            std::cmp::Ordering::Less => {
                out.push(a[i]);
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                out.push(b[j]);
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                out.push((ka.0, ka.1, op.apply(a[i].2, b[j].2)));
                i += 1;
                j += 1;
            }
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}

/// Intersection merge of two row-major sorted matrices
pub(super) fn m_intersection(a: &[MEntry], b: &[MEntry], op: &'static BinaryOp) -> Vec<MEntry> {
    let mut out = Vec::new();
    let mut i = 0;
    let mut j = 0;
    while i < a.len() && j < b.len() {
        let ka = (a[i].0, a[i].1);
        let kb = (b[j].0, b[j].1);
        match ka.cmp(&kb) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push((ka.0, ka.1, op.apply(a[i].2, b[j].2)));
                i += 1;
                j += 1;
            }
        }
    }
    out
}

/// Fold an iterator of values from `init`
pub(super) fn reduce<I>(values: I, op: &'static BinaryOp, init: Value) -> Value
where
    I: Iterator<Item = Value>,
{
    values.fold(init, |acc, v| op.apply(acc, v))
}

/// Parallel fold over a value slice; both fold directions agree because
/// reduce operators in the catalog are associative. Chunks fold without a
/// seed so `init` enters the result exactly once, after the combine.
#[cfg(feature = "rayon")]
pub(super) fn reduce_par(
    values: &[Value],
    op: &'static BinaryOp,
    init: Value,
) -> Value {
    let total = values
        .par_iter()
        .copied()
        .fold(|| None, |acc: Option<Value>, v| match acc {
            Some(acc) => Some(op.apply(acc, v)),
            None => Some(v),
        })
        .reduce(|| None, |a, b| match (a, b) {
            (Some(a), Some(b)) => Some(op.apply(a, b)),
            (a, None) => a,
            (None, b) => b,
        });
    match total {
        Some(total) => op.apply(init, total),
        None => init,
    }
}

/// Fold each row into one entry; rows with no entries produce none
pub(super) fn reduce_by_row(
    m: &[MEntry],
    op: &'static BinaryOp,
    init: Value,
) -> Vec<VEntry> {
    rows_of(m)
        .into_iter()
        .map(|(row, entries)| {
            (row, reduce(entries.iter().map(|&(_, _, v)| v), op, init))
        })
        .collect()
}

/// Fold each column into one entry; columns with no entries produce none
pub(super) fn reduce_by_column(
    m: &[MEntry],
    op: &'static BinaryOp,
    init: Value,
) -> Vec<VEntry> {
    let mut acc: BTreeMap<u32, Value> = BTreeMap::new();
    for &(_, col, v) in m {
        let cell = acc.entry(col).or_insert(init);
        *cell = op.apply(*cell, v);
    }
    acc.into_iter().collect()
}

/// Transpose with a value map
pub(super) fn transpose(a: &[MEntry], apply: &'static UnaryOp) -> Vec<MEntry> {
    let mut out: Vec<MEntry> = a
        .iter()
        .map(|&(i, j, v)| (j, i, apply.apply(v)))
        .collect();
    out.sort_by_key(|&(r, c, _)| (r, c));
    out
}

/// Project one row into a vector
pub(super) fn extract_row(a: &[MEntry], index: u32, apply: &'static UnaryOp) -> Vec<VEntry> {
    a.iter()
        .filter(|&&(i, _, _)| i == index)
        .map(|&(_, j, v)| (j, apply.apply(v)))
        .collect()
}

/// Project one column into a vector
pub(super) fn extract_column(a: &[MEntry], index: u32, apply: &'static UnaryOp) -> Vec<VEntry> {
    a.iter()
        .filter(|&&(_, j, _)| j == index)
        .map(|&(i, _, v)| (i, apply.apply(v)))
        .collect()
}

/// Kronecker product; block shape comes from `b`'s full shape
pub(super) fn kron(
    a: &[MEntry],
    b: &[MEntry],
    b_rows: u32,
    b_cols: u32,
    mult: &'static BinaryOp,
) -> Vec<MEntry> {
    let mut out = Vec::with_capacity(a.len() * b.len());
    for &(ai, aj, av) in a {
        for &(bi, bj, bv) in b {
            out.push((ai * b_rows + bi, aj * b_cols + bj, mult.apply(av, bv)));
        }
    }
    out.sort_by_key(|&(r, c, _)| (r, c));
    out
}

/// Map every value, preserving the pattern
pub(super) fn v_map(v: &[VEntry], apply: &'static UnaryOp) -> Vec<VEntry> {
    v.iter().map(|&(k, val)| (k, apply.apply(val))).collect()
}

/// Masked assignment: at mask entries passing `select`, combine the present
/// entry with `value` or insert `value` where absent
pub(super) fn assign_masked(
    r: &[VEntry],
    mask: &[VEntry],
    value: Value,
    assign: &'static BinaryOp,
    select: &'static SelectOp,
) -> Vec<VEntry> {
    let pass = mask_pass(mask, select);
    let mut merged: BTreeMap<u32, Value> = r.iter().copied().collect();
    for &key in &pass {
        match merged.get_mut(&key) {
            Some(old) => *old = assign.apply(*old, value),
            None => {
                merged.insert(key, value);
            }
        }
    }
    merged.into_iter().collect()
}
