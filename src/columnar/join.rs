//! Equi-join kernels
//!
//! All three joins produce the same set of matched `(left, right)` pairs;
//! they differ only in emission order and cost. `left` is always the
//! calling column.

use std::cmp::Ordering;
use std::collections::HashMap;

use super::element::{ColumnElement, RowAccess};
use super::ops::{self, OperatorTrace};
use crate::types::{PositionListPair, SortOrder, Tid};

/// Hash join: builds over `left`, probes with `right` in row order.
///
/// Buckets keep build TIDs in insertion order, so output is
/// probe-row-major, then ascending build TID.
pub fn hash_join<T, L, R>(left: &L, right: &R) -> PositionListPair
where
    T: ColumnElement,
    L: RowAccess<T> + ?Sized,
    R: RowAccess<T> + ?Sized,
{
    let build_rows = left.row_count();
    let mut table: HashMap<T::JoinKey, Vec<Tid>> = HashMap::with_capacity(build_rows);
    for (tid, value) in left.scan(0..build_rows).enumerate() {
        if let Some(key) = value.join_key() {
            table.entry(key).or_default().push(tid);
        }
    }

    let mut result = PositionListPair::new();
    for (probe_tid, value) in right.scan(0..right.row_count()).enumerate() {
        let Some(bucket) = value.join_key().and_then(|key| table.get(&key)) else {
            continue;
        };
        for &build_tid in bucket {
            result.push(build_tid, probe_tid);
        }
    }
    result
}

/// Nested-loop join, row-major over `left`, inner loop over `right`
pub fn nested_loop_join<T, L, R>(left: &L, right: &R, trace: &OperatorTrace<'_>) -> PositionListPair
where
    T: ColumnElement,
    L: RowAccess<T> + ?Sized,
    R: RowAccess<T> + ?Sized,
{
    let inner: Vec<&T> = right.scan(0..right.row_count()).collect();
    let mut result = PositionListPair::new();
    for (i, outer) in left.scan(0..left.row_count()).enumerate() {
        for (j, candidate) in inner.iter().enumerate() {
            if outer == *candidate {
                trace.matched(i, j);
                result.push(i, j);
            }
        }
    }
    result
}

/// Sort-merge join.
///
/// Both sides are sorted with the stable sort operator, then merged run by
/// run. Each pair of equal runs emits the cross product of the original
/// TIDs, ascending within each side.
pub fn sort_merge_join<T, L, R>(left: &L, right: &R) -> PositionListPair
where
    T: ColumnElement,
    L: RowAccess<T> + ?Sized,
    R: RowAccess<T> + ?Sized,
{
    let left_order = ops::sort(left, SortOrder::Ascending);
    let right_order = ops::sort(right, SortOrder::Ascending);
    let left_values: Vec<&T> = left.scan(0..left.row_count()).collect();
    let right_values: Vec<&T> = right.scan(0..right.row_count()).collect();

    let run_end = |order: &[Tid], values: &[&T], start: usize| {
        let head = values[order[start]];
        let mut end = start + 1;
        while end < order.len() && values[order[end]].compare(head) == Ordering::Equal {
            end += 1;
        }
        end
    };

    let mut result = PositionListPair::new();
    let (mut i, mut j) = (0, 0);
    while i < left_order.len() && j < right_order.len() {
        let a = left_values[left_order[i]];
        let b = right_values[right_order[j]];
        match a.compare(b) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                let i_end = run_end(&left_order, &left_values, i);
                let j_end = run_end(&right_order, &right_values, j);
                // NaN runs compare equal in sort order but never join
                if a == b {
                    for &l in &left_order[i..i_end] {
                        for &r in &right_order[j..j_end] {
                            result.push(l, r);
                        }
                    }
                }
                i = i_end;
                j = j_end;
            }
        }
    }
    result
}
