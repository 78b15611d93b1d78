//! Relational operator kernels over [`RowAccess`]
//!
//! Kernels are generic over the access type so they run unchanged on every
//! storage, plain or compressed, and on type-erased views of other columns.

use std::time::Instant;
use tracing::{debug, info, trace};

use super::element::{ArithmeticOp, ColumnElement, RowAccess};
use crate::config::{ColumnConfig, Verbosity};
use crate::error::{ColumnError, Result};
use crate::types::{PositionList, SortOrder, Tid, ValueComparator};

// ============================================================================
// Diagnostics
// ============================================================================

/// Progress and timing events for one operator invocation
pub(crate) struct OperatorTrace<'a> {
    column: &'a str,
    operator: &'static str,
    verbosity: Verbosity,
    started: Option<Instant>,
}

impl<'a> OperatorTrace<'a> {
    pub(crate) fn begin(column: &'a str, operator: &'static str, config: &ColumnConfig, rows: usize) -> Self {
        if config.verbosity.is_verbose() {
            debug!(column, operator, rows, "Running operator");
        }
        Self {
            column,
            operator,
            verbosity: config.verbosity,
            started: config.time_operations.then(Instant::now),
        }
    }

    /// Per-match event, emitted only at debug verbosity
    pub(crate) fn matched(&self, left: Tid, right: Tid) {
        if self.verbosity.is_debug() {
            trace!(column = self.column, operator = self.operator, left, right, "Match");
        }
    }

    pub(crate) fn finish(self, produced: usize) {
        if let Some(started) = self.started {
            info!(
                column = self.column,
                operator = self.operator,
                produced,
                elapsed_us = started.elapsed().as_micros() as u64,
                "Operator finished"
            );
        } else if self.verbosity.is_verbose() {
            debug!(column = self.column, operator = self.operator, produced, "Operator finished");
        }
    }
}

// ============================================================================
// Sort and selection
// ============================================================================

/// Stable sort of row TIDs by value
pub fn sort<T, A>(access: &A, order: SortOrder) -> PositionList
where
    T: ColumnElement,
    A: RowAccess<T> + ?Sized,
{
    let rows = access.row_count();
    let values: Vec<&T> = access.scan(0..rows).collect();
    let mut tids: PositionList = (0..values.len()).collect();
    match order {
        SortOrder::Ascending => tids.sort_by(|&a, &b| values[a].compare(values[b])),
        SortOrder::Descending => tids.sort_by(|&a, &b| values[b].compare(values[a])),
    }
    tids
}

#[inline]
fn satisfies<T: ColumnElement>(row: &T, value: &T, comparator: ValueComparator) -> bool {
    match comparator {
        ValueComparator::Less => row < value,
        ValueComparator::Greater => row > value,
        ValueComparator::Equal => row == value,
    }
}

fn select_range<T, A>(access: &A, value: &T, comparator: ValueComparator, start: Tid, end: Tid) -> PositionList
where
    T: ColumnElement,
    A: RowAccess<T> + ?Sized,
{
    access
        .scan(start..end)
        .enumerate()
        .filter(|(_, row)| satisfies(*row, value, comparator))
        .map(|(offset, _)| start + offset)
        .collect()
}

/// TIDs of rows satisfying `row <comparator> value`, ascending
pub fn selection<T, A>(access: &A, value: &T, comparator: ValueComparator) -> PositionList
where
    T: ColumnElement,
    A: RowAccess<T> + ?Sized,
{
    select_range(access, value, comparator, 0, access.row_count())
}

/// Selection split over `thread_count` contiguous partitions.
///
/// Partition results are concatenated in partition order, so the output
/// equals [`selection`]. More threads than rows are clamped.
pub fn parallel_selection<T, A>(
    access: &A,
    value: &T,
    comparator: ValueComparator,
    thread_count: usize,
) -> Result<PositionList>
where
    T: ColumnElement,
    A: RowAccess<T> + ?Sized,
{
    if thread_count == 0 {
        return Err(ColumnError::InvalidArgument("thread count must be at least 1".into()));
    }
    let rows = access.row_count();
    if rows == 0 {
        return Ok(PositionList::new());
    }
    let workers = thread_count.min(rows);
    let chunk = rows.div_ceil(workers);

    let partials = crossbeam::thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                let start = worker * chunk;
                let end = (start + chunk).min(rows);
                scope.spawn(move |_| select_range(access, value, comparator, start, end))
            })
            .collect();
        handles.into_iter().map(|handle| handle.join()).collect::<Vec<_>>()
    })
    .map_err(|_| ColumnError::Internal("selection worker panicked".into()))?;

    let mut result = PositionList::new();
    for partial in partials {
        let partial = partial.map_err(|_| ColumnError::Internal("selection worker panicked".into()))?;
        result.extend(partial);
    }
    Ok(result)
}

// ============================================================================
// Arithmetic
// ============================================================================

/// New row values for `row <op> rhs`; nothing is written on failure
pub fn apply_scalar<T, A>(access: &A, op: ArithmeticOp, rhs: &T) -> Result<Vec<T>>
where
    T: ColumnElement,
    A: RowAccess<T> + ?Sized,
{
    access.scan(0..access.row_count()).map(|row| row.apply(op, rhs)).collect()
}

/// New row values for `left[i] <op> right[i]`; both sides have equal length
pub fn apply_columns<T, L, R>(left: &L, right: &R, op: ArithmeticOp) -> Result<Vec<T>>
where
    T: ColumnElement,
    L: RowAccess<T> + ?Sized,
    R: RowAccess<T> + ?Sized,
{
    let rows = left.row_count();
    left.scan(0..rows)
        .zip(right.scan(0..rows))
        .map(|(l, r)| l.apply(op, r))
        .collect()
}
