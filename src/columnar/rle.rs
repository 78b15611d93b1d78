//! Run-length-compressed storage
//!
//! Rows are kept as `(length, value)` runs. Mapping a row to its run is a
//! linear walk over the runs, so this layout pays off only for columns with
//! long stretches of repeated values. Splits and removals never merge
//! neighbouring runs: adjacent runs may hold equal values, the only
//! invariant is that run lengths sum to the row count.

use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::ops::Range;

use super::element::{ColumnElement, RowAccess};
use super::typed::{ColumnStorage, TypedColumn};
use crate::error::{ColumnError, Result};
use crate::types::{CompressionCodec, Tid};

/// Run-length-compressed column of `T`
pub type RleColumn<T> = TypedColumn<T, RunLengthStorage<T>>;

/// Longest run `insert` will grow, one below `u8::MAX`
pub const MAX_RUN_LENGTH: u8 = u8::MAX - 1;

/// One run of identical values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: ColumnElement")]
pub struct Run<T> {
    pub length: u8,
    pub value: T,
}

impl<T> Run<T> {
    fn single(value: T) -> Self {
        Self { length: 1, value }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: ColumnElement")]
pub struct RunLengthStorage<T> {
    runs: Vec<Run<T>>,
    /// Cached sum of run lengths
    #[serde(skip)]
    rows: usize,
}

impl<T: ColumnElement> RunLengthStorage<T> {
    pub fn runs(&self) -> &[Run<T>] {
        &self.runs
    }

    /// Locate the run holding `tid`: `(run index, offset within run)`
    fn locate(&self, tid: Tid) -> Option<(usize, usize)> {
        let mut run_start = 0;
        for (index, run) in self.runs.iter().enumerate() {
            let length = run.length as usize;
            if tid < run_start + length {
                return Some((index, tid - run_start));
            }
            run_start += length;
        }
        None
    }
}

impl<T: ColumnElement> RowAccess<T> for RunLengthStorage<T> {
    #[inline]
    fn row_count(&self) -> usize {
        self.rows
    }

    fn value_at(&self, tid: Tid) -> Option<&T> {
        self.locate(tid).map(|(run, _)| &self.runs[run].value)
    }

    fn scan(&self, range: Range<Tid>) -> Box<dyn Iterator<Item = &T> + '_> {
        let end = range.end.min(self.rows);
        if range.start >= end {
            return Box::new(std::iter::empty());
        }
        let Some((first, offset)) = self.locate(range.start) else {
            return Box::new(std::iter::empty());
        };

        let values = self.runs[first..]
            .iter()
            .enumerate()
            .flat_map(move |(i, run)| {
                let skip = if i == 0 { offset } else { 0 };
                std::iter::repeat(&run.value).take(run.length as usize - skip)
            })
            .take(end - range.start);
        Box::new(values)
    }
}

impl<T: ColumnElement> ColumnStorage<T> for RunLengthStorage<T> {
    const CODEC: CompressionCodec = CompressionCodec::RunLength;

    fn push(&mut self, value: T) {
        self.rows += 1;
        if let Some(last) = self.runs.last_mut() {
            if last.value == value && last.length < MAX_RUN_LENGTH {
                last.length += 1;
                return;
            }
        }
        self.runs.push(Run::single(value));
    }

    fn replace(&mut self, tid: Tid, value: T) {
        let Some((index, offset)) = self.locate(tid) else {
            return;
        };
        let run = &mut self.runs[index];
        if run.value == value {
            return;
        }

        let length = run.length as usize;
        if length == 1 {
            run.value = value;
        } else if offset == 0 {
            run.length -= 1;
            self.runs.insert(index, Run::single(value));
        } else if offset == length - 1 {
            run.length -= 1;
            self.runs.insert(index + 1, Run::single(value));
        } else {
            // split into prefix, new singleton, suffix
            let suffix = Run {
                length: (length - offset - 1) as u8,
                value: run.value.clone(),
            };
            run.length = offset as u8;
            self.runs.splice(index + 1..index + 1, [Run::single(value), suffix]);
        }
    }

    fn remove(&mut self, tid: Tid) {
        let Some((index, _)) = self.locate(tid) else {
            return;
        };
        if self.runs[index].length == 1 {
            self.runs.remove(index);
        } else {
            self.runs[index].length -= 1;
        }
        self.rows -= 1;
    }

    fn clear(&mut self) {
        self.runs.clear();
        self.rows = 0;
    }

    fn size_in_bytes(&self) -> usize {
        self.runs
            .iter()
            .map(|run| std::mem::size_of::<u8>() + run.value.footprint())
            .sum()
    }

    fn render(&self, name: &str) -> String {
        let mut out = format!("{}({})\n", name, self.rows);
        for run in &self.runs {
            for _ in 0..run.length {
                let _ = writeln!(out, "{}", run.value);
            }
        }
        out
    }

    fn finish_load(&mut self) -> Result<()> {
        if self.runs.iter().any(|run| run.length == 0) {
            return Err(ColumnError::Format("run of length 0".into()));
        }
        self.rows = self.runs.iter().map(|run| run.length as usize).sum();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columnar::Column;
    use crate::types::Value;

    fn runs_of(col: &RleColumn<i32>) -> Vec<(u8, i32)> {
        col.storage().runs().iter().map(|r| (r.length, r.value)).collect()
    }

    fn column(values: &[i32]) -> RleColumn<i32> {
        let mut col = RleColumn::new("ints");
        col.extend(values.iter().copied());
        col
    }

    #[test]
    fn test_insert_builds_runs() {
        let col = column(&[7, 7, 7, 2, 2]);
        assert_eq!(runs_of(&col), vec![(3, 7), (2, 2)]);
        assert_eq!(col.len(), 5);
    }

    #[test]
    fn test_interior_update_splits() {
        let mut col = column(&[7, 7, 7, 2, 2]);
        col.update(1, &Value::Int(9)).unwrap();
        assert_eq!(runs_of(&col), vec![(1, 7), (1, 9), (1, 7), (2, 2)]);
        assert_eq!(col.len(), 5);
        assert_eq!(col.to_vec(), vec![7, 9, 7, 2, 2]);
    }

    #[test]
    fn test_leading_and_trailing_update() {
        let mut col = column(&[7, 7, 7]);
        col.update(0, &Value::Int(1)).unwrap();
        assert_eq!(runs_of(&col), vec![(1, 1), (2, 7)]);

        col.update(2, &Value::Int(3)).unwrap();
        assert_eq!(runs_of(&col), vec![(1, 1), (1, 7), (1, 3)]);
        assert_eq!(col.to_vec(), vec![1, 7, 3]);
    }

    #[test]
    fn test_singleton_update_in_place() {
        let mut col = column(&[1, 2, 3]);
        col.update(1, &Value::Int(5)).unwrap();
        assert_eq!(runs_of(&col), vec![(1, 1), (1, 5), (1, 3)]);
    }

    #[test]
    fn test_same_value_update_is_noop() {
        let mut col = column(&[4, 4, 4]);
        col.update(1, &Value::Int(4)).unwrap();
        assert_eq!(runs_of(&col), vec![(3, 4)]);
    }

    #[test]
    fn test_remove_shrinks_or_erases_run() {
        let mut col = column(&[7, 7, 2, 7]);
        col.remove(0).unwrap();
        assert_eq!(runs_of(&col), vec![(1, 7), (1, 2), (1, 7)]);

        col.remove(1).unwrap();
        // neighbouring runs are not merged back together
        assert_eq!(runs_of(&col), vec![(1, 7), (1, 7)]);
        assert_eq!(col.to_vec(), vec![7, 7]);
        assert_eq!(col.len(), 2);
    }

    #[test]
    fn test_run_length_cap() {
        let col = column(&vec![1; 300]);
        assert_eq!(runs_of(&col), vec![(MAX_RUN_LENGTH, 1), (46, 1)]);
        assert_eq!(col.len(), 300);
        assert_eq!(col.get(299).unwrap(), Value::Int(1));
    }

    #[test]
    fn test_scan_from_middle_of_run() {
        let col = column(&[1, 1, 1, 2, 2, 3]);
        let values: Vec<i32> = col.storage().scan(2..5).copied().collect();
        assert_eq!(values, vec![1, 2, 2]);
        assert_eq!(col.storage().scan(6..9).count(), 0);
    }

    #[test]
    fn test_size_in_bytes_counts_runs() {
        let col = column(&[1, 1, 1, 2]);
        assert_eq!(col.size_in_bytes(), 2 * (1 + std::mem::size_of::<i32>()));
    }

    #[test]
    fn test_finish_load_recomputes_rows() {
        let mut storage = RunLengthStorage::<i32> {
            runs: vec![Run { length: 3, value: 1 }, Run { length: 2, value: 4 }],
            rows: 0,
        };
        storage.finish_load().unwrap();
        assert_eq!(storage.row_count(), 5);

        storage.runs.push(Run { length: 0, value: 9 });
        assert!(storage.finish_load().is_err());
    }
}
