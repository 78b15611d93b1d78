//! Plain (materialized) storage: one physical slot per logical row

use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::ops::Range;

use super::element::{ColumnElement, RowAccess};
use super::typed::{ColumnStorage, TypedColumn};
use crate::types::{CompressionCodec, Tid};

/// Uncompressed column of `T`
pub type PlainColumn<T> = TypedColumn<T, PlainStorage<T>>;

/// Row values stored verbatim; TID equals physical index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: ColumnElement")]
pub struct PlainStorage<T> {
    values: Vec<T>,
}

impl<T: ColumnElement> PlainStorage<T> {
    /// Physical values, in row order
    pub fn values(&self) -> &[T] {
        &self.values
    }
}

impl<T: ColumnElement> RowAccess<T> for PlainStorage<T> {
    #[inline]
    fn row_count(&self) -> usize {
        self.values.len()
    }

    #[inline]
    fn value_at(&self, tid: Tid) -> Option<&T> {
        self.values.get(tid)
    }

    fn scan(&self, range: Range<Tid>) -> Box<dyn Iterator<Item = &T> + '_> {
        let end = range.end.min(self.values.len());
        let start = range.start.min(end);
        Box::new(self.values[start..end].iter())
    }
}

impl<T: ColumnElement> ColumnStorage<T> for PlainStorage<T> {
    const CODEC: CompressionCodec = CompressionCodec::None;

    fn push(&mut self, value: T) {
        self.values.push(value);
    }

    fn replace(&mut self, tid: Tid, value: T) {
        self.values[tid] = value;
    }

    fn remove(&mut self, tid: Tid) {
        self.values.remove(tid);
    }

    fn clear(&mut self) {
        self.values.clear();
    }

    fn size_in_bytes(&self) -> usize {
        self.values.iter().map(ColumnElement::footprint).sum()
    }

    fn render(&self, name: &str) -> String {
        let mut out = format!("| {} |\n________________________\n", name);
        for value in &self.values {
            let _ = writeln!(out, "| {} |", value);
        }
        out
    }
}
