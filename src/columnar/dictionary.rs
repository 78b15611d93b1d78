//! Dictionary-compressed storage
//!
//! Unique values live once in `dictionary` (first-seen order); each row
//! stores an index into it. Dictionary entries are never removed, so the
//! indices held by other rows stay valid without a compaction pass. The
//! dictionary may therefore hold entries no row references any more.

use serde::{Deserialize, Serialize};
use std::fmt::Write;

use super::element::{ColumnElement, RowAccess};
use super::typed::{ColumnStorage, TypedColumn};
use crate::error::{ColumnError, Result};
use crate::types::{CompressionCodec, Tid};

/// Dictionary-compressed column of `T`
pub type DictionaryColumn<T> = TypedColumn<T, DictionaryStorage<T>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: ColumnElement")]
pub struct DictionaryStorage<T> {
    dictionary: Vec<T>,
    table: Vec<usize>,
}

impl<T: ColumnElement> DictionaryStorage<T> {
    /// Unique values in first-seen order
    pub fn dictionary(&self) -> &[T] {
        &self.dictionary
    }

    /// Per-row dictionary indices
    pub fn table(&self) -> &[usize] {
        &self.table
    }

    /// Index of `value` in the dictionary, appending it when unseen
    fn intern(&mut self, value: T) -> usize {
        match self.dictionary.iter().position(|entry| *entry == value) {
            Some(index) => index,
            None => {
                self.dictionary.push(value);
                self.dictionary.len() - 1
            }
        }
    }
}

impl<T: ColumnElement> RowAccess<T> for DictionaryStorage<T> {
    #[inline]
    fn row_count(&self) -> usize {
        self.table.len()
    }

    #[inline]
    fn value_at(&self, tid: Tid) -> Option<&T> {
        self.table.get(tid).and_then(|&index| self.dictionary.get(index))
    }
}

impl<T: ColumnElement> ColumnStorage<T> for DictionaryStorage<T> {
    const CODEC: CompressionCodec = CompressionCodec::Dictionary;

    fn push(&mut self, value: T) {
        let index = self.intern(value);
        self.table.push(index);
    }

    fn replace(&mut self, tid: Tid, value: T) {
        let index = self.intern(value);
        self.table[tid] = index;
    }

    fn remove(&mut self, tid: Tid) {
        self.table.remove(tid);
    }

    fn clear(&mut self) {
        self.table.clear();
        self.dictionary.clear();
    }

    fn size_in_bytes(&self) -> usize {
        self.table.len() * std::mem::size_of::<usize>()
            + self.dictionary.iter().map(ColumnElement::footprint).sum::<usize>()
    }

    fn render(&self, name: &str) -> String {
        let mut out = format!("{}({})\n", name, self.table.len());
        for &index in &self.table {
            let _ = writeln!(out, "\t{}: {}", index, self.dictionary[index]);
        }
        out
    }

    fn finish_load(&mut self) -> Result<()> {
        if let Some(&bad) = self.table.iter().find(|&&index| index >= self.dictionary.len()) {
            return Err(ColumnError::Format(format!(
                "dictionary index {} out of range for {} entries",
                bad,
                self.dictionary.len()
            )));
        }
        Ok(())
    }
}
