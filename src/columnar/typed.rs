//! Typed column: the column contract implemented once over any storage
//!
//! A `TypedColumn<T, S>` owns a name, a configuration and a storage `S`
//! (plain, dictionary or run-length). The storage only knows how to hold
//! rows; type checks, bounds checks, batch policy and every relational
//! operator live here and reach the rows through [`RowAccess`].

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::marker::PhantomData;
use std::path::Path;

use super::element::{ArithmeticOp, ColumnElement, RowAccess, TypedAccess};
use super::{join, ops, persist, Column};
use crate::config::ColumnConfig;
use crate::error::{ColumnError, Result};
use crate::types::{
    AttributeType, CompressionCodec, PositionList, PositionListPair, SortOrder, Tid, Value, ValueComparator,
};

/// Physical representation of a column's rows
pub trait ColumnStorage<T: ColumnElement>:
    RowAccess<T> + Clone + Default + fmt::Debug + Serialize + DeserializeOwned + 'static
{
    const CODEC: CompressionCodec;

    /// Append a row
    fn push(&mut self, value: T);

    /// Overwrite row `tid`; the caller has checked `tid < row_count()`
    fn replace(&mut self, tid: Tid, value: T);

    /// Erase row `tid`, shifting later rows down by one
    fn remove(&mut self, tid: Tid);

    fn clear(&mut self);

    fn size_in_bytes(&self) -> usize;

    /// Human-readable dump
    fn render(&self, name: &str) -> String;

    /// Rebuild derived state and check invariants after deserialization
    fn finish_load(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Column of element type `T` held in storage `S`
#[derive(Debug, Clone)]
pub struct TypedColumn<T, S> {
    name: String,
    storage: S,
    config: ColumnConfig,
    _element: PhantomData<fn() -> T>,
}

impl<T: ColumnElement, S: ColumnStorage<T>> TypedColumn<T, S> {
    /// Create an empty column
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, ColumnConfig::default())
    }

    /// Create an empty column with explicit operator configuration
    pub fn with_config(name: impl Into<String>, config: ColumnConfig) -> Self {
        Self {
            name: name.into(),
            storage: S::default(),
            config,
            _element: PhantomData,
        }
    }

    pub fn set_config(&mut self, config: ColumnConfig) {
        self.config = config;
    }

    /// Append a typed value
    pub fn push(&mut self, value: T) {
        self.storage.push(value);
    }

    /// Append typed values in order
    pub fn extend<I: IntoIterator<Item = T>>(&mut self, values: I) {
        for value in values {
            self.storage.push(value);
        }
    }

    /// Typed value at row `tid`
    pub fn value_at(&self, tid: Tid) -> Option<&T> {
        self.storage.value_at(tid)
    }

    /// Row values in order
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.storage.scan(0..self.storage.row_count())
    }

    /// Decompressed copy of all rows
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }

    /// Read-only view of the physical containers
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Swap in freshly loaded storage
    pub(crate) fn restore(&mut self, storage: S) {
        self.storage = storage;
    }

    fn check_tid(&self, tid: Tid) -> Result<()> {
        let len = self.storage.row_count();
        if tid >= len {
            return Err(ColumnError::IndexOutOfBounds { tid, len });
        }
        Ok(())
    }

    fn check_numeric(&self, op: ArithmeticOp) -> Result<()> {
        if T::ATTRIBUTE_TYPE.is_numeric() {
            Ok(())
        } else {
            Err(ColumnError::UnsupportedOperation(format!(
                "{} is not defined on {} column {}",
                op,
                T::ATTRIBUTE_TYPE,
                self.name
            )))
        }
    }

    /// Recover the typed rows of `other`, failing on element type mismatch
    fn typed_rows<'a>(&self, other: &'a dyn Column) -> Result<&'a dyn RowAccess<T>> {
        T::downcast(other.access())
            .ok_or_else(|| ColumnError::type_mismatch(T::ATTRIBUTE_TYPE, other.attribute_type().to_string()))
    }

    fn trace(&self, operator: &'static str) -> ops::OperatorTrace<'_> {
        ops::OperatorTrace::begin(&self.name, operator, &self.config, self.storage.row_count())
    }

    /// Write all computed values back through `replace`
    fn write_back(&mut self, values: Vec<T>) {
        for (tid, value) in values.into_iter().enumerate() {
            self.storage.replace(tid, value);
        }
    }
}

impl<T, S1, S2> PartialEq<TypedColumn<T, S2>> for TypedColumn<T, S1>
where
    T: ColumnElement,
    S1: ColumnStorage<T>,
    S2: ColumnStorage<T>,
{
    fn eq(&self, other: &TypedColumn<T, S2>) -> bool {
        self.storage.row_count() == other.storage.row_count() && self.iter().eq(other.iter())
    }
}

impl<T: ColumnElement, S: ColumnStorage<T>> fmt::Display for TypedColumn<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.storage.render(&self.name))
    }
}

impl<T: ColumnElement, S: ColumnStorage<T>> Column for TypedColumn<T, S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn attribute_type(&self) -> AttributeType {
        T::ATTRIBUTE_TYPE
    }

    fn codec(&self) -> CompressionCodec {
        S::CODEC
    }

    fn config(&self) -> &ColumnConfig {
        &self.config
    }

    fn access(&self) -> TypedAccess<'_> {
        T::wrap(&self.storage)
    }

    fn insert(&mut self, value: &Value) -> Result<()> {
        let value = T::from_value(value)?;
        self.storage.push(value);
        Ok(())
    }

    fn update(&mut self, tid: Tid, value: &Value) -> Result<()> {
        self.check_tid(tid)?;
        let value = T::from_value(value)?;
        self.storage.replace(tid, value);
        Ok(())
    }

    fn update_positions(&mut self, tids: &[Tid], value: &Value) -> Result<()> {
        let value = T::from_value(value)?;
        for &tid in tids {
            self.check_tid(tid)?;
        }
        for &tid in tids {
            self.storage.replace(tid, value.clone());
        }
        Ok(())
    }

    fn remove(&mut self, tid: Tid) -> Result<()> {
        self.check_tid(tid)?;
        self.storage.remove(tid);
        Ok(())
    }

    fn remove_positions(&mut self, tids: &[Tid]) -> Result<()> {
        if tids.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(ColumnError::UnsortedPositions);
        }
        if let Some(&last) = tids.last() {
            self.check_tid(last)?;
        }
        // descending, so pending TIDs are not shifted by earlier removals
        for &tid in tids.iter().rev() {
            self.storage.remove(tid);
        }
        Ok(())
    }

    fn clear_content(&mut self) {
        self.storage.clear();
    }

    fn get(&self, tid: Tid) -> Result<Value> {
        self.storage
            .value_at(tid)
            .map(|value| value.clone().into_value())
            .ok_or(ColumnError::IndexOutOfBounds {
                tid,
                len: self.storage.row_count(),
            })
    }

    fn len(&self) -> usize {
        self.storage.row_count()
    }

    fn size_in_bytes(&self) -> usize {
        self.storage.size_in_bytes()
    }

    fn copy(&self) -> Box<dyn Column> {
        Box::new(self.clone())
    }

    fn print(&self) -> String {
        self.storage.render(&self.name)
    }

    fn sort(&self, order: SortOrder) -> PositionList {
        let trace = self.trace("sort");
        let positions = ops::sort(&self.storage, order);
        trace.finish(positions.len());
        positions
    }

    fn selection(&self, value: &Value, comparator: ValueComparator) -> Result<PositionList> {
        let value = T::from_value(value)?;
        let trace = self.trace("selection");
        let positions = ops::selection(&self.storage, &value, comparator);
        trace.finish(positions.len());
        Ok(positions)
    }

    fn parallel_selection(
        &self,
        value: &Value,
        comparator: ValueComparator,
        thread_count: usize,
    ) -> Result<PositionList> {
        let value = T::from_value(value)?;
        let trace = self.trace("parallel_selection");
        let positions = ops::parallel_selection(&self.storage, &value, comparator, thread_count)?;
        trace.finish(positions.len());
        Ok(positions)
    }

    fn hash_join(&self, other: &dyn Column) -> Result<PositionListPair> {
        let probe = self.typed_rows(other)?;
        let trace = self.trace("hash_join");
        let pairs = join::hash_join(&self.storage, probe);
        trace.finish(pairs.len());
        Ok(pairs)
    }

    fn sort_merge_join(&self, other: &dyn Column) -> Result<PositionListPair> {
        let right = self.typed_rows(other)?;
        let trace = self.trace("sort_merge_join");
        let pairs = join::sort_merge_join(&self.storage, right);
        trace.finish(pairs.len());
        Ok(pairs)
    }

    fn nested_loop_join(&self, other: &dyn Column) -> Result<PositionListPair> {
        let right = self.typed_rows(other)?;
        let trace = self.trace("nested_loop_join");
        let pairs = join::nested_loop_join(&self.storage, right, &trace);
        trace.finish(pairs.len());
        Ok(pairs)
    }

    fn apply_scalar(&mut self, op: ArithmeticOp, value: &Value) -> Result<()> {
        self.check_numeric(op)?;
        let rhs = T::from_value(value)?;
        let values = ops::apply_scalar(&self.storage, op, &rhs)?;
        self.write_back(values);
        Ok(())
    }

    fn apply_column(&mut self, op: ArithmeticOp, other: &dyn Column) -> Result<()> {
        self.check_numeric(op)?;
        let rhs = self.typed_rows(other)?;
        let len = self.storage.row_count();
        if rhs.row_count() != len {
            return Err(ColumnError::type_mismatch(
                T::ATTRIBUTE_TYPE,
                format!("{} column with {} rows, expected {}", other.attribute_type(), rhs.row_count(), len),
            ));
        }
        let values = ops::apply_columns(&self.storage, rhs, op)?;
        self.write_back(values);
        Ok(())
    }

    fn content_eq(&self, other: &dyn Column) -> bool {
        match T::downcast(other.access()) {
            Some(rows) => {
                let len = self.storage.row_count();
                rows.row_count() == len && self.storage.scan(0..len).eq(rows.scan(0..len))
            }
            None => false,
        }
    }

    fn store(&self, dir: &Path) -> Result<()> {
        persist::store(self, dir)
    }

    fn load(&mut self, dir: &Path) -> Result<()> {
        persist::load(self, dir)
    }
}
