//! Columnar storage
//!
//! One logical column per attribute, in one of three representations:
//! - Plain: values stored verbatim
//! - Dictionary: unique values plus a per-row index table
//! - Run-length: `(length, value)` runs
//!
//! All representations implement the same [`Column`] contract, so callers
//! work through `Box<dyn Column>` and never see the physical layout.

pub mod dictionary;
pub mod element;
pub(crate) mod join;
pub(crate) mod ops;
pub mod persist;
pub mod plain;
pub mod rle;
pub mod typed;

use parking_lot::RwLock;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

pub use dictionary::{DictionaryColumn, DictionaryStorage};
pub use element::{ArithmeticOp, ColumnElement, RowAccess, TypedAccess};
pub use plain::{PlainColumn, PlainStorage};
pub use rle::{RleColumn, Run, RunLengthStorage, MAX_RUN_LENGTH};
pub use typed::{ColumnStorage, TypedColumn};

use crate::config::ColumnConfig;
use crate::error::Result;
use crate::types::{
    AttributeType, CompressionCodec, PositionList, PositionListPair, SortOrder, Tid, Value, ValueComparator,
};

/// A named, typed sequence of rows addressed by TID
pub trait Column: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn attribute_type(&self) -> AttributeType;

    fn codec(&self) -> CompressionCodec;

    /// True when every row has its own physical slot
    fn is_materialized(&self) -> bool {
        !self.codec().is_compressed()
    }

    fn is_compressed(&self) -> bool {
        self.codec().is_compressed()
    }

    fn config(&self) -> &ColumnConfig;

    /// Type-erased view of the rows, used by binary operators
    fn access(&self) -> TypedAccess<'_>;

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    /// Append a row
    fn insert(&mut self, value: &Value) -> Result<()>;

    fn update(&mut self, tid: Tid, value: &Value) -> Result<()>;

    /// Set every listed row to `value`; fails without writing if any TID is out of range
    fn update_positions(&mut self, tids: &[Tid], value: &Value) -> Result<()>;

    /// Remove a row; later TIDs shift down by one
    fn remove(&mut self, tid: Tid) -> Result<()>;

    /// Remove the listed rows. `tids` must be strictly ascending and in range.
    fn remove_positions(&mut self, tids: &[Tid]) -> Result<()>;

    fn clear_content(&mut self);

    // ------------------------------------------------------------------------
    // Access
    // ------------------------------------------------------------------------

    fn get(&self, tid: Tid) -> Result<Value>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Approximate memory held by the physical containers
    fn size_in_bytes(&self) -> usize;

    /// Deep copy with the same name, codec and contents
    fn copy(&self) -> Box<dyn Column>;

    /// Human-readable dump of the rows
    fn print(&self) -> String;

    // ------------------------------------------------------------------------
    // Relational operators
    // ------------------------------------------------------------------------

    /// Stable sort; returns TIDs in sorted order
    fn sort(&self, order: SortOrder) -> PositionList;

    /// Ascending TIDs of rows satisfying `row <comparator> value`
    fn selection(&self, value: &Value, comparator: ValueComparator) -> Result<PositionList>;

    /// Same result as [`Column::selection`], computed on `thread_count` workers
    fn parallel_selection(
        &self,
        value: &Value,
        comparator: ValueComparator,
        thread_count: usize,
    ) -> Result<PositionList>;

    /// Parallel selection with the configured worker count
    fn parallel_selection_default(&self, value: &Value, comparator: ValueComparator) -> Result<PositionList> {
        self.parallel_selection(value, comparator, self.config().effective_threads())
    }

    /// Equi-join; `self` is the build side
    fn hash_join(&self, other: &dyn Column) -> Result<PositionListPair>;

    fn sort_merge_join(&self, other: &dyn Column) -> Result<PositionListPair>;

    fn nested_loop_join(&self, other: &dyn Column) -> Result<PositionListPair>;

    // ------------------------------------------------------------------------
    // Arithmetic (numeric columns only; all-or-nothing)
    // ------------------------------------------------------------------------

    fn apply_scalar(&mut self, op: ArithmeticOp, value: &Value) -> Result<()>;

    /// Element-wise `self[i] <op> other[i]`; `other` must match in type and length
    fn apply_column(&mut self, op: ArithmeticOp, other: &dyn Column) -> Result<()>;

    fn add(&mut self, value: &Value) -> Result<()> {
        self.apply_scalar(ArithmeticOp::Add, value)
    }

    fn minus(&mut self, value: &Value) -> Result<()> {
        self.apply_scalar(ArithmeticOp::Minus, value)
    }

    fn multiply(&mut self, value: &Value) -> Result<()> {
        self.apply_scalar(ArithmeticOp::Multiply, value)
    }

    fn divide(&mut self, value: &Value) -> Result<()> {
        self.apply_scalar(ArithmeticOp::Divide, value)
    }

    fn add_column(&mut self, other: &dyn Column) -> Result<()> {
        self.apply_column(ArithmeticOp::Add, other)
    }

    fn minus_column(&mut self, other: &dyn Column) -> Result<()> {
        self.apply_column(ArithmeticOp::Minus, other)
    }

    fn multiply_column(&mut self, other: &dyn Column) -> Result<()> {
        self.apply_column(ArithmeticOp::Multiply, other)
    }

    fn divide_column(&mut self, other: &dyn Column) -> Result<()> {
        self.apply_column(ArithmeticOp::Divide, other)
    }

    // ------------------------------------------------------------------------
    // Comparison and persistence
    // ------------------------------------------------------------------------

    /// Row-wise equality, independent of representation
    fn content_eq(&self, other: &dyn Column) -> bool;

    /// Write a snapshot to `dir/<name>`
    fn store(&self, dir: &Path) -> Result<()>;

    /// Replace all rows with the snapshot in `dir/<name>`
    fn load(&mut self, dir: &Path) -> Result<()>;
}

impl PartialEq for dyn Column + '_ {
    fn eq(&self, other: &Self) -> bool {
        self.content_eq(other)
    }
}

impl fmt::Display for dyn Column + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.print())
    }
}

/// Column shared between threads; readers run concurrently, writers are exclusive
pub type SharedColumn = Arc<RwLock<Box<dyn Column>>>;

pub fn share(column: Box<dyn Column>) -> SharedColumn {
    Arc::new(RwLock::new(column))
}

/// Create an empty plain column
pub fn create_column(attribute_type: AttributeType, name: impl Into<String>) -> Box<dyn Column> {
    create_compressed_column(attribute_type, name, CompressionCodec::None)
}

/// Create an empty column of the given type and representation
pub fn create_compressed_column(
    attribute_type: AttributeType,
    name: impl Into<String>,
    codec: CompressionCodec,
) -> Box<dyn Column> {
    create_column_with_config(attribute_type, name, codec, ColumnConfig::default())
}

pub fn create_column_with_config(
    attribute_type: AttributeType,
    name: impl Into<String>,
    codec: CompressionCodec,
    config: ColumnConfig,
) -> Box<dyn Column> {
    let name = name.into();
    match attribute_type {
        AttributeType::Int => boxed::<i32>(name, codec, config),
        AttributeType::Float => boxed::<f32>(name, codec, config),
        AttributeType::Varchar => boxed::<String>(name, codec, config),
        AttributeType::Boolean => boxed::<bool>(name, codec, config),
    }
}

fn boxed<T: ColumnElement>(name: String, codec: CompressionCodec, config: ColumnConfig) -> Box<dyn Column> {
    match codec {
        CompressionCodec::None => Box::new(PlainColumn::<T>::with_config(name, config)),
        CompressionCodec::Dictionary => Box::new(DictionaryColumn::<T>::with_config(name, config)),
        CompressionCodec::RunLength => Box::new(RleColumn::<T>::with_config(name, config)),
    }
}
