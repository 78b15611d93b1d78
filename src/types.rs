//! Core types for the column store

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tuple identifier: zero-based, dense row number within a column.
///
/// Removing a row renumbers every row after it.
pub type Tid = usize;

/// Ordered sequence of TIDs, the result of selections and sorts
pub type PositionList = Vec<Tid>;

/// Attribute types supported by the column store
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeType {
    Int = 1,
    Float = 2,
    Varchar = 3,
    Boolean = 4,
}

impl AttributeType {
    /// Is arithmetic defined over this type?
    pub fn is_numeric(&self) -> bool {
        matches!(self, AttributeType::Int | AttributeType::Float)
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttributeType::Int => "INT",
            AttributeType::Float => "FLOAT",
            AttributeType::Varchar => "VARCHAR",
            AttributeType::Boolean => "BOOLEAN",
        };
        f.write_str(name)
    }
}

/// Physical representation family of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CompressionCodec {
    /// Materialized, one slot per row
    #[default]
    None,
    /// Deduplicated dictionary plus a per-row index
    Dictionary,
    /// (run length, value) pairs
    RunLength,
}

impl CompressionCodec {
    pub fn is_compressed(&self) -> bool {
        !matches!(self, CompressionCodec::None)
    }
}

impl fmt::Display for CompressionCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompressionCodec::None => "plain",
            CompressionCodec::Dictionary => "dictionary",
            CompressionCodec::RunLength => "run-length",
        };
        f.write_str(name)
    }
}

/// Comparison used by selections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueComparator {
    Less,
    Greater,
    Equal,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Type-erased cell value.
///
/// Used wherever a single cell crosses the boundary between generic callers
/// and a typed column. `Null` signals absence and is never a stored payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Null,
    Int(i32),
    Float(f32),
    Varchar(String),
    Bool(bool),
}

impl Value {
    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Attribute type of the active variant, `None` for `Null`
    pub fn attribute_type(&self) -> Option<AttributeType> {
        match self {
            Value::Null => None,
            Value::Int(_) => Some(AttributeType::Int),
            Value::Float(_) => Some(AttributeType::Float),
            Value::Varchar(_) => Some(AttributeType::Varchar),
            Value::Bool(_) => Some(AttributeType::Boolean),
        }
    }

    /// Name of the active variant, used in error messages
    pub fn type_name(&self) -> String {
        self.attribute_type()
            .map(|t| t.to_string())
            .unwrap_or_else(|| "NULL".to_string())
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Varchar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Varchar(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Varchar(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Varchar(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Two co-indexed position lists, the result of binary operators (joins).
///
/// Entry `i` of `left` and entry `i` of `right` form one matched row pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionListPair {
    pub left: PositionList,
    pub right: PositionList,
}

impl PositionListPair {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            left: Vec::with_capacity(capacity),
            right: Vec::with_capacity(capacity),
        }
    }

    /// Append one matched pair
    pub fn push(&mut self, left: Tid, right: Tid) {
        self.left.push(left);
        self.right.push(right);
    }

    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Iterate matched pairs in emission order
    pub fn iter(&self) -> impl Iterator<Item = (Tid, Tid)> + '_ {
        self.left.iter().copied().zip(self.right.iter().copied())
    }

    /// Matched pairs in canonical (sorted) order, for order-insensitive comparison
    pub fn sorted_pairs(&self) -> Vec<(Tid, Tid)> {
        let mut pairs: Vec<_> = self.iter().collect();
        pairs.sort_unstable();
        pairs
    }
}
