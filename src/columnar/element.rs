//! Element types and the indexed-access primitive
//!
//! Every relational operator is written against [`RowAccess`], so it runs
//! unchanged over plain and compressed storage. [`TypedAccess`] is the
//! type-erased form handed across `dyn Column` boundaries; recovering a
//! concrete element type from it is an explicit, fallible check.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::ops::Range;

use crate::error::{ColumnError, Result};
use crate::types::{AttributeType, Tid, Value};

/// Arithmetic operator applied element-wise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Minus,
    Multiply,
    Divide,
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArithmeticOp::Add => "add",
            ArithmeticOp::Minus => "minus",
            ArithmeticOp::Multiply => "multiply",
            ArithmeticOp::Divide => "divide",
        };
        f.write_str(name)
    }
}

/// Indexed access to the logical rows of a column
pub trait RowAccess<T: ColumnElement>: Send + Sync {
    /// Number of logical rows
    fn row_count(&self) -> usize;

    /// Value at logical row `tid`, `None` when out of range
    fn value_at(&self, tid: Tid) -> Option<&T>;

    /// Values of the rows in `range`, in row order.
    ///
    /// The default walks `value_at`; storages with a cheaper sequential
    /// layout override it.
    fn scan(&self, range: Range<Tid>) -> Box<dyn Iterator<Item = &T> + '_> {
        let end = range.end.min(self.row_count());
        Box::new((range.start..end).filter_map(move |tid| self.value_at(tid)))
    }
}

/// Type-erased view over a column's rows
pub enum TypedAccess<'a> {
    Int(&'a dyn RowAccess<i32>),
    Float(&'a dyn RowAccess<f32>),
    Varchar(&'a dyn RowAccess<String>),
    Boolean(&'a dyn RowAccess<bool>),
}

impl TypedAccess<'_> {
    pub fn attribute_type(&self) -> AttributeType {
        match self {
            TypedAccess::Int(_) => AttributeType::Int,
            TypedAccess::Float(_) => AttributeType::Float,
            TypedAccess::Varchar(_) => AttributeType::Varchar,
            TypedAccess::Boolean(_) => AttributeType::Boolean,
        }
    }
}

/// A scalar type a column can store
pub trait ColumnElement:
    Clone + Default + PartialEq + PartialOrd + fmt::Debug + fmt::Display + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Attribute type of columns holding this element
    const ATTRIBUTE_TYPE: AttributeType;

    /// Hashable stand-in used by hash joins
    type JoinKey: Eq + Hash;

    /// Recover a typed value from a `Value`, failing on a mismatched tag
    fn from_value(value: &Value) -> Result<Self>;

    fn into_value(self) -> Value;

    /// Total order used by sort and sort-merge join
    fn compare(&self, other: &Self) -> Ordering;

    /// Key for hash joins; `None` for values that never compare equal (NaN)
    fn join_key(&self) -> Option<Self::JoinKey>;

    /// Approximate memory consumed by one element
    fn footprint(&self) -> usize {
        std::mem::size_of::<Self>()
    }

    /// Element-wise arithmetic; only numeric types support it
    fn apply(&self, op: ArithmeticOp, _rhs: &Self) -> Result<Self> {
        Err(ColumnError::UnsupportedOperation(format!(
            "{} is not defined on {} columns",
            op,
            Self::ATTRIBUTE_TYPE
        )))
    }

    fn wrap<'a>(access: &'a dyn RowAccess<Self>) -> TypedAccess<'a>;

    /// Explicit downcast of an erased view, `None` on element type mismatch
    fn downcast<'a>(access: TypedAccess<'a>) -> Option<&'a dyn RowAccess<Self>>;
}

fn mismatch<T: ColumnElement>(value: &Value) -> ColumnError {
    ColumnError::type_mismatch(T::ATTRIBUTE_TYPE, value.type_name())
}

impl ColumnElement for i32 {
    const ATTRIBUTE_TYPE: AttributeType = AttributeType::Int;
    type JoinKey = i32;

    fn from_value(value: &Value) -> Result<Self> {
        value.as_i32().ok_or_else(|| mismatch::<Self>(value))
    }

    fn into_value(self) -> Value {
        Value::Int(self)
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn join_key(&self) -> Option<i32> {
        Some(*self)
    }

    fn apply(&self, op: ArithmeticOp, rhs: &Self) -> Result<Self> {
        let result = match op {
            ArithmeticOp::Add => self.checked_add(*rhs),
            ArithmeticOp::Minus => self.checked_sub(*rhs),
            ArithmeticOp::Multiply => self.checked_mul(*rhs),
            ArithmeticOp::Divide => {
                if *rhs == 0 {
                    return Err(ColumnError::Arithmetic("division by zero".into()));
                }
                self.checked_div(*rhs)
            }
        };
        result.ok_or_else(|| ColumnError::Arithmetic(format!("integer overflow in {} {} {}", self, op, rhs)))
    }

    fn wrap<'a>(access: &'a dyn RowAccess<Self>) -> TypedAccess<'a> {
        TypedAccess::Int(access)
    }

    fn downcast<'a>(access: TypedAccess<'a>) -> Option<&'a dyn RowAccess<Self>> {
        match access {
            TypedAccess::Int(a) => Some(a),
            _ => None,
        }
    }
}

impl ColumnElement for f32 {
    const ATTRIBUTE_TYPE: AttributeType = AttributeType::Float;
    type JoinKey = u32;

    fn from_value(value: &Value) -> Result<Self> {
        value.as_f32().ok_or_else(|| mismatch::<Self>(value))
    }

    fn into_value(self) -> Value {
        Value::Float(self)
    }

    // NaN sorts after every number; -0.0 and 0.0 are equal.
    fn compare(&self, other: &Self) -> Ordering {
        self.partial_cmp(other)
            .unwrap_or_else(|| self.is_nan().cmp(&other.is_nan()))
    }

    fn join_key(&self) -> Option<u32> {
        if self.is_nan() {
            None
        } else if *self == 0.0 {
            Some(0)
        } else {
            Some(self.to_bits())
        }
    }

    fn apply(&self, op: ArithmeticOp, rhs: &Self) -> Result<Self> {
        Ok(match op {
            ArithmeticOp::Add => self + rhs,
            ArithmeticOp::Minus => self - rhs,
            ArithmeticOp::Multiply => self * rhs,
            ArithmeticOp::Divide => {
                if *rhs == 0.0 {
                    return Err(ColumnError::Arithmetic("division by zero".into()));
                }
                self / rhs
            }
        })
    }

    fn wrap<'a>(access: &'a dyn RowAccess<Self>) -> TypedAccess<'a> {
        TypedAccess::Float(access)
    }

    fn downcast<'a>(access: TypedAccess<'a>) -> Option<&'a dyn RowAccess<Self>> {
        match access {
            TypedAccess::Float(a) => Some(a),
            _ => None,
        }
    }
}

impl ColumnElement for String {
    const ATTRIBUTE_TYPE: AttributeType = AttributeType::Varchar;
    type JoinKey = String;

    fn from_value(value: &Value) -> Result<Self> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| mismatch::<Self>(value))
    }

    fn into_value(self) -> Value {
        Value::Varchar(self)
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn join_key(&self) -> Option<String> {
        Some(self.clone())
    }

    fn footprint(&self) -> usize {
        std::mem::size_of::<Self>() + self.len()
    }

    fn wrap<'a>(access: &'a dyn RowAccess<Self>) -> TypedAccess<'a> {
        TypedAccess::Varchar(access)
    }

    fn downcast<'a>(access: TypedAccess<'a>) -> Option<&'a dyn RowAccess<Self>> {
        match access {
            TypedAccess::Varchar(a) => Some(a),
            _ => None,
        }
    }
}

impl ColumnElement for bool {
    const ATTRIBUTE_TYPE: AttributeType = AttributeType::Boolean;
    type JoinKey = bool;

    fn from_value(value: &Value) -> Result<Self> {
        value.as_bool().ok_or_else(|| mismatch::<Self>(value))
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn join_key(&self) -> Option<bool> {
        Some(*self)
    }

    fn wrap<'a>(access: &'a dyn RowAccess<Self>) -> TypedAccess<'a> {
        TypedAccess::Boolean(access)
    }

    fn downcast<'a>(access: TypedAccess<'a>) -> Option<&'a dyn RowAccess<Self>> {
        match access {
            TypedAccess::Boolean(a) => Some(a),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_value_mismatch() {
        assert_eq!(i32::from_value(&Value::Int(4)).unwrap(), 4);
        let err = i32::from_value(&Value::from("4")).unwrap_err();
        assert!(matches!(err, ColumnError::TypeMismatch { expected: AttributeType::Int, .. }));
        assert!(String::from_value(&Value::Null).is_err());
    }

    #[test]
    fn test_float_order_and_keys() {
        assert_eq!(f32::NAN.compare(&1.0), Ordering::Greater);
        assert_eq!(1.0f32.compare(&f32::NAN), Ordering::Less);
        assert_eq!((-0.0f32).compare(&0.0), Ordering::Equal);
        assert_eq!((-0.0f32).join_key(), 0.0f32.join_key());
        assert_eq!(f32::NAN.join_key(), None);
    }

    #[test]
    fn test_integer_arithmetic_is_checked() {
        assert_eq!(7i32.apply(ArithmeticOp::Divide, &2).unwrap(), 3);
        assert!(matches!(1i32.apply(ArithmeticOp::Divide, &0), Err(ColumnError::Arithmetic(_))));
        assert!(matches!(i32::MAX.apply(ArithmeticOp::Add, &1), Err(ColumnError::Arithmetic(_))));
    }

    #[test]
    fn test_text_arithmetic_unsupported() {
        let err = "a".to_string().apply(ArithmeticOp::Add, &"b".to_string()).unwrap_err();
        assert!(matches!(err, ColumnError::UnsupportedOperation(_)));
        assert!(true.apply(ArithmeticOp::Multiply, &false).is_err());
    }
}
