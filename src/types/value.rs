use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use uuid::Uuid;

use crate::{Result, RowkitError};

/// Dynamically typed column or argument value.
///
/// This is the unit of exchange between the conversion tables, the mappers
/// and the driver boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(char),
    Text(String),
    Bytes(Vec<u8>),
    Uuid(Uuid),
    /// Calendar date without a time component.
    Date(NaiveDate),
    /// Wall-clock time without a date component.
    Time(NaiveTime),
    /// Date and time without an offset.
    DateTime(NaiveDateTime),
    /// An instant on the UTC timeline.
    Timestamp(DateTime<Utc>),
}

/// The closed set of Rust-side target kinds the auto-converter and the
/// mappers know how to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Bool,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
    Text,
    Bytes,
    Uuid,
    Date,
    Time,
    DateTime,
    Timestamp,
}

impl Value {
    /// Kind of this value, or `None` for SQL NULL.
    pub fn kind(&self) -> Option<TargetKind> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(TargetKind::Bool),
            Value::Byte(_) => Some(TargetKind::Byte),
            Value::Short(_) => Some(TargetKind::Short),
            Value::Int(_) => Some(TargetKind::Int),
            Value::Long(_) => Some(TargetKind::Long),
            Value::Float(_) => Some(TargetKind::Float),
            Value::Double(_) => Some(TargetKind::Double),
            Value::Char(_) => Some(TargetKind::Char),
            Value::Text(_) => Some(TargetKind::Text),
            Value::Bytes(_) => Some(TargetKind::Bytes),
            Value::Uuid(_) => Some(TargetKind::Uuid),
            Value::Date(_) => Some(TargetKind::Date),
            Value::Time(_) => Some(TargetKind::Time),
            Value::DateTime(_) => Some(TargetKind::DateTime),
            Value::Timestamp(_) => Some(TargetKind::Timestamp),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, ""),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Byte(v) => write!(f, "{v}"),
            Value::Short(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Long(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Char(v) => write!(f, "{v}"),
            Value::Text(v) => write!(f, "{v}"),
            Value::Bytes(v) => {
                for b in v {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
            Value::Uuid(v) => write!(f, "{v}"),
            Value::Date(v) => write!(f, "{v}"),
            Value::Time(v) => write!(f, "{v}"),
            Value::DateTime(v) => write!(f, "{v}"),
            Value::Timestamp(v) => write!(f, "{v}"),
        }
    }
}

// From impls so argument maps can be built from plain Rust values.
macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v)
            }
        })*
    };
}

value_from!(
    bool => Bool,
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    char => Char,
    String => Text,
    Vec<u8> => Bytes,
    Uuid => Uuid,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => DateTime,
    DateTime<Utc> => Timestamp,
);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

/// Extraction of a concrete Rust value out of a [`Value`].
///
/// Implemented for every supported field type; `Option<T>` treats
/// [`Value::Null`] as `None`. The mapper converts mismatched kinds before
/// extraction, so `from_value` only has to accept its own variant.
pub trait FromValue: Sized {
    const KIND: TargetKind;
    const NULLABLE: bool = false;

    fn from_value(value: Value) -> Result<Self>;
}

macro_rules! from_value {
    ($($ty:ty => $kind:ident ($variant:ident)),* $(,)?) => {
        $(impl FromValue for $ty {
            const KIND: TargetKind = TargetKind::$kind;

            fn from_value(value: Value) -> Result<Self> {
                match value {
                    Value::$variant(v) => Ok(v),
                    Value::Null => Err(RowkitError::Mapping(
                        concat!("a non-nullable ", stringify!($ty), " component cannot be null")
                            .to_string(),
                    )),
                    other => Err(RowkitError::Mapping(format!(
                        concat!("expected a ", stringify!($kind), " value, got {:?}"),
                        other
                    ))),
                }
            }
        })*
    };
}

from_value!(
    bool => Bool (Bool),
    i8 => Byte (Byte),
    i16 => Short (Short),
    i32 => Int (Int),
    i64 => Long (Long),
    f32 => Float (Float),
    f64 => Double (Double),
    char => Char (Char),
    String => Text (Text),
    Vec<u8> => Bytes (Bytes),
    Uuid => Uuid (Uuid),
    NaiveDate => Date (Date),
    NaiveTime => Time (Time),
    NaiveDateTime => DateTime (DateTime),
    DateTime<Utc> => Timestamp (Timestamp),
);

impl<T: FromValue> FromValue for Option<T> {
    const KIND: TargetKind = T::KIND;
    const NULLABLE: bool = true;

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}
