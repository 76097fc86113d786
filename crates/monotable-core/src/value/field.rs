use crate::value::{Record, Value};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error as ThisError;
use ulid::Ulid;

///
/// RecordError
///
/// A typed struct could not be rebuilt from a decoded record.
///

#[derive(Debug, ThisError)]
pub enum RecordError {
    #[error("field '{name}': expected {expected}, found {found}")]
    Field {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
}

///
/// FieldValue
///
/// Conversion between a Rust field type and its typed [`Value`].
/// `from_value` receives `Value::Null` for unset fields.
///

pub trait FieldValue: Sized {
    fn to_value(&self) -> Value;

    fn from_value(value: &Value) -> Option<Self>;
}

impl FieldValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FieldValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Text(text) | Value::Enum(text) => Some(text.clone()),
            _ => None,
        }
    }
}

impl FieldValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl FieldValue for f64 {
    fn to_value(&self) -> Value {
        Value::Float64(*self)
    }

    #[expect(clippy::cast_precision_loss)]
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float64(v) => Some(*v),
            Value::Int(v) => Some(*v as Self),
            Value::Uint(v) => Some(*v as Self),
            _ => None,
        }
    }
}

impl FieldValue for i64 {
    fn to_value(&self) -> Value {
        Value::Int(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(v) => Some(*v),
            Value::Uint(v) => Self::try_from(*v).ok(),
            _ => None,
        }
    }
}

impl FieldValue for u64 {
    fn to_value(&self) -> Value {
        Value::Uint(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Uint(v) => Some(*v),
            Value::Int(v) => Self::try_from(*v).ok(),
            _ => None,
        }
    }
}

// narrow integers widen on the way in and range-check on the way out
macro_rules! impl_narrow_int {
    ($($ty:ty => $wide:ty),* $(,)?) => {
        $(
            impl FieldValue for $ty {
                fn to_value(&self) -> Value {
                    <$wide>::from(*self).to_value()
                }

                fn from_value(value: &Value) -> Option<Self> {
                    <$wide>::from_value(value).and_then(|v| Self::try_from(v).ok())
                }
            }
        )*
    };
}

impl_narrow_int!(i8 => i64, i16 => i64, i32 => i64, u8 => u64, u16 => u64, u32 => u64);

impl FieldValue for Decimal {
    fn to_value(&self) -> Value {
        Value::Decimal(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Decimal(v) => Some(*v),
            Value::Int(v) => Some(Self::from(*v)),
            Value::Uint(v) => Some(Self::from(*v)),
            _ => None,
        }
    }
}

impl FieldValue for DateTime<Utc> {
    fn to_value(&self) -> Value {
        Value::Timestamp(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Timestamp(v) => Some(*v),
            _ => None,
        }
    }
}

impl FieldValue for Ulid {
    fn to_value(&self) -> Value {
        Value::Ulid(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Ulid(v) => Some(*v),
            Value::Text(text) => Self::from_string(text).ok(),
            _ => None,
        }
    }
}

impl FieldValue for Record {
    fn to_value(&self) -> Value {
        Value::Record(self.clone())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Record(record) => Some(record.clone()),
            _ => None,
        }
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, FieldValue::to_value)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// Lists read back as empty when unset.
impl<T: FieldValue> FieldValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(FieldValue::to_value).collect())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::List(items) | Value::Set(items) => items.iter().map(T::from_value).collect(),
            Value::Null => Some(Vec::new()),
            _ => None,
        }
    }
}

impl<T: FieldValue + Ord> FieldValue for BTreeSet<T> {
    fn to_value(&self) -> Value {
        Value::set(self.iter().map(FieldValue::to_value))
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Set(items) | Value::List(items) => items.iter().map(T::from_value).collect(),
            Value::Null => Some(Self::new()),
            _ => None,
        }
    }
}

impl<T: FieldValue> FieldValue for BTreeMap<String, T> {
    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(key, value)| (key.clone(), value.to_value()))
                .collect(),
        )
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Map(entries) => entries
                .iter()
                .map(|(key, value)| T::from_value(value).map(|v| (key.clone(), v)))
                .collect(),
            Value::Record(record) => record
                .iter()
                .map(|(key, value)| T::from_value(value).map(|v| (key.clone(), v)))
                .collect(),
            Value::Null => Some(Self::new()),
            _ => None,
        }
    }
}

///
/// Blob
///
/// Byte payload newtype; `Vec<u8>` already means a list of small integers.
///

#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Blob(pub Vec<u8>);

impl FieldValue for Blob {
    fn to_value(&self) -> Value {
        Value::Blob(self.0.clone())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Blob(bytes) => Some(Self(bytes.clone())),
            _ => None,
        }
    }
}
