mod field;
mod record;


pub use field::{Blob, FieldValue, RecordError};
pub use record::Record;

use chrono::{DateTime, SecondsFormat, Utc};
use monotable_primitives::ScalarKind;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{borrow::Cow, cmp::Ordering, collections::BTreeMap};
use ulid::Ulid;

///
/// Value
///
/// Typed in-memory value of one record property.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[remain::sorted]
pub enum Value {
    Blob(Vec<u8>),
    Bool(bool),
    Decimal(Decimal),
    Enum(String),
    Float64(f64),
    Int(i64),
    List(Vec<Self>),
    Map(BTreeMap<String, Self>),
    Null,
    Record(Record),
    /// Unique elements in canonical order; build with [`Value::set`].
    Set(Vec<Self>),
    Text(String),
    Timestamp(DateTime<Utc>),
    Uint(u64),
    Ulid(Ulid),
}

impl Value {
    /// Build a set value: duplicates dropped, elements in canonical order.
    ///
    /// Canonical order is the order of the elements' key text (raw bytes for
    /// blobs), which is also the order sets decode in.
    #[must_use]
    pub fn set(items: impl IntoIterator<Item = Self>) -> Self {
        let mut items: Vec<Self> = items.into_iter().collect();
        items.sort_by(canonical_order);
        items.dedup();

        Self::Set(items)
    }

    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Scalar kind of this value, if it is a scalar.
    #[must_use]
    pub const fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            Self::Blob(_) => Some(ScalarKind::Blob),
            Self::Bool(_) => Some(ScalarKind::Bool),
            Self::Decimal(_) => Some(ScalarKind::Decimal),
            Self::Enum(_) => Some(ScalarKind::Enum),
            Self::Float64(_) => Some(ScalarKind::Float64),
            Self::Int(_) => Some(ScalarKind::Int),
            Self::Text(_) => Some(ScalarKind::Text),
            Self::Timestamp(_) => Some(ScalarKind::Timestamp),
            Self::Uint(_) => Some(ScalarKind::Uint),
            Self::Ulid(_) => Some(ScalarKind::Ulid),
            Self::List(_) | Self::Map(_) | Self::Null | Self::Record(_) | Self::Set(_) => None,
        }
    }

    /// Short variant label for diagnostics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::List(_) => "List",
            Self::Map(_) => "Map",
            Self::Null => "Null",
            Self::Record(_) => "Record",
            Self::Set(_) => "Set",
            _ => match self.scalar_kind() {
                Some(kind) => kind.label(),
                None => "Value",
            },
        }
    }

    /// Text form used for key composition and string-typed wire values.
    ///
    /// `None` for values with no canonical text form (collections, blobs,
    /// booleans, floats, null).
    #[must_use]
    pub fn key_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Text(text) | Self::Enum(text) => Some(Cow::Borrowed(text)),
            Self::Int(v) => Some(Cow::Owned(v.to_string())),
            Self::Uint(v) => Some(Cow::Owned(v.to_string())),
            Self::Decimal(v) => Some(Cow::Owned(v.to_string())),
            Self::Timestamp(v) => Some(Cow::Owned(timestamp_text(v))),
            Self::Ulid(v) => Some(Cow::Owned(v.to_string())),
            _ => None,
        }
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Self::Record(record)
    }
}

/// RFC 3339 text with only as much sub-second precision as needed.
#[must_use]
pub fn timestamp_text(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn canonical_order(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Blob(a), Value::Blob(b)) => a.cmp(b),
        (Value::Float64(a), Value::Float64(b)) => a.to_string().cmp(&b.to_string()),
        _ => match (a.key_text(), b.key_text()) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.label().cmp(b.label()),
        },
    }
}
