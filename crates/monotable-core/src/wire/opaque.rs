//! Schema-less conversion used by opaque map values and by related records
//! that carry no schema of their own.

use crate::{
    error::FieldError,
    value::Value,
    wire::{WireRecord, WireValue},
};
use rust_decimal::Decimal;
use std::{
    collections::{BTreeMap, BTreeSet},
    str::FromStr,
};

/// Wrap a value as its own wire value without a declared kind.
///
/// Only values that [`from_opaque`] rebuilds exactly are accepted. Typed
/// scalars that would come back as text or as another number kind are
/// conversion errors.
pub(crate) fn to_opaque(value: &Value) -> Result<WireValue, FieldError> {
    let wire = match value {
        Value::Blob(bytes) => WireValue::Binary(bytes.clone()),
        Value::Bool(v) => WireValue::Boolean(*v),
        Value::Decimal(_) | Value::Int(_) | Value::Uint(_) => exact_number(value)?,
        Value::List(items) => {
            WireValue::List(items.iter().map(to_opaque).collect::<Result<_, _>>()?)
        }
        Value::Map(entries) => WireValue::Map(opaque_entries(entries)?),
        Value::Null => WireValue::Null,
        Value::Set(items) => opaque_set(items)?,
        Value::Text(text) => WireValue::String(text.clone()),
        Value::Enum(_)
        | Value::Float64(_)
        | Value::Record(_)
        | Value::Timestamp(_)
        | Value::Ulid(_) => return Err(not_opaque(value)),
    };

    Ok(wire)
}

/// Best-effort typed view of a wire value with no declared kind.
///
/// Integral numbers become `Int` (or `Uint` past `i64::MAX`), other numbers
/// `Decimal`; text stays text.
pub(crate) fn from_opaque(wire: &WireValue) -> Value {
    match wire {
        WireValue::Binary(bytes) => Value::Blob(bytes.clone()),
        WireValue::BinarySet(items) => {
            Value::Set(items.iter().map(|b| Value::Blob(b.clone())).collect())
        }
        WireValue::Boolean(v) => Value::Bool(*v),
        WireValue::List(items) => Value::List(items.iter().map(from_opaque).collect()),
        WireValue::Map(entries) => Value::Map(
            entries
                .iter()
                .map(|(name, value)| (name.clone(), from_opaque(value)))
                .collect(),
        ),
        WireValue::Null => Value::Null,
        WireValue::Number(text) => opaque_number(text),
        WireValue::NumberSet(items) => Value::set(items.iter().map(|n| opaque_number(n))),
        WireValue::String(text) => Value::Text(text.clone()),
        WireValue::StringSet(items) => Value::Set(items.iter().cloned().map(Value::Text).collect()),
    }
}

/// Whole wire record as an opaque map value.
pub(crate) fn record_to_map(record: &WireRecord) -> Value {
    Value::Map(
        record
            .iter()
            .map(|(name, value)| (name.clone(), from_opaque(value)))
            .collect(),
    )
}

fn opaque_entries(entries: &BTreeMap<String, Value>) -> Result<WireRecord, FieldError> {
    let mut out = WireRecord::with_capacity(entries.len());
    for (name, value) in entries {
        out.insert(name.clone(), to_opaque(value)?);
    }

    Ok(out)
}

// sets must be homogeneous text, numbers or blobs to keep a set encoding
fn opaque_set(items: &[Value]) -> Result<WireValue, FieldError> {
    if items.iter().all(|v| matches!(v, Value::Text(_))) {
        let set = items.iter().filter_map(Value::key_text).map(Into::into).collect();
        return Ok(WireValue::StringSet(set));
    }

    if items
        .iter()
        .all(|v| matches!(v, Value::Int(_) | Value::Uint(_) | Value::Decimal(_)))
    {
        let mut set = BTreeSet::new();
        for item in items {
            if let WireValue::Number(text) = exact_number(item)? {
                set.insert(text);
            }
        }
        return Ok(WireValue::NumberSet(set));
    }

    let blobs = items
        .iter()
        .map(|v| match v {
            Value::Blob(bytes) => Some(bytes.clone()),
            _ => None,
        })
        .collect::<Option<BTreeSet<_>>>();

    blobs.map(WireValue::BinarySet).ok_or_else(|| {
        FieldError::conversion(
            items,
            "Opaque",
            "set members must all be text, numbers or blobs",
        )
    })
}

// numbers keep their text only when reading it back yields the same variant
fn exact_number(value: &Value) -> Result<WireValue, FieldError> {
    let text = value.key_text().map(String::from).unwrap_or_default();
    if opaque_number(&text) != *value {
        return Err(not_opaque(value));
    }

    Ok(WireValue::Number(text))
}

fn not_opaque(value: &Value) -> FieldError {
    FieldError::conversion(
        value,
        "Opaque",
        format!("{} does not survive an untyped round trip", value.label()),
    )
}

fn opaque_number(text: &str) -> Value {
    if let Ok(v) = text.parse::<i64>() {
        return Value::Int(v);
    }
    if let Ok(v) = text.parse::<u64>() {
        return Value::Uint(v);
    }

    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_or_else(|_| Value::Text(text.to_string()), Value::Decimal)
}
