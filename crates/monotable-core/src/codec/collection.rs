//! Lists, sets and schema-less maps.

use crate::{
    codec::scalar,
    error::FieldError,
    value::Value,
    wire::{WireRecord, WireValue, from_opaque, to_opaque},
};
use monotable_primitives::{ScalarKind, SetFamily};
use monotable_schema::node::Property;
use std::collections::{BTreeMap, BTreeSet};

/// Empty lists encode to `None`: absence signals emptiness.
pub(crate) fn encode_list(
    kind: ScalarKind,
    value: &Value,
    property: &Property,
) -> Result<Option<WireValue>, FieldError> {
    let items = elements(value, "List")?;
    if items.is_empty() {
        return Ok(None);
    }

    let encoded = items
        .iter()
        .map(|item| encode_element(kind, item, property))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(WireValue::List(encoded)))
}

/// Decode a list attribute; a set-encoded attribute is accepted as well.
pub(crate) fn decode_list(
    kind: ScalarKind,
    wire: &WireValue,
    property: &Property,
) -> Result<Value, FieldError> {
    let items = match wire {
        WireValue::List(items) => items
            .iter()
            .map(|item| decode_element(kind, item, property))
            .collect::<Result<Vec<_>, _>>()?,
        WireValue::BinarySet(_) | WireValue::NumberSet(_) | WireValue::StringSet(_) => {
            set_members(kind, wire, property)?
        }
        other => {
            return Err(FieldError::conversion(
                other,
                format!("List<{}>", kind.label()),
                format!("expected L wire value, found {}", other.tag()),
            ));
        }
    };

    Ok(Value::List(items))
}

/// Sets pick their wire family from the element kind; kinds without a set
/// family are unsupported.
pub(crate) fn encode_set(
    kind: ScalarKind,
    value: &Value,
    property: &Property,
) -> Result<Option<WireValue>, FieldError> {
    let family = set_family(kind)?;
    let items = elements(value, "Set")?;
    if items.is_empty() {
        return Ok(None);
    }

    let wire = match family {
        SetFamily::BinarySet => {
            let mut set = BTreeSet::new();
            for item in items {
                if let WireValue::Binary(bytes) = scalar::encode(kind, item, property)? {
                    set.insert(bytes);
                }
            }
            WireValue::BinarySet(set)
        }
        SetFamily::NumberSet | SetFamily::StringSet => {
            let mut set = BTreeSet::new();
            for item in items {
                if let Some(text) = scalar::encode(kind, item, property)?.as_text() {
                    set.insert(text.to_string());
                }
            }
            if family == SetFamily::NumberSet {
                WireValue::NumberSet(set)
            } else {
                WireValue::StringSet(set)
            }
        }
    };

    Ok(Some(wire))
}

pub(crate) fn decode_set(
    kind: ScalarKind,
    wire: &WireValue,
    property: &Property,
) -> Result<Value, FieldError> {
    set_family(kind)?;

    let items = match wire {
        WireValue::List(items) => items
            .iter()
            .map(|item| scalar::decode(kind, item, property))
            .collect::<Result<Vec<_>, _>>()?,
        _ => set_members(kind, wire, property)?,
    };

    Ok(Value::set(items))
}

/// Decode the members of a set attribute of the family `kind` belongs to.
pub(crate) fn set_members(
    kind: ScalarKind,
    wire: &WireValue,
    property: &Property,
) -> Result<Vec<Value>, FieldError> {
    let family = set_family(kind)?;

    match (family, wire) {
        (SetFamily::BinarySet, WireValue::BinarySet(items)) => items
            .iter()
            .map(|bytes| scalar::decode(kind, &WireValue::Binary(bytes.clone()), property))
            .collect(),
        (SetFamily::NumberSet, WireValue::NumberSet(items)) => items
            .iter()
            .map(|text| scalar::decode(kind, &WireValue::Number(text.clone()), property))
            .collect(),
        (SetFamily::StringSet, WireValue::StringSet(items)) => items
            .iter()
            .map(|text| scalar::decode(kind, &WireValue::String(text.clone()), property))
            .collect(),
        (family, other) => Err(FieldError::conversion(
            other,
            format!("Set<{}>", kind.label()),
            format!("expected {family:?} wire value, found {}", other.tag()),
        )),
    }
}

pub(crate) fn encode_text_map(value: &Value) -> Result<WireValue, FieldError> {
    let entries = entries(value)?;
    let mut out = WireRecord::with_capacity(entries.len());

    for (key, item) in entries {
        match item {
            Value::Text(text) => {
                out.insert(key.clone(), WireValue::String(text.clone()));
            }
            other => {
                return Err(FieldError::conversion(
                    other,
                    "Map<Text>",
                    format!("entry '{key}' is {}, expected Text", other.label()),
                ));
            }
        }
    }

    Ok(WireValue::Map(out))
}

pub(crate) fn decode_text_map(wire: &WireValue) -> Result<Value, FieldError> {
    let entries = wire_entries(wire, "Map<Text>")?;
    let mut out = BTreeMap::new();

    for (key, item) in entries {
        match item {
            WireValue::String(text) => {
                out.insert(key.clone(), Value::Text(text.clone()));
            }
            other => {
                return Err(FieldError::conversion(
                    other,
                    "Map<Text>",
                    format!("entry '{key}' is {}, expected S", other.tag()),
                ));
            }
        }
    }

    Ok(Value::Map(out))
}

pub(crate) fn encode_opaque_map(value: &Value) -> Result<WireValue, FieldError> {
    let entries = entries(value)?;
    let mut out = WireRecord::with_capacity(entries.len());

    for (key, item) in entries {
        out.insert(key.clone(), to_opaque(item)?);
    }

    Ok(WireValue::Map(out))
}

pub(crate) fn decode_opaque_map(wire: &WireValue) -> Result<Value, FieldError> {
    let entries = wire_entries(wire, "Map")?;

    Ok(Value::Map(
        entries
            .iter()
            .map(|(key, item)| (key.clone(), from_opaque(item)))
            .collect(),
    ))
}

/// Map entries of a `Map` or `Record` value.
pub(crate) fn entries(value: &Value) -> Result<Vec<(&String, &Value)>, FieldError> {
    match value {
        Value::Map(entries) => Ok(entries.iter().collect()),
        Value::Record(record) => Ok(record.iter().collect()),
        other => Err(FieldError::conversion(
            other,
            "Map",
            format!("expected Map value, found {}", other.label()),
        )),
    }
}

pub(crate) fn wire_entries<'a>(
    wire: &'a WireValue,
    target: &str,
) -> Result<&'a WireRecord, FieldError> {
    match wire {
        WireValue::Map(entries) => Ok(entries),
        other => Err(FieldError::conversion(
            other,
            target,
            format!("expected M wire value, found {}", other.tag()),
        )),
    }
}

fn elements<'a>(value: &'a Value, target: &str) -> Result<&'a [Value], FieldError> {
    match value {
        Value::List(items) | Value::Set(items) => Ok(items),
        other => Err(FieldError::conversion(
            other,
            target,
            format!("expected List or Set value, found {}", other.label()),
        )),
    }
}

fn set_family(kind: ScalarKind) -> Result<SetFamily, FieldError> {
    kind.set_family().ok_or(FieldError::Unsupported {
        context: "set",
        element: kind.label().to_string(),
    })
}

// list elements may be explicitly null
fn encode_element(
    kind: ScalarKind,
    item: &Value,
    property: &Property,
) -> Result<WireValue, FieldError> {
    match item {
        Value::Null => Ok(WireValue::Null),
        item => scalar::encode(kind, item, property),
    }
}

fn decode_element(
    kind: ScalarKind,
    item: &WireValue,
    property: &Property,
) -> Result<Value, FieldError> {
    match item {
        WireValue::Null => Ok(Value::Null),
        item => scalar::decode(kind, item, property),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn property() -> Property {
        Property::text("items")
    }

    #[test]
    fn lists_keep_order_and_nulls() {
        let value = Value::List(vec![Value::Int(3), Value::Null, Value::Int(1)]);

        let wire = encode_list(ScalarKind::Int, &value, &property())
            .expect("encode")
            .expect("non-empty list is written");
        let back = decode_list(ScalarKind::Int, &wire, &property()).expect("decode");

        assert_eq!(back, value);
    }

    #[test]
    fn empty_list_is_omitted() {
        let encoded = encode_list(ScalarKind::Text, &Value::List(Vec::new()), &property())
            .expect("encode");

        assert_eq!(encoded, None);
    }

    #[test]
    fn sets_pick_their_family() {
        let strings = Value::set([Value::text("b"), Value::text("a")]);
        let numbers = Value::set([Value::Uint(2), Value::Uint(10)]);
        let blobs = Value::set([Value::Blob(vec![1]), Value::Blob(vec![0])]);

        assert_eq!(
            encode_set(ScalarKind::Text, &strings, &property()).expect("text"),
            Some(WireValue::string_set(["a", "b"]))
        );
        assert_eq!(
            encode_set(ScalarKind::Uint, &numbers, &property()).expect("uint"),
            Some(WireValue::number_set([2, 10]))
        );
        assert!(matches!(
            encode_set(ScalarKind::Blob, &blobs, &property()),
            Ok(Some(WireValue::BinarySet(_)))
        ));
    }

    #[test]
    fn sets_round_trip() {
        for (kind, value) in [
            (
                ScalarKind::Text,
                Value::set([Value::text("x"), Value::text("y")]),
            ),
            (
                ScalarKind::Int,
                Value::set([Value::Int(-5), Value::Int(10), Value::Int(9)]),
            ),
            (
                ScalarKind::Blob,
                Value::set([Value::Blob(vec![2]), Value::Blob(vec![1, 1])]),
            ),
        ] {
            let wire = encode_set(kind, &value, &property())
                .expect("encode")
                .expect("non-empty");
            let back = decode_set(kind, &wire, &property()).expect("decode");

            assert_eq!(back, value);
        }
    }

    #[test]
    fn bool_sets_are_unsupported() {
        let value = Value::set([Value::Bool(true)]);

        let err = encode_set(ScalarKind::Bool, &value, &property()).expect_err("no bool sets");
        assert!(matches!(err, FieldError::Unsupported { context: "set", .. }));

        let err = decode_set(ScalarKind::Bool, &WireValue::string_set(["true"]), &property())
            .expect_err("no bool sets");
        assert!(matches!(err, FieldError::Unsupported { .. }));
    }

    #[test]
    fn text_maps_reject_other_values() {
        let good = Value::Map(BTreeMap::from([("k".to_string(), Value::text("v"))]));
        let bad = Value::Map(BTreeMap::from([("k".to_string(), Value::Int(1))]));

        let wire = encode_text_map(&good).expect("encode");
        assert_eq!(decode_text_map(&wire).expect("decode"), good);
        assert!(encode_text_map(&bad).is_err());
    }

    #[test]
    fn opaque_maps_wrap_each_value() {
        let value = Value::Map(BTreeMap::from([
            ("n".to_string(), Value::Int(4)),
            ("s".to_string(), Value::text("x")),
            ("b".to_string(), Value::Bool(true)),
        ]));

        let wire = encode_opaque_map(&value).expect("encode");
        let WireValue::Map(entries) = &wire else {
            panic!("expected a map, got {wire:?}");
        };
        assert_eq!(entries.get("n"), Some(&WireValue::number(4)));
        assert_eq!(decode_opaque_map(&wire).expect("decode"), value);
    }
}
