//! Scalar strategy plus the element codecs shared by lists, sets and
//! encrypted values.

use crate::{
    error::FieldError,
    value::{Value, timestamp_text},
    wire::WireValue,
};
use chrono::{DateTime, Utc};
use monotable_primitives::{ScalarKind, WireFamily};
use monotable_schema::node::Property;
use rust_decimal::Decimal;
use std::str::FromStr;
use ulid::Ulid;

/// Encode one scalar. Integers widen into decimal and float targets; no
/// other implicit conversion is made.
pub(crate) fn encode(
    kind: ScalarKind,
    value: &Value,
    property: &Property,
) -> Result<WireValue, FieldError> {
    let wire = match (kind, value) {
        (ScalarKind::Blob, Value::Blob(bytes)) => WireValue::Binary(bytes.clone()),
        (ScalarKind::Bool, Value::Bool(v)) => WireValue::Boolean(*v),
        (ScalarKind::Decimal, Value::Decimal(v)) => WireValue::number(v),
        (ScalarKind::Enum, Value::Enum(name) | Value::Text(name)) => {
            if !property.accepts_variant(name) {
                return Err(FieldError::conversion(
                    value,
                    kind.label(),
                    format!("'{name}' is not a declared variant"),
                ));
            }
            WireValue::String(name.clone())
        }
        (ScalarKind::Float64, Value::Float64(v)) if v.is_finite() => WireValue::number(v),
        (ScalarKind::Float64, Value::Float64(_)) => {
            return Err(FieldError::conversion(value, kind.label(), "non-finite float"));
        }
        (ScalarKind::Int, Value::Int(v)) => WireValue::number(v),
        (ScalarKind::Int, Value::Uint(v)) => match i64::try_from(*v) {
            Ok(v) => WireValue::number(v),
            Err(_) => {
                return Err(FieldError::conversion(value, kind.label(), "exceeds i64::MAX"));
            }
        },
        (ScalarKind::Uint, Value::Uint(v)) => WireValue::number(v),
        (ScalarKind::Uint, Value::Int(v)) => match u64::try_from(*v) {
            Ok(v) => WireValue::number(v),
            Err(_) => return Err(FieldError::conversion(value, kind.label(), "negative")),
        },
        (ScalarKind::Decimal | ScalarKind::Float64, Value::Int(v)) => WireValue::number(v),
        (ScalarKind::Decimal | ScalarKind::Float64, Value::Uint(v)) => WireValue::number(v),
        (ScalarKind::Text, Value::Text(text)) => WireValue::String(text.clone()),
        (ScalarKind::Timestamp, Value::Timestamp(ts)) => WireValue::String(timestamp_text(ts)),
        (ScalarKind::Ulid, Value::Ulid(id)) => WireValue::String(id.to_string()),
        _ => return Err(mismatch(value, kind)),
    };

    Ok(wire)
}

/// Decode one scalar by inverting [`encode`]; malformed input is a
/// conversion error carrying the raw wire value.
pub(crate) fn decode(
    kind: ScalarKind,
    wire: &WireValue,
    property: &Property,
) -> Result<Value, FieldError> {
    let fail = |reason: String| FieldError::conversion(wire, kind.label(), reason);

    let value = match (kind, wire) {
        (ScalarKind::Blob, WireValue::Binary(bytes)) => Value::Blob(bytes.clone()),
        (ScalarKind::Bool, WireValue::Boolean(v)) => Value::Bool(*v),
        (ScalarKind::Decimal, WireValue::Number(text)) => Decimal::from_str(text)
            .or_else(|_| Decimal::from_scientific(text))
            .map(Value::Decimal)
            .map_err(|err| fail(err.to_string()))?,
        (ScalarKind::Enum, WireValue::String(name)) => {
            if !property.accepts_variant(name) {
                return Err(fail(format!("'{name}' is not a declared variant")));
            }
            Value::Enum(name.clone())
        }
        (ScalarKind::Float64, WireValue::Number(text)) => text
            .parse::<f64>()
            .map(Value::Float64)
            .map_err(|err| fail(err.to_string()))?,
        (ScalarKind::Int, WireValue::Number(text)) => text
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|err| fail(err.to_string()))?,
        (ScalarKind::Text, WireValue::String(text)) => Value::Text(text.clone()),
        (ScalarKind::Timestamp, WireValue::String(text)) => DateTime::parse_from_rfc3339(text)
            .map(|ts| Value::Timestamp(ts.with_timezone(&Utc)))
            .map_err(|err| fail(err.to_string()))?,
        (ScalarKind::Uint, WireValue::Number(text)) => text
            .parse::<u64>()
            .map(Value::Uint)
            .map_err(|err| fail(err.to_string()))?,
        (ScalarKind::Ulid, WireValue::String(text)) => Ulid::from_string(text)
            .map(Value::Ulid)
            .map_err(|err| fail(err.to_string()))?,
        _ => {
            return Err(fail(format!(
                "expected {} wire value, found {}",
                family_tag(kind.wire_family()),
                wire.tag()
            )));
        }
    };

    Ok(value)
}

/// Plain bytes handed to the encryptor: raw bytes for blobs, the scalar's
/// wire text otherwise.
pub(crate) fn to_plain(
    kind: ScalarKind,
    value: &Value,
    property: &Property,
) -> Result<Vec<u8>, FieldError> {
    match encode(kind, value, property)? {
        WireValue::Binary(bytes) => Ok(bytes),
        WireValue::Boolean(v) => Ok(v.to_string().into_bytes()),
        WireValue::Number(text) | WireValue::String(text) => Ok(text.into_bytes()),
        other => Err(FieldError::conversion(other, kind.label(), "not a scalar")),
    }
}

/// Inverse of [`to_plain`].
pub(crate) fn from_plain(
    kind: ScalarKind,
    plain: Vec<u8>,
    property: &Property,
) -> Result<Value, FieldError> {
    let wire = match kind.wire_family() {
        WireFamily::Binary => WireValue::Binary(plain),
        family => {
            let text = String::from_utf8(plain).map_err(|err| {
                FieldError::conversion(err.as_bytes(), kind.label(), "invalid utf-8")
            })?;

            match family {
                WireFamily::Bool => match text.as_str() {
                    "true" => WireValue::Boolean(true),
                    "false" => WireValue::Boolean(false),
                    _ => return Err(FieldError::conversion(text, kind.label(), "not a boolean")),
                },
                WireFamily::Number => WireValue::Number(text),
                WireFamily::Binary | WireFamily::String => WireValue::String(text),
            }
        }
    };

    decode(kind, &wire, property)
}

const fn family_tag(family: WireFamily) -> &'static str {
    match family {
        WireFamily::Binary => "B",
        WireFamily::Bool => "BOOL",
        WireFamily::Number => "N",
        WireFamily::String => "S",
    }
}

fn mismatch(value: &Value, kind: ScalarKind) -> FieldError {
    FieldError::conversion(
        value,
        kind.label(),
        format!("expected {} value, found {}", kind.label(), value.label()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn property(kind: ScalarKind) -> Property {
        Property::scalar("field", kind)
    }

    fn round_trip(kind: ScalarKind, value: Value) {
        let property = property(kind);
        let wire = encode(kind, &value, &property).expect("encode");
        let back = decode(kind, &wire, &property).expect("decode");

        assert_eq!(back, value, "wire form: {wire:?}");
    }

    #[test]
    fn every_scalar_kind_round_trips() {
        let ts = DateTime::parse_from_rfc3339("2031-02-03T04:05:06.789Z")
            .expect("timestamp")
            .with_timezone(&Utc);

        round_trip(ScalarKind::Blob, Value::Blob(vec![0, 1, 255]));
        round_trip(ScalarKind::Bool, Value::Bool(false));
        round_trip(ScalarKind::Decimal, Value::Decimal(Decimal::new(-12_345, 3)));
        round_trip(ScalarKind::Enum, Value::Enum("Active".into()));
        round_trip(ScalarKind::Float64, Value::Float64(0.1));
        round_trip(ScalarKind::Int, Value::Int(i64::MIN));
        round_trip(ScalarKind::Text, Value::text("héllo"));
        round_trip(ScalarKind::Timestamp, Value::Timestamp(ts));
        round_trip(ScalarKind::Uint, Value::Uint(u64::MAX));
        round_trip(ScalarKind::Ulid, Value::Ulid(Ulid::from_parts(1_700_000_000_000, 7)));
    }

    #[test]
    fn numbers_are_decimal_text() {
        let wire = encode(
            ScalarKind::Decimal,
            &Value::Decimal(Decimal::new(150, 2)),
            &property(ScalarKind::Decimal),
        )
        .expect("encode");

        assert_eq!(wire, WireValue::number("1.50"));
    }

    #[test]
    fn malformed_number_is_a_conversion_error() {
        let err = decode(ScalarKind::Int, &WireValue::number("12.5"), &property(ScalarKind::Int))
            .expect_err("fractional text is not an int");

        let FieldError::Conversion { value, target, .. } = err else {
            panic!("unexpected error: {err:?}");
        };
        assert!(value.contains("12.5"), "{value}");
        assert_eq!(target, "Int");
    }

    #[test]
    fn wrong_wire_family_is_rejected() {
        let err = decode(ScalarKind::Text, &WireValue::number(1), &property(ScalarKind::Text))
            .expect_err("number is not text");

        assert!(format!("{err:?}").contains("expected S wire value"), "{err:?}");
    }

    #[test]
    fn undeclared_enum_variant_is_rejected() {
        let property = Property::scalar("status", ScalarKind::Enum).variants(["Active", "Closed"]);

        assert!(encode(ScalarKind::Enum, &Value::Enum("Gone".into()), &property).is_err());
        assert!(decode(ScalarKind::Enum, &WireValue::string("Gone"), &property).is_err());
    }

    #[test]
    fn non_finite_floats_are_rejected() {
        let property = property(ScalarKind::Float64);

        assert!(encode(ScalarKind::Float64, &Value::Float64(f64::INFINITY), &property).is_err());
    }

    #[test]
    fn integers_widen_into_decimal_targets() {
        let wire = encode(ScalarKind::Decimal, &Value::Int(7), &property(ScalarKind::Decimal))
            .expect("encode");

        assert_eq!(wire, WireValue::number(7));
        assert!(encode(ScalarKind::Uint, &Value::Int(-1), &property(ScalarKind::Uint)).is_err());
    }

    #[test]
    fn plain_text_round_trips_for_every_family() {
        for (kind, value) in [
            (ScalarKind::Bool, Value::Bool(true)),
            (ScalarKind::Int, Value::Int(-9)),
            (ScalarKind::Text, Value::text("secret")),
            (ScalarKind::Blob, Value::Blob(vec![9, 8, 7])),
        ] {
            let property = property(kind);
            let plain = to_plain(kind, &value, &property).expect("plain");
            let back = from_plain(kind, plain, &property).expect("from plain");

            assert_eq!(back, value);
        }
    }
}
