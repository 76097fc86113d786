use crate::{config::TtlRange, error::FieldError, value::Value, wire::WireValue};
use chrono::DateTime;

/// Whole epoch seconds; the sub-second part is truncated.
pub(crate) fn encode(value: &Value, range: TtlRange) -> Result<WireValue, FieldError> {
    let Value::Timestamp(ts) = value else {
        return Err(FieldError::conversion(
            value,
            "Ttl",
            format!("expected Timestamp value, found {}", value.label()),
        ));
    };

    let seconds = ts.timestamp();
    if !range.contains(seconds) {
        return Err(FieldError::Range {
            seconds,
            min: range.min(),
            max: range.max(),
        });
    }

    Ok(WireValue::number(seconds))
}

pub(crate) fn decode(wire: &WireValue) -> Result<Value, FieldError> {
    let WireValue::Number(text) = wire else {
        return Err(FieldError::conversion(
            wire,
            "Ttl",
            format!("expected N wire value, found {}", wire.tag()),
        ));
    };

    let seconds = text
        .parse::<i64>()
        .map_err(|err| FieldError::conversion(wire, "Ttl", err.to_string()))?;

    DateTime::from_timestamp(seconds, 0)
        .map(Value::Timestamp)
        .ok_or_else(|| FieldError::conversion(wire, "Ttl", "outside the representable range"))
}
