use crate::{
    collab::{SerializeError, StructuredSerializer},
    value::Value,
};

///
/// JsonSerializer
///
/// Default structured serializer. Values keep their typed tags, so
/// decimals, timestamps and identifiers survive the round trip.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct JsonSerializer;

impl StructuredSerializer for JsonSerializer {
    fn name(&self) -> &'static str {
        "json"
    }

    fn serialize(&self, value: &Value) -> Result<String, SerializeError> {
        if !is_finite(value) {
            return Err(SerializeError::new("non-finite float has no JSON form"));
        }

        serde_json::to_string(value).map_err(|err| SerializeError::new(err.to_string()))
    }

    fn deserialize(&self, text: &str) -> Result<Value, SerializeError> {
        serde_json::from_str(text).map_err(|err| SerializeError::new(err.to_string()))
    }
}

// JSON writes NaN and infinities as null, which cannot be read back
fn is_finite(value: &Value) -> bool {
    match value {
        Value::Float64(v) => v.is_finite(),
        Value::List(items) | Value::Set(items) => items.iter().all(is_finite),
        Value::Map(entries) => entries.values().all(is_finite),
        Value::Record(record) => record.into_iter().all(|(_, v)| is_finite(v)),
        _ => true,
    }
}
