use crate::{
    codec::{EntityCodec, PropertyPlan, Strategy, collection, plan::MapStrategy, scalar, ttl},
    error::{CodecError, FieldError},
    key,
    obs::{CodecEvent, CodecOp},
    value::{Record, Value},
    wire::{WireRecord, WireValue},
};
use monotable_primitives::ScalarKind;
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;

impl EntityCodec {
    pub(crate) async fn decode(
        &self,
        wire: &WireRecord,
        cancel: &CancellationToken,
    ) -> Result<Record, CodecError> {
        let entity = self.schema.name.as_str();
        self.config.emit(CodecEvent::DecodeStart {
            entity,
            attributes: wire.len(),
        });

        match self.decode_record(wire, cancel).await {
            Ok(record) => {
                self.config.emit(CodecEvent::DecodeFinish {
                    entity,
                    attributes: record.len(),
                });
                Ok(record)
            }
            Err(err) => Err(self.fail(CodecOp::Decode, err)),
        }
    }

    async fn decode_record(
        &self,
        wire: &WireRecord,
        cancel: &CancellationToken,
    ) -> Result<Record, CodecError> {
        let mut record = Record::new();

        // Phase 1: direct properties; absent attributes stay unset
        for plan in &self.plan {
            let property = &plan.property;
            if !property.is_wire_mapped() {
                continue;
            }
            let Some(raw) = wire.get(&property.wire_name) else {
                continue;
            };

            let value = self.decode_attribute(plan, raw, cancel).await?;
            if plan.strategy.is_collection() && is_empty_collection(&value) {
                continue;
            }
            record.insert(property.name.clone(), value);
        }

        // Phase 2: key components split out of decoded sources
        self.resolve_extracted(&mut record);

        Ok(record)
    }

    /// Decode one raw attribute, attributing failures to the property.
    pub(crate) async fn decode_attribute(
        &self,
        plan: &PropertyPlan,
        raw: &WireValue,
        cancel: &CancellationToken,
    ) -> Result<Value, CodecError> {
        let property = &plan.property;

        if raw.is_null() {
            if property.nullable {
                return Ok(Value::Null);
            }
            return Err(FieldError::conversion(
                raw,
                property.kind.label(),
                "store returned null for a non-nullable property",
            )
            .at(&self.schema.name, &property.name));
        }

        self.decode_property(plan, raw, cancel)
            .await
            .map_err(|err| err.at(&self.schema.name, &property.name))
    }

    pub(crate) fn resolve_extracted(&self, record: &mut Record) {
        for plan in &self.plan {
            let Strategy::ExtractedKey(rule) = &plan.strategy else {
                continue;
            };

            if let Some(value) = key::extract(rule, record.get(&rule.source)) {
                record.insert(plan.property.name.clone(), value);
            }
        }
    }

    async fn decode_property(
        &self,
        plan: &PropertyPlan,
        raw: &WireValue,
        cancel: &CancellationToken,
    ) -> Result<Value, FieldError> {
        let property = &plan.property;

        let value = match &plan.strategy {
            Strategy::ComputedKey(_) => scalar::decode(ScalarKind::Text, raw, property)?,
            Strategy::Document(codec) => {
                let entries = collection::wire_entries(raw, "Document")?;
                Value::Record(codec.decode_boxed(entries, cancel).await?)
            }
            Strategy::EmbeddedJson => self.decode_json(raw)?,
            Strategy::Encrypted(kind) => self.decrypt(*kind, property, raw, cancel).await?,
            Strategy::ExternalBlob(payload) => {
                self.retrieve_blob(*payload, property, raw, cancel).await?
            }
            Strategy::List(kind) => collection::decode_list(*kind, raw, property)?,
            Strategy::Map(MapStrategy::Opaque) => collection::decode_opaque_map(raw)?,
            Strategy::Map(MapStrategy::Record(codec)) => {
                let entries = collection::wire_entries(raw, "Map<Record>")?;
                let mut out = BTreeMap::new();
                for (key, item) in entries {
                    let inner = collection::wire_entries(item, "Record")?;
                    out.insert(
                        key.clone(),
                        Value::Record(codec.decode_boxed(inner, cancel).await?),
                    );
                }
                Value::Map(out)
            }
            Strategy::Map(MapStrategy::Text) => collection::decode_text_map(raw)?,
            Strategy::Scalar(kind) => scalar::decode(*kind, raw, property)?,
            Strategy::Set(kind) => collection::decode_set(*kind, raw, property)?,
            Strategy::Ttl => ttl::decode(raw)?,
            Strategy::ExtractedKey(_) | Strategy::Related(_) => {
                return Err(FieldError::Configuration(format!(
                    "property '{}' is not wire-mapped",
                    property.name
                )));
            }
        };

        Ok(value)
    }

    /// Decode one element of a collection property held in a record that
    /// contributes a single item rather than the whole collection.
    pub(crate) fn decode_element(
        &self,
        plan: &PropertyPlan,
        raw: &WireValue,
    ) -> Result<Value, CodecError> {
        let property = &plan.property;
        let kind = match plan.strategy {
            Strategy::List(kind) | Strategy::Set(kind) => kind,
            _ => {
                return Err(CodecError::configuration(
                    &self.schema.name,
                    format!("property '{}' is not a collection", property.name),
                ));
            }
        };

        scalar::decode(kind, raw, property).map_err(|err| err.at(&self.schema.name, &property.name))
    }

    /// Decode every member of a list- or set-encoded attribute.
    pub(crate) fn decode_members(
        &self,
        plan: &PropertyPlan,
        raw: &WireValue,
    ) -> Result<Vec<Value>, CodecError> {
        let property = &plan.property;
        let decoded = match plan.strategy {
            Strategy::List(kind) => collection::decode_list(kind, raw, property),
            Strategy::Set(kind) => collection::decode_set(kind, raw, property),
            _ => Err(FieldError::Configuration(format!(
                "property '{}' is not a collection",
                property.name
            ))),
        };

        match decoded.map_err(|err| err.at(&self.schema.name, &property.name))? {
            Value::List(items) | Value::Set(items) => Ok(items),
            other => Ok(vec![other]),
        }
    }
}

// an empty stored list or set reads back as an unset property
const fn is_empty_collection(value: &Value) -> bool {
    match value {
        Value::List(items) | Value::Set(items) => items.is_empty(),
        _ => false,
    }
}
