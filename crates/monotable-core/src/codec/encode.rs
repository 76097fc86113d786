use crate::{
    codec::{
        EntityCodec, PropertyPlan, Strategy, collection, plan::MapStrategy, scalar, ttl,
    },
    error::{CodecError, FieldError},
    key,
    obs::{CodecEvent, CodecOp},
    value::{Record, Value},
    wire::{WireRecord, WireValue},
};
use monotable_primitives::ScalarKind;
use std::{borrow::Cow, collections::BTreeMap};
use tokio_util::sync::CancellationToken;

/// Computed key values for one encode, by property name.
pub(crate) type KeyScratch<'s> = BTreeMap<&'s str, Value>;

impl EntityCodec {
    pub(crate) async fn encode(
        &self,
        record: &Record,
        cancel: &CancellationToken,
    ) -> Result<WireRecord, CodecError> {
        let entity = self.schema.name.as_str();
        self.config.emit(CodecEvent::EncodeStart {
            entity,
            attributes: self.wire_mapped,
        });

        match self.encode_record(record, cancel).await {
            Ok(wire) => {
                self.config.emit(CodecEvent::EncodeFinish {
                    entity,
                    attributes: wire.len(),
                });
                Ok(wire)
            }
            Err(err) => Err(self.fail(CodecOp::Encode, err)),
        }
    }

    async fn encode_record(
        &self,
        record: &Record,
        cancel: &CancellationToken,
    ) -> Result<WireRecord, CodecError> {
        // Phase 1: composite keys, in declaration order
        let keys = self.compute_keys(record)?;

        // Phase 2: every wire-mapped property into an exactly sized map
        let mut out = WireRecord::with_capacity(self.wire_mapped);

        for plan in &self.plan {
            let property = &plan.property;
            if !property.is_wire_mapped() {
                continue;
            }

            let value = match plan.strategy {
                Strategy::ComputedKey(_) => keys.get(property.name.as_str()),
                _ => record.present(&property.name),
            };
            let Some(value) = value else {
                if property.nullable || plan.strategy.omits_unset() {
                    continue;
                }
                return Err(self.unset(plan));
            };

            let encoded = self
                .encode_property(plan, value, record, &keys, cancel)
                .await
                .map_err(|err| err.at(&self.schema.name, &property.name))?;

            if let Some(encoded) = encoded {
                out.insert(property.wire_name.clone(), encoded);
            }
        }

        Ok(out)
    }

    /// Evaluate every computed key; earlier keys may feed later ones.
    pub(crate) fn compute_keys<'s>(
        &'s self,
        record: &Record,
    ) -> Result<KeyScratch<'s>, CodecError> {
        let mut keys = KeyScratch::new();

        for plan in &self.plan {
            let Strategy::ComputedKey(formula) = &plan.strategy else {
                continue;
            };

            let text = key::compute(formula, |name| {
                keys.get(name).or_else(|| record.present(name))
            })
            .map_err(|err| {
                FieldError::Conversion {
                    value: format!("{:?}", formula.sources),
                    target: "ComputedKey".to_string(),
                    reason: err.to_string(),
                }
                .at(&self.schema.name, &plan.property.name)
            })?;

            keys.insert(plan.property.name.as_str(), Value::Text(text));
        }

        Ok(keys)
    }

    fn unset(&self, plan: &PropertyPlan) -> CodecError {
        FieldError::Conversion {
            value: "unset".to_string(),
            target: plan.property.kind.label().to_string(),
            reason: "property is not nullable".to_string(),
        }
        .at(&self.schema.name, &plan.property.name)
    }

    /// Dispatch one present value. `None` means the attribute is omitted.
    async fn encode_property(
        &self,
        plan: &PropertyPlan,
        value: &Value,
        record: &Record,
        keys: &KeyScratch<'_>,
        cancel: &CancellationToken,
    ) -> Result<Option<WireValue>, FieldError> {
        let property = &plan.property;

        let wire = match &plan.strategy {
            Strategy::ComputedKey(_) => scalar::encode(ScalarKind::Text, value, property)?,
            Strategy::Document(codec) => {
                let nested = nested_record(value)?;
                WireValue::Map(codec.encode_boxed(&nested, cancel).await?)
            }
            Strategy::EmbeddedJson => self.encode_json(value)?,
            Strategy::Encrypted(kind) => self.encrypt(*kind, property, value, cancel).await?,
            Strategy::ExternalBlob(payload) => {
                self.store_blob(*payload, property, value, record, keys, cancel)
                    .await?
            }
            Strategy::List(kind) => return collection::encode_list(*kind, value, property),
            Strategy::Map(MapStrategy::Opaque) => collection::encode_opaque_map(value)?,
            Strategy::Map(MapStrategy::Record(codec)) => {
                let entries = collection::entries(value)?;
                let mut out = WireRecord::with_capacity(entries.len());
                for (key, item) in entries {
                    let nested = nested_record(item)?;
                    out.insert(
                        key.clone(),
                        WireValue::Map(codec.encode_boxed(&nested, cancel).await?),
                    );
                }
                WireValue::Map(out)
            }
            Strategy::Map(MapStrategy::Text) => collection::encode_text_map(value)?,
            Strategy::Scalar(kind) => scalar::encode(*kind, value, property)?,
            Strategy::Set(kind) => return collection::encode_set(*kind, value, property),
            Strategy::Ttl => ttl::encode(value, self.config.ttl_range())?,
            Strategy::ExtractedKey(_) | Strategy::Related(_) => return Ok(None),
        };

        Ok(Some(wire))
    }
}

/// Sub-record carried by a document or record-map value.
fn nested_record(value: &Value) -> Result<Cow<'_, Record>, FieldError> {
    match value {
        Value::Record(record) => Ok(Cow::Borrowed(record)),
        Value::Map(entries) => Ok(Cow::Owned(Record::from(entries.clone()))),
        other => Err(FieldError::conversion(
            other,
            "Record",
            format!("expected Record value, found {}", other.label()),
        )),
    }
}
