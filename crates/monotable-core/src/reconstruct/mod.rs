//! Multi-record reconstruction.
//!
//! One logical record may be spread over several physical records sharing
//! a partition key. Scalars come from the first record holding them,
//! collections accumulate across the whole batch, and relationships pick
//! up records whose sort key matches their pattern.

#[cfg(test)]
mod tests;

use crate::{
    codec::{EntityCodec, PropertyPlan, Strategy},
    error::CodecError,
    obs::CodecOp,
    value::{Record, Value},
    wire::{WireRecord, WireValue, record_to_map},
};
use tokio_util::sync::CancellationToken;

/// Reconstruct one record from `batch` without collaborators.
pub fn reconstruct(codec: &EntityCodec, batch: &[WireRecord]) -> Result<Record, CodecError> {
    if let Some(err) = related_async_required(codec) {
        return Err(err);
    }

    codec.run_sync(|cancel| reconstruct_async(codec, batch, cancel))
}

/// Reconstruct one record from `batch`, calling collaborators as needed.
pub async fn reconstruct_async(
    codec: &EntityCodec,
    batch: &[WireRecord],
    cancel: &CancellationToken,
) -> Result<Record, CodecError> {
    let Some(first) = batch.first() else {
        return Err(codec.fail(
            CodecOp::Reconstruct,
            CodecError::Reconstruction {
                entity: codec.name().to_string(),
                record: "<none>".to_string(),
                reason: "batch is empty".to_string(),
                source: None,
            },
        ));
    };

    assemble(codec, batch, cancel).await.map_err(|err| {
        codec.fail(
            CodecOp::Reconstruct,
            CodecError::Reconstruction {
                entity: codec.name().to_string(),
                record: record_label(codec, first),
                reason: err.to_string(),
                source: Some(Box::new(err)),
            },
        )
    })
}

async fn assemble(
    codec: &EntityCodec,
    batch: &[WireRecord],
    cancel: &CancellationToken,
) -> Result<Record, CodecError> {
    let mut record = Record::new();

    // Phase 1: direct properties, first writer wins; collections accumulate
    for plan in codec.plan() {
        let property = &plan.property;
        if !property.is_wire_mapped() {
            continue;
        }

        if plan.strategy.is_collection() {
            if let Some(value) = collect(codec, plan, batch)? {
                record.insert(property.name.clone(), value);
            }
        } else if let Some(raw) = batch.iter().find_map(|wire| wire.get(&property.wire_name)) {
            let value = codec.decode_attribute(plan, raw, cancel).await?;
            record.insert(property.name.clone(), value);
        }
    }

    // Phase 2: extracted key components
    codec.resolve_extracted(&mut record);

    // Phase 3: relationships matched by sort key
    for plan in codec.plan() {
        let Strategy::Related(related) = &plan.strategy else {
            continue;
        };

        let mut found = Vec::new();
        for wire in batch {
            let Some(sort_key) = wire.get(&related.matcher.property).and_then(WireValue::as_text)
            else {
                continue;
            };
            if !related.matcher.matches(sort_key) {
                continue;
            }

            let value = match &related.codec {
                Some(target) if !target.matches_entity(wire) => continue,
                Some(target) => Value::Record(target.decode_boxed(wire, cancel).await?),
                None => record_to_map(wire),
            };
            found.push(value);

            if !related.relationship.collection {
                break;
            }
        }

        if related.relationship.collection {
            if !found.is_empty() {
                record.insert(plan.property.name.clone(), Value::List(found));
            }
        } else if let Some(value) = found.pop() {
            record.insert(plan.property.name.clone(), value);
        }
    }

    Ok(record)
}

/// Gather a collection property across the batch, in batch order.
fn collect(
    codec: &EntityCodec,
    plan: &PropertyPlan,
    batch: &[WireRecord],
) -> Result<Option<Value>, CodecError> {
    let mut items = Vec::new();

    for wire in batch {
        let Some(raw) = wire.get(&plan.property.wire_name) else {
            continue;
        };
        if raw.is_null() {
            continue;
        }

        if matches!(raw, WireValue::List(_)) || raw.is_set() {
            items.extend(codec.decode_members(plan, raw)?);
        } else {
            items.push(codec.decode_element(plan, raw)?);
        }
    }

    if items.is_empty() {
        return Ok(None);
    }

    Ok(Some(match plan.strategy {
        Strategy::Set(_) => Value::set(items),
        _ => Value::List(items),
    }))
}

fn related_async_required(codec: &EntityCodec) -> Option<CodecError> {
    codec.plan().iter().find_map(|plan| match &plan.strategy {
        Strategy::Related(related) => related
            .codec
            .as_ref()
            .filter(|target| target.requires_async())
            .map(|_| CodecError::AsyncRequired {
                entity: codec.name().to_string(),
                property: plan.property.name.clone(),
            }),
        _ => None,
    })
}

// identifies a record by its key attributes
fn record_label(codec: &EntityCodec, wire: &WireRecord) -> String {
    let text = |value: Option<&WireValue>| value.and_then(WireValue::as_text).map(str::to_string);

    match (text(codec.partition_key(wire)), text(codec.sort_key(wire))) {
        (Some(pk), Some(sk)) => format!("{pk}/{sk}"),
        (Some(pk), None) => pk,
        _ => "#0".to_string(),
    }
}
