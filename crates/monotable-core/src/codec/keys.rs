use crate::{
    codec::{EntityCodec, scalar},
    error::{CodecError, FieldError},
    value::Record,
    wire::{WireRecord, WireValue},
};
use monotable_primitives::ScalarKind;
use monotable_schema::node::Property;

impl EntityCodec {
    /// Partition key attribute of a raw record, if the schema has one.
    #[must_use]
    pub fn partition_key<'w>(&self, wire: &'w WireRecord) -> Option<&'w WireValue> {
        let property = self.schema.partition_key()?;

        wire.get(&property.wire_name)
    }

    /// Sort key attribute of a raw record, if the schema has one.
    #[must_use]
    pub fn sort_key<'w>(&self, wire: &'w WireRecord) -> Option<&'w WireValue> {
        let property = self.schema.sort_key()?;

        wire.get(&property.wire_name)
    }

    /// Encode only the partition and sort key attributes of a record,
    /// evaluating composite keys first. Suitable for point reads and deletes.
    pub fn key_attributes(&self, record: &Record) -> Result<WireRecord, CodecError> {
        let keys = self.compute_keys(record)?;
        let mut out = WireRecord::with_capacity(2);

        for property in [self.schema.partition_key(), self.schema.sort_key()]
            .into_iter()
            .flatten()
        {
            let value = keys
                .get(property.name.as_str())
                .or_else(|| record.present(&property.name))
                .ok_or_else(|| {
                    FieldError::Conversion {
                        value: "unset".to_string(),
                        target: property.kind.label().to_string(),
                        reason: "key property is unset".to_string(),
                    }
                    .at(&self.schema.name, &property.name)
                })?;

            let kind = key_kind(property);
            let wire = scalar::encode(kind, value, property)
                .map_err(|err| err.at(&self.schema.name, &property.name))?;

            out.insert(property.wire_name.clone(), wire);
        }

        Ok(out)
    }

    /// Narrow a full wire record to what `index` would hold: table keys,
    /// index keys, projected attributes and the discriminator attribute
    /// resolved for that index.
    pub fn project_for_index(
        &self,
        wire: &WireRecord,
        index: &str,
    ) -> Result<WireRecord, CodecError> {
        let descriptor = self.schema.index(index).ok_or_else(|| {
            CodecError::configuration(&self.schema.name, format!("unknown index '{index}'"))
        })?;

        let mut attributes: Vec<&str> = Vec::new();
        attributes.extend(self.schema.partition_key().map(|p| p.wire_name.as_str()));
        attributes.extend(self.schema.sort_key().map(|p| p.wire_name.as_str()));
        let projected = descriptor.projected.iter().map(String::as_str);
        for name in descriptor.key_properties().chain(projected) {
            if let Some(property) = self.schema.property(name) {
                attributes.push(&property.wire_name);
            }
        }
        if let Some(config) = self.schema.discriminator_for(Some(index)) {
            attributes.push(self.schema.discriminator_wire_name(config));
        }

        let mut out = WireRecord::with_capacity(attributes.len());
        for attribute in attributes {
            if let Some(value) = wire.get(attribute) {
                out.entry(attribute.to_string()).or_insert_with(|| value.clone());
            }
        }

        Ok(out)
    }
}

fn key_kind(property: &Property) -> ScalarKind {
    property.kind.key_scalar().unwrap_or(ScalarKind::Text)
}

