use crate::{Error, prelude::*, validate::validate_entity};

///
/// EntitySchema
///
/// Immutable description of one record type. Constructed once at ingestion
/// time and never mutated afterwards; codecs derive everything from it.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EntitySchema {
    pub name: String,

    /// Ordered property list (authoritative for encode/decode order).
    pub properties: Vec<Property>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<DiscriminatorConfig>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indexes: Vec<IndexDescriptor>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<RelationshipDescriptor>,
}

impl EntitySchema {
    #[must_use]
    pub fn builder(name: impl Into<String>) -> EntitySchemaBuilder {
        EntitySchemaBuilder::new(name)
    }

    /// Validate a schema that arrived by another route (e.g. deserialization).
    pub fn validated(self) -> Result<Self, Error> {
        validate_entity(&self).map_err(|errors| Error::Validation {
            entity: self.name.clone(),
            errors,
        })?;

        Ok(self)
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    #[must_use]
    pub fn property_by_wire(&self, wire_name: &str) -> Option<&Property> {
        self.properties
            .iter()
            .find(|p| p.is_wire_mapped() && p.wire_name == wire_name)
    }

    #[must_use]
    pub fn partition_key(&self) -> Option<&Property> {
        self.properties.iter().find(|p| p.partition_key)
    }

    #[must_use]
    pub fn sort_key(&self) -> Option<&Property> {
        self.properties.iter().find(|p| p.sort_key)
    }

    #[must_use]
    pub fn index(&self, name: &str) -> Option<&IndexDescriptor> {
        self.indexes.iter().find(|i| i.name == name)
    }

    /// Resolve the active discriminator for a request, optionally index-scoped.
    ///
    /// An index-specific discriminator overrides the entity-level one; the
    /// entity-level configuration is the fallback.
    #[must_use]
    pub fn discriminator_for(&self, index: Option<&str>) -> Option<&DiscriminatorConfig> {
        let scoped = index
            .and_then(|name| self.index(name))
            .and_then(|index| index.discriminator.as_ref())
            .filter(|config| config.is_active());

        scoped.or_else(|| self.discriminator.as_ref().filter(|c| c.is_active()))
    }

    /// Wire attribute name read for a discriminator property.
    ///
    /// Discriminators may target attributes that are not declared properties
    /// (e.g. a shared `entity_type` column); those use the name verbatim.
    #[must_use]
    pub fn discriminator_wire_name<'a>(&'a self, config: &'a DiscriminatorConfig) -> &'a str {
        self.property(&config.property)
            .map_or(config.property.as_str(), |p| p.wire_name.as_str())
    }

    /// Number of properties that occupy a wire attribute.
    #[must_use]
    pub fn wire_mapped_count(&self) -> usize {
        self.properties.iter().filter(|p| p.is_wire_mapped()).count()
    }

    /// Whether any property forces the asynchronous encode/decode entry point.
    #[must_use]
    pub fn requires_async(&self) -> bool {
        self.properties.iter().any(Property::requires_async)
    }

    /// Names of nested schemas referenced by properties or relationships.
    #[must_use]
    pub fn nested_schemas(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self
            .properties
            .iter()
            .filter_map(|p| p.kind.nested_schema())
            .chain(
                self.relationships
                    .iter()
                    .filter_map(|r| r.related_schema.as_deref()),
            )
            .collect();
        out.sort_unstable();
        out.dedup();

        out
    }
}

///
/// EntitySchemaBuilder
///

#[derive(Clone, Debug)]
pub struct EntitySchemaBuilder {
    schema: EntitySchema,
}

impl EntitySchemaBuilder {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: EntitySchema {
                name: name.into(),
                properties: Vec::new(),
                discriminator: None,
                indexes: Vec::new(),
                relationships: Vec::new(),
            },
        }
    }

    #[must_use]
    pub fn property(mut self, property: Property) -> Self {
        self.schema.properties.push(property);
        self
    }

    /// Normalize and attach the entity-level discriminator.
    #[must_use]
    pub fn discriminator(mut self, spec: &DiscriminatorSpec) -> Self {
        self.schema.discriminator = Some(spec.analyze());
        self
    }

    #[must_use]
    pub fn index(mut self, index: IndexDescriptor) -> Self {
        self.schema.indexes.push(index);
        self
    }

    #[must_use]
    pub fn relationship(mut self, relationship: RelationshipDescriptor) -> Self {
        self.schema.relationships.push(relationship);
        self
    }

    /// Validate and freeze the schema.
    pub fn build(self) -> Result<EntitySchema, Error> {
        self.schema.validated()
    }
}
