use crate::{codec::EntityCodec, error::CodecError, registry::CodecRegistry};
use monotable_primitives::ScalarKind;
use monotable_schema::{
    discriminator::DiscriminatorConfig,
    node::{
        BlobPayload, ComputedKeyFormula, EntitySchema, ExtractedKeyRule, MapValueKind, Property,
        PropertyKind, RelationshipDescriptor,
    },
};
use std::sync::Arc;

///
/// PropertyPlan
///
/// One row of a compiled dispatch table: the property and the strategy
/// resolved for it, nested codecs included.
///

#[derive(Debug)]
pub(crate) struct PropertyPlan {
    pub(crate) property: Property,
    pub(crate) strategy: Strategy,
}

///
/// Strategy
///

#[derive(Debug)]
#[remain::sorted]
pub(crate) enum Strategy {
    ComputedKey(ComputedKeyFormula),
    Document(Arc<EntityCodec>),
    EmbeddedJson,
    Encrypted(ScalarKind),
    ExternalBlob(BlobPayload),
    ExtractedKey(ExtractedKeyRule),
    List(ScalarKind),
    Map(MapStrategy),
    Related(RelatedPlan),
    Scalar(ScalarKind),
    Set(ScalarKind),
    Ttl,
}

///
/// MapStrategy
///

#[derive(Debug)]
pub(crate) enum MapStrategy {
    Opaque,
    Record(Arc<EntityCodec>),
    Text,
}

///
/// RelatedPlan
///
/// Relationship descriptor with its sort-key matcher prebuilt and the
/// related codec resolved, when the relationship names one.
///

#[derive(Debug)]
pub(crate) struct RelatedPlan {
    pub(crate) relationship: RelationshipDescriptor,
    pub(crate) matcher: DiscriminatorConfig,
    pub(crate) codec: Option<Arc<EntityCodec>>,
}

impl Strategy {
    pub(crate) fn resolve(
        schema: &EntitySchema,
        property: &Property,
        registry: &CodecRegistry,
    ) -> Result<Self, CodecError> {
        let strategy = match &property.kind {
            PropertyKind::ComputedKey(formula) => Self::ComputedKey(formula.clone()),
            PropertyKind::Document(name) => Self::Document(nested(schema, registry, name)?),
            PropertyKind::EmbeddedJson => Self::EmbeddedJson,
            PropertyKind::Encrypted(kind) => Self::Encrypted(*kind),
            PropertyKind::ExternalBlob(payload) => Self::ExternalBlob(*payload),
            PropertyKind::ExtractedKey(rule) => Self::ExtractedKey(rule.clone()),
            PropertyKind::List(kind) => Self::List(*kind),
            PropertyKind::Map(MapValueKind::Opaque) => Self::Map(MapStrategy::Opaque),
            PropertyKind::Map(MapValueKind::Record(name)) => {
                Self::Map(MapStrategy::Record(nested(schema, registry, name)?))
            }
            PropertyKind::Map(MapValueKind::Text) => Self::Map(MapStrategy::Text),
            PropertyKind::Related => Self::Related(related(schema, property, registry)?),
            PropertyKind::Scalar(kind) => Self::Scalar(*kind),
            PropertyKind::Set(kind) => Self::Set(*kind),
            PropertyKind::Ttl => Self::Ttl,
        };

        Ok(strategy)
    }

    /// Whether encode/decode through this strategy may call a collaborator.
    pub(crate) fn requires_async(&self) -> bool {
        match self {
            Self::Encrypted(_) | Self::ExternalBlob(_) => true,
            Self::Document(codec) | Self::Map(MapStrategy::Record(codec)) => codec.requires_async(),
            _ => false,
        }
    }

    /// Whether an unset value is written as an absent attribute even when
    /// the property is not nullable.
    pub(crate) const fn omits_unset(&self) -> bool {
        matches!(self, Self::List(_) | Self::Set(_) | Self::Map(_))
    }

    pub(crate) const fn is_collection(&self) -> bool {
        matches!(self, Self::List(_) | Self::Set(_))
    }
}

fn nested(
    schema: &EntitySchema,
    registry: &CodecRegistry,
    name: &str,
) -> Result<Arc<EntityCodec>, CodecError> {
    registry.get(name).cloned().ok_or_else(|| {
        CodecError::configuration(
            &schema.name,
            format!("nested schema '{name}' is not registered"),
        )
    })
}

fn related(
    schema: &EntitySchema,
    property: &Property,
    registry: &CodecRegistry,
) -> Result<RelatedPlan, CodecError> {
    let relationship = schema
        .relationships
        .iter()
        .find(|r| r.property == property.name)
        .cloned()
        .ok_or_else(|| {
            CodecError::configuration(
                &schema.name,
                format!("related property '{}' has no relationship", property.name),
            )
        })?;
    let sort_key = schema.sort_key().ok_or_else(|| {
        CodecError::configuration(&schema.name, "relationships require a sort key")
    })?;

    let codec = match &relationship.related_schema {
        Some(name) => Some(nested(schema, registry, name)?),
        None => None,
    };

    Ok(RelatedPlan {
        matcher: relationship.sort_key_matcher(&sort_key.wire_name),
        relationship,
        codec,
    })
}
