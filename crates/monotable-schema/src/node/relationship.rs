use crate::prelude::*;

///
/// RelationshipDescriptor
///
/// Related record(s) stored under the same partition and located by a
/// sort-key pattern. Only multi-record reconstruction reads this.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RelationshipDescriptor {
    pub property: String,
    pub sort_key_pattern: String,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub collection: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_schema: Option<String>,
}

impl RelationshipDescriptor {
    /// Single related record.
    #[must_use]
    pub fn one(property: impl Into<String>, sort_key_pattern: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            sort_key_pattern: sort_key_pattern.into(),
            collection: false,
            related_schema: None,
        }
    }

    /// Every related record matching the pattern.
    #[must_use]
    pub fn many(property: impl Into<String>, sort_key_pattern: impl Into<String>) -> Self {
        Self {
            collection: true,
            ..Self::one(property, sort_key_pattern)
        }
    }

    #[must_use]
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.related_schema = Some(schema.into());
        self
    }

    /// Sort-key matcher, built from the same wildcard family as discriminators.
    #[must_use]
    pub fn sort_key_matcher(&self, sort_key_property: &str) -> DiscriminatorConfig {
        DiscriminatorConfig::from_pattern(sort_key_property, &self.sort_key_pattern)
    }
}
