use crate::prelude::*;
use std::fmt::{self, Display};

///
/// IndexDescriptor
///
/// Secondary index over the same table. An index may carry its own
/// discriminator, which overrides the entity-level one for index-scoped reads.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct IndexDescriptor {
    pub name: String,
    pub partition_key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_key: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub projected: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<DiscriminatorConfig>,
}

impl IndexDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, partition_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            partition_key: partition_key.into(),
            sort_key: None,
            projected: Vec::new(),
            discriminator: None,
        }
    }

    #[must_use]
    pub fn sort_key(mut self, property: impl Into<String>) -> Self {
        self.sort_key = Some(property.into());
        self
    }

    #[must_use]
    pub fn project<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projected.extend(properties.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn discriminator(mut self, spec: &DiscriminatorSpec) -> Self {
        self.discriminator = Some(spec.analyze());
        self
    }

    /// Key properties of this index, partition first.
    pub fn key_properties(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.partition_key.as_str()).chain(self.sort_key.as_deref())
    }
}

impl Display for IndexDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sort_key {
            Some(sort_key) => write!(f, "{}({}, {})", self.name, self.partition_key, sort_key),
            None => write!(f, "{}({})", self.name, self.partition_key),
        }
    }
}
