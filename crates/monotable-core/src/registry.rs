use crate::{codec::EntityCodec, config::CodecConfig, error::CodecError};
use monotable_schema::node::EntitySchema;
use std::{collections::BTreeMap, sync::Arc};

///
/// CodecRegistry
///
/// Schema name → compiled codec. Nested and related schemas are resolved
/// against the registry when a codec is compiled, so schemas register
/// leaves first. Built once at startup and only read afterwards.
///

#[derive(Debug, Default)]
pub struct CodecRegistry {
    codecs: BTreeMap<String, Arc<EntityCodec>>,
}

impl CodecRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `schema` against the codecs registered so far and add it.
    pub fn register(
        &mut self,
        schema: EntitySchema,
        config: CodecConfig,
    ) -> Result<Arc<EntityCodec>, CodecError> {
        let codec = EntityCodec::compile(schema, config, self)?;

        self.insert(codec)
    }

    /// Add an already compiled codec. Names are unique.
    pub fn insert(&mut self, codec: EntityCodec) -> Result<Arc<EntityCodec>, CodecError> {
        let name = codec.name().to_string();
        if self.codecs.contains_key(&name) {
            return Err(CodecError::configuration(
                &name,
                format!("schema '{name}' is already registered"),
            ));
        }

        let codec = Arc::new(codec);
        self.codecs.insert(name, Arc::clone(&codec));

        Ok(codec)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<EntityCodec>> {
        self.codecs.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.codecs.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.codecs.keys().map(String::as_str)
    }
}
