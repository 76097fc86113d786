//! Typed entities over the record codec.

use crate::{
    codec::EntityCodec,
    config::CodecConfig,
    error::CodecError,
    reconstruct,
    registry::CodecRegistry,
    value::{Record, RecordError},
    wire::WireRecord,
};
use monotable_schema::node::EntitySchema;
use std::{fmt, marker::PhantomData, sync::Arc};
use tokio_util::sync::CancellationToken;

///
/// EntityKind
///
/// A Rust struct with a schema and a lossless mapping onto [`Record`].
///

pub trait EntityKind: Sized {
    fn schema() -> EntitySchema;

    fn to_record(&self) -> Record;

    fn from_record(record: &Record) -> Result<Self, RecordError>;
}

///
/// TypedCodec
///
/// [`EntityCodec`] bound to one [`EntityKind`]. Field mismatches while
/// rebuilding the struct surface as `Conversion` errors.
///

pub struct TypedCodec<E> {
    codec: Arc<EntityCodec>,
    _marker: PhantomData<fn() -> E>,
}

impl<E: EntityKind> TypedCodec<E> {
    /// Compile `E`'s schema and add it to `registry`.
    pub fn register(registry: &mut CodecRegistry, config: CodecConfig) -> Result<Self, CodecError> {
        let codec = registry.register(E::schema(), config)?;

        Ok(Self::wrap(codec))
    }

    /// Compile `E`'s schema without registering it.
    pub fn compile(config: CodecConfig, registry: &CodecRegistry) -> Result<Self, CodecError> {
        let codec = EntityCodec::compile(E::schema(), config, registry)?;

        Ok(Self::wrap(Arc::new(codec)))
    }

    /// Bind an existing codec; its schema name must be `E`'s.
    pub fn bind(codec: Arc<EntityCodec>) -> Result<Self, CodecError> {
        let expected = E::schema().name;
        if codec.name() != expected {
            return Err(CodecError::configuration(
                codec.name(),
                format!("codec compiled for '{}' cannot bind entity '{expected}'", codec.name()),
            ));
        }

        Ok(Self::wrap(codec))
    }

    const fn wrap(codec: Arc<EntityCodec>) -> Self {
        Self {
            codec,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub fn codec(&self) -> &EntityCodec {
        &self.codec
    }

    pub fn to_wire(&self, entity: &E) -> Result<WireRecord, CodecError> {
        self.codec.to_wire(&entity.to_record())
    }

    pub fn from_wire(&self, wire: &WireRecord) -> Result<E, CodecError> {
        let record = self.codec.from_wire(wire)?;

        self.entity(&record)
    }

    pub async fn to_wire_async(
        &self,
        entity: &E,
        cancel: &CancellationToken,
    ) -> Result<WireRecord, CodecError> {
        self.codec.to_wire_async(&entity.to_record(), cancel).await
    }

    pub async fn from_wire_async(
        &self,
        wire: &WireRecord,
        cancel: &CancellationToken,
    ) -> Result<E, CodecError> {
        let record = self.codec.from_wire_async(wire, cancel).await?;

        self.entity(&record)
    }

    #[must_use]
    pub fn matches_entity(&self, wire: &WireRecord) -> bool {
        self.codec.matches_entity(wire)
    }

    pub fn key_attributes(&self, entity: &E) -> Result<WireRecord, CodecError> {
        self.codec.key_attributes(&entity.to_record())
    }

    pub fn reconstruct(&self, batch: &[WireRecord]) -> Result<E, CodecError> {
        let record = reconstruct::reconstruct(&self.codec, batch)?;

        self.entity(&record)
    }

    pub async fn reconstruct_async(
        &self,
        batch: &[WireRecord],
        cancel: &CancellationToken,
    ) -> Result<E, CodecError> {
        let record = reconstruct::reconstruct_async(&self.codec, batch, cancel).await?;

        self.entity(&record)
    }

    fn entity(&self, record: &Record) -> Result<E, CodecError> {
        E::from_record(record).map_err(|err| match err {
            RecordError::Field {
                name,
                expected,
                found,
            } => CodecError::Conversion {
                entity: self.codec.name().to_string(),
                property: name,
                value: found.to_string(),
                target: expected.to_string(),
                reason: "decoded value does not fit the entity field".to_string(),
            },
        })
    }
}

impl<E> Clone for TypedCodec<E> {
    fn clone(&self) -> Self {
        Self {
            codec: Arc::clone(&self.codec),
            _marker: PhantomData,
        }
    }
}

impl<E> fmt::Debug for TypedCodec<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedCodec")
            .field("entity", &self.codec.name())
            .finish()
    }
}
