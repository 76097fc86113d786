//! Compiled per-schema codecs.
//!
//! [`EntityCodec::compile`] resolves a validated schema into a dispatch
//! table once; every encode and decode afterwards walks that table. One
//! async implementation backs both entry points: the sync methods refuse
//! schemas with collaborator-backed properties up front, so their futures
//! never suspend.

mod collection;
mod decode;
mod discriminate;
mod encode;
mod external;
mod keys;
mod plan;
mod scalar;
mod ttl;


pub(crate) use plan::{PropertyPlan, Strategy};

use crate::{
    config::CodecConfig,
    error::CodecError,
    obs::{CodecEvent, CodecOp},
    registry::CodecRegistry,
    value::Record,
    wire::WireRecord,
};
use futures::{FutureExt, future::BoxFuture};
use monotable_schema::node::EntitySchema;
use std::future::Future;
use tokio_util::sync::CancellationToken;

///
/// EntityCodec
///
/// Immutable encode/decode procedures for one schema. Safe to share across
/// threads; no call mutates codec state.
///

#[derive(Debug)]
pub struct EntityCodec {
    schema: EntitySchema,
    plan: Vec<PropertyPlan>,
    wire_mapped: usize,
    async_property: Option<String>,
    config: CodecConfig,
}

impl EntityCodec {
    /// Compile a schema. Nested and related schemas must already be in
    /// `registry`; collaborators are checked at first use.
    pub fn compile(
        schema: EntitySchema,
        config: CodecConfig,
        registry: &CodecRegistry,
    ) -> Result<Self, CodecError> {
        let name = schema.name.clone();
        let schema = schema
            .validated()
            .map_err(|err| CodecError::configuration(&name, err.to_string()))?;

        let mut plan = Vec::with_capacity(schema.properties.len());
        let mut async_property = None;

        for property in &schema.properties {
            let strategy = Strategy::resolve(&schema, property, registry)?;
            if async_property.is_none() && strategy.requires_async() {
                async_property = Some(property.name.clone());
            }

            plan.push(PropertyPlan {
                property: property.clone(),
                strategy,
            });
        }

        Ok(Self {
            wire_mapped: schema.wire_mapped_count(),
            schema,
            plan,
            async_property,
            config,
        })
    }

    #[must_use]
    pub const fn schema(&self) -> &EntitySchema {
        &self.schema
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.schema.name
    }

    #[must_use]
    pub const fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Number of attributes a fully populated record encodes to.
    #[must_use]
    pub const fn wire_mapped_count(&self) -> usize {
        self.wire_mapped
    }

    /// Whether only the async entry points may be used.
    #[must_use]
    pub const fn requires_async(&self) -> bool {
        self.async_property.is_some()
    }

    pub fn to_wire(&self, record: &Record) -> Result<WireRecord, CodecError> {
        self.run_sync(|cancel| self.encode(record, cancel))
    }

    pub fn from_wire(&self, wire: &WireRecord) -> Result<Record, CodecError> {
        self.run_sync(|cancel| self.decode(wire, cancel))
    }

    /// Encode, calling collaborators as needed. `cancel` is forwarded to
    /// every collaborator call unchanged.
    pub async fn to_wire_async(
        &self,
        record: &Record,
        cancel: &CancellationToken,
    ) -> Result<WireRecord, CodecError> {
        self.encode(record, cancel).await
    }

    pub async fn from_wire_async(
        &self,
        wire: &WireRecord,
        cancel: &CancellationToken,
    ) -> Result<Record, CodecError> {
        self.decode(wire, cancel).await
    }

    pub(crate) fn plan(&self) -> &[PropertyPlan] {
        &self.plan
    }

    pub(crate) fn async_required(&self) -> Option<CodecError> {
        self.async_property
            .as_ref()
            .map(|property| CodecError::AsyncRequired {
                entity: self.schema.name.clone(),
                property: property.clone(),
            })
    }

    /// Drive an async codec operation to completion without an executor.
    pub(crate) fn run_sync<'a, T, F, Fut>(&'a self, op: F) -> Result<T, CodecError>
    where
        F: FnOnce(&'a CancellationToken) -> Fut,
        Fut: Future<Output = Result<T, CodecError>> + 'a,
        T: 'a,
    {
        if let Some(err) = self.async_required() {
            return Err(err);
        }

        op(never_cancelled())
            .now_or_never()
            .unwrap_or_else(|| Err(self.async_required_fallback()))
    }

    // only reachable if a nested codec suspends despite the upfront check
    fn async_required_fallback(&self) -> CodecError {
        CodecError::AsyncRequired {
            entity: self.schema.name.clone(),
            property: self
                .plan
                .iter()
                .find(|plan| plan.strategy.requires_async())
                .map_or_else(String::new, |plan| plan.property.name.clone()),
        }
    }

    /// Boxed encode for nested records.
    pub(crate) fn encode_boxed<'a>(
        &'a self,
        record: &'a Record,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<WireRecord, CodecError>> {
        self.encode(record, cancel).boxed()
    }

    /// Boxed decode for nested and related records.
    pub(crate) fn decode_boxed<'a>(
        &'a self,
        wire: &'a WireRecord,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Record, CodecError>> {
        self.decode(wire, cancel).boxed()
    }

    pub(crate) fn fail(&self, op: CodecOp, err: CodecError) -> CodecError {
        self.config.emit(CodecEvent::Failure {
            entity: &self.schema.name,
            op,
            class: err.class(),
        });

        err
    }
}

fn never_cancelled() -> &'static CancellationToken {
    static TOKEN: std::sync::OnceLock<CancellationToken> = std::sync::OnceLock::new();

    TOKEN.get_or_init(CancellationToken::new)
}
