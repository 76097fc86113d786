//! Core runtime for Monotable: typed values, wire values, compiled entity
//! codecs, multi-record reconstruction, and the collaborator boundary.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod codec;
pub mod collab;
pub mod config;
pub mod entity;
pub mod error;
pub mod key;
pub mod obs;
pub mod reconstruct;
pub mod registry;
pub mod value;
pub mod wire;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use tokio_util::sync::CancellationToken;

///
/// Prelude
///
/// Domain vocabulary plus the codec entry points.
///

pub mod prelude {
    pub use crate::{
        codec::EntityCodec,
        config::{CodecConfig, TtlRange},
        entity::{EntityKind, TypedCodec},
        error::{CodecError, ErrorClass},
        reconstruct::{reconstruct, reconstruct_async},
        registry::CodecRegistry,
        value::{Blob, FieldValue, Record, Value},
        wire::{WireRecord, WireValue},
    };
    pub use tokio_util::sync::CancellationToken;
}
