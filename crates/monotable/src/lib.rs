//! ## Crate layout
//! - `core`: typed values, wire values, compiled codecs, reconstruction and
//!   the collaborator boundary.
//! - `primitives`: scalar kinds and their wire metadata.
//! - `schema`: schema model, discriminator analysis and validation.
//!
//! The `prelude` module covers the codec runtime; `schema::prelude` covers
//! schema authoring.

pub use monotable_core as core;
pub use monotable_primitives as primitives;
pub use monotable_schema as schema;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use core::error::{CodecError, ErrorClass};

///
/// Prelude
///

pub mod prelude {
    pub use crate::core::prelude::*;
    pub use crate::schema::{
        discriminator::DiscriminatorSpec,
        node::{
            BlobPayload, ComputedKeyFormula, EntitySchema, ExtractedKeyRule, IndexDescriptor,
            MapValueKind, Property, PropertyKind, RelationshipDescriptor,
        },
    };
    pub use monotable_primitives::ScalarKind;
}
