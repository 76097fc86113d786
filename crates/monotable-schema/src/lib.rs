//! Declarative schema model for single-table record codecs.
//!
//! Schema / ingestion code defines *what exists*; `monotable-core` compiles a
//! validated [`node::EntitySchema`] into the codec that *runs*.

#[macro_use]
pub mod error;

pub mod discriminator;
pub mod node;
pub mod validate;

/// Maximum length for entity schema identifiers.
pub const MAX_ENTITY_NAME_LEN: usize = 64;

/// Maximum length for property and wire attribute names.
pub const MAX_PROPERTY_NAME_LEN: usize = 255;

/// Maximum number of source properties in one composite key formula.
pub const MAX_KEY_COMPONENTS: usize = 8;

/// Attribute read by the legacy single-field discriminator marker.
pub const DEFAULT_DISCRIMINATOR_PROPERTY: &str = "entity_type";

use crate::error::ErrorTree;
use thiserror::Error as ThisError;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        discriminator::{DiscriminatorConfig, DiscriminatorSpec, MatchStrategy},
        err,
        error::ErrorTree,
        node::*,
    };
    pub use monotable_primitives::ScalarKind;
    pub use serde::{Deserialize, Serialize};
}

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("schema '{entity}' failed validation:\n{errors}")]
    Validation { entity: String, errors: ErrorTree },
}

impl Error {
    /// Borrow the aggregated validation errors.
    #[must_use]
    pub const fn errors(&self) -> &ErrorTree {
        match self {
            Self::Validation { errors, .. } => errors,
        }
    }
}
