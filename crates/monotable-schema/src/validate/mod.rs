//! Schema validation orchestration and shared helpers.

pub mod key;
pub mod naming;
pub mod relation;

use crate::{error::ErrorTree, node::EntitySchema};

/// Run full entity validation in a staged, deterministic order.
pub(crate) fn validate_entity(schema: &EntitySchema) -> Result<(), ErrorTree> {
    let mut errors = ErrorTree::new();

    // Phase 1: identifiers and uniqueness.
    naming::validate_naming(schema, &mut errors);

    // Phase 2: key designations, composite formulas, extraction rules, indexes.
    key::validate_keys(schema, &mut errors);
    key::validate_indexes(schema, &mut errors);

    // Phase 3: discriminators, relationships and nested references.
    relation::validate_discriminators(schema, &mut errors);
    relation::validate_relationships(schema, &mut errors);

    errors.result()
}

#[cfg(test)]
mod tests;
