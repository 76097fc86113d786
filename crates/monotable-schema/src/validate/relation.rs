use crate::prelude::*;
use std::collections::BTreeSet;

/// Entity- and index-level discriminators must name an attribute.
pub fn validate_discriminators(schema: &EntitySchema, errs: &mut ErrorTree) {
    if let Some(config) = &schema.discriminator {
        validate_discriminator("discriminator", schema, config, errs);
    }

    for index in &schema.indexes {
        if let Some(config) = &index.discriminator {
            let route = format!("index:{}", index.name);
            validate_discriminator(&route, schema, config, errs);
        }
    }
}

fn validate_discriminator(
    route: &str,
    schema: &EntitySchema,
    config: &DiscriminatorConfig,
    errs: &mut ErrorTree,
) {
    if !config.is_active() {
        return;
    }

    if config.property.is_empty() {
        errs.add_for(route, "discriminator property must not be empty");
        return;
    }

    // undeclared attributes are allowed; declared ones must be wire-mapped text
    if let Some(property) = schema.property(&config.property) {
        let textual = matches!(
            property.kind,
            PropertyKind::ComputedKey(_)
                | PropertyKind::Scalar(ScalarKind::Text | ScalarKind::Enum)
        );
        if !textual {
            errs.add_for(
                route,
                format!(
                    "discriminator property '{}' has kind {}; expected text",
                    config.property,
                    property.kind.label()
                ),
            );
        }
    }
}

/// Relationship descriptors and their `Related` properties must pair up.
pub fn validate_relationships(schema: &EntitySchema, errs: &mut ErrorTree) {
    let mut described = BTreeSet::new();

    for relationship in &schema.relationships {
        let route = format!("relationship:{}", relationship.property);

        if !described.insert(relationship.property.as_str()) {
            errs.add_for(&route, "property has more than one relationship");
        }
        if relationship.sort_key_pattern.is_empty() {
            errs.add_for(&route, "sort key pattern must not be empty");
        }
        if relationship
            .related_schema
            .as_deref()
            .is_some_and(str::is_empty)
        {
            errs.add_for(&route, "related schema name must not be empty");
        }

        match schema.property(&relationship.property) {
            Some(property) if property.kind == PropertyKind::Related => {}
            Some(property) => errs.add_for(
                &route,
                format!(
                    "relationship targets property of kind {}; expected Related",
                    property.kind.label()
                ),
            ),
            None => errs.add_for(&route, "relationship targets an unknown property"),
        }
    }

    if !schema.relationships.is_empty() && schema.sort_key().is_none() {
        err!(errs, "relationships require a sort key to match related records");
    }

    for property in &schema.properties {
        if property.kind == PropertyKind::Related && !described.contains(property.name.as_str()) {
            errs.add_for(&property.name, "related property has no relationship descriptor");
        }
        if property.kind.nested_schema().is_some_and(str::is_empty) {
            errs.add_for(&property.name, "nested schema name must not be empty");
        }
    }
}
