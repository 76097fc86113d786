use crate::{MAX_KEY_COMPONENTS, prelude::*};
use std::collections::BTreeSet;

/// Key designations, composite key formulas and extraction rules.
pub fn validate_keys(schema: &EntitySchema, errs: &mut ErrorTree) {
    let partition_keys: Vec<&str> = key_names(schema, |p| p.partition_key);
    let sort_keys: Vec<&str> = key_names(schema, |p| p.sort_key);

    if partition_keys.len() > 1 {
        err!(
            errs,
            "multiple partition keys declared: {}",
            partition_keys.join(", ")
        );
    }
    if sort_keys.len() > 1 {
        err!(errs, "multiple sort keys declared: {}", sort_keys.join(", "));
    }
    if partition_keys.is_empty() && !sort_keys.is_empty() {
        err!(errs, "sort key declared without a partition key");
    }

    for (position, property) in schema.properties.iter().enumerate() {
        if property.is_key() {
            validate_key_property(property, errs);
        }

        match &property.kind {
            PropertyKind::ComputedKey(formula) => {
                validate_formula(schema, position, property, formula, errs);
            }
            PropertyKind::ExtractedKey(rule) => validate_extraction(schema, property, rule, errs),
            _ => {}
        }
    }
}

/// Index names, key properties and projections.
pub fn validate_indexes(schema: &EntitySchema, errs: &mut ErrorTree) {
    let mut seen = BTreeSet::new();

    for index in &schema.indexes {
        let route = format!("index:{}", index.name);

        if index.name.is_empty() {
            errs.add_for(&route, "index name must not be empty");
        }
        if !seen.insert(index.name.as_str()) {
            errs.add_for(&route, format!("duplicate index name '{}'", index.name));
        }

        for key in index.key_properties() {
            match schema.property(key) {
                Some(property) if is_keyable(property) => {}
                Some(property) => errs.add_for(
                    &route,
                    format!(
                        "index key '{key}' has non-keyable kind {}",
                        property.kind.label()
                    ),
                ),
                None => errs.add_for(&route, format!("index key '{key}' is not a property")),
            }
        }

        for projected in &index.projected {
            match schema.property(projected) {
                Some(property) if property.is_wire_mapped() => {}
                Some(_) => errs.add_for(
                    &route,
                    format!("projected property '{projected}' is not wire-mapped"),
                ),
                None => errs.add_for(
                    &route,
                    format!("projected property '{projected}' is not a property"),
                ),
            }
        }
    }
}

fn key_names(schema: &EntitySchema, pick: impl Fn(&Property) -> bool) -> Vec<&str> {
    schema
        .properties
        .iter()
        .filter(|p| pick(p))
        .map(|p| p.name.as_str())
        .collect()
}

fn is_keyable(property: &Property) -> bool {
    property.is_wire_mapped()
        && property
            .kind
            .key_scalar()
            .is_some_and(ScalarKind::is_keyable)
}

fn validate_key_property(property: &Property, errs: &mut ErrorTree) {
    if !is_keyable(property) {
        errs.add_for(
            &property.name,
            format!(
                "key property has non-keyable kind {}",
                property.kind.label()
            ),
        );
    }
    if property.nullable {
        errs.add_for(&property.name, "key property must not be nullable");
    }
}

// Sources must exist, be keyable, and be computable before this formula.
fn validate_formula(
    schema: &EntitySchema,
    position: usize,
    property: &Property,
    formula: &ComputedKeyFormula,
    errs: &mut ErrorTree,
) {
    let route = property.name.as_str();

    if formula.sources.is_empty() {
        errs.add_for(route, "computed key has no source properties");
    }
    if formula.sources.len() > MAX_KEY_COMPONENTS {
        errs.add_for(
            route,
            format!(
                "computed key has {} sources (limit {MAX_KEY_COMPONENTS})",
                formula.sources.len()
            ),
        );
    }

    match &formula.format {
        KeyFormat::Separator(separator) if separator.is_empty() => {
            errs.add_for(route, "computed key separator must not be empty");
        }
        KeyFormat::Template(_) => {
            for index in formula.format.placeholders() {
                if index >= formula.sources.len() {
                    errs.add_for(
                        route,
                        format!(
                            "template placeholder {{{index}}} has no source (only {} sources)",
                            formula.sources.len()
                        ),
                    );
                }
            }
        }
        KeyFormat::Separator(_) => {}
    }

    for source in &formula.sources {
        let Some(source_position) = schema.properties.iter().position(|p| &p.name == source)
        else {
            errs.add_for(route, format!("source '{source}' is not a property"));
            continue;
        };
        let source_property = &schema.properties[source_position];

        match &source_property.kind {
            PropertyKind::ComputedKey(_) if source_position >= position => {
                errs.add_for(
                    route,
                    format!(
                        "source '{source}' is a computed key declared at or after this one \
                         (forward or cyclic reference)"
                    ),
                );
            }
            PropertyKind::ComputedKey(_) => {}
            PropertyKind::Scalar(kind) if kind.is_keyable() => {}
            kind => errs.add_for(
                route,
                format!("source '{source}' has non-keyable kind {}", kind.label()),
            ),
        }
    }
}

fn validate_extraction(
    schema: &EntitySchema,
    property: &Property,
    rule: &ExtractedKeyRule,
    errs: &mut ErrorTree,
) {
    let route = property.name.as_str();

    if rule.separator.is_empty() {
        errs.add_for(route, "extraction separator must not be empty");
    }

    match schema.property(&rule.source) {
        Some(source) => match source.kind {
            PropertyKind::ComputedKey(_) | PropertyKind::Scalar(ScalarKind::Text) => {}
            ref kind => errs.add_for(
                route,
                format!(
                    "extraction source '{}' has kind {}; expected text or computed key",
                    rule.source,
                    kind.label()
                ),
            ),
        },
        None => errs.add_for(
            route,
            format!("extraction source '{}' is not a property", rule.source),
        ),
    }
}
