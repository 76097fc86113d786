use crate::{MAX_ENTITY_NAME_LEN, MAX_PROPERTY_NAME_LEN, prelude::*};
use std::collections::BTreeMap;

/// Identifier lengths plus logical/wire name uniqueness.
pub fn validate_naming(schema: &EntitySchema, errs: &mut ErrorTree) {
    let name = schema.name.as_str();
    if name.is_empty() {
        err!(errs, "entity name must not be empty");
    } else if name.len() > MAX_ENTITY_NAME_LEN {
        err!(
            errs,
            "entity name '{name}' exceeds {MAX_ENTITY_NAME_LEN} characters"
        );
    }

    if schema.properties.is_empty() {
        err!(errs, "entity '{name}' declares no properties");
    }

    let mut names: BTreeMap<&str, usize> = BTreeMap::new();
    let mut wire_names: BTreeMap<&str, &str> = BTreeMap::new();

    for (position, property) in schema.properties.iter().enumerate() {
        let route = route_for(property, position);

        check_identifier(&route, "property name", &property.name, errs);
        if let Some(prev) = names.insert(property.name.as_str(), position) {
            errs.add_for(
                &route,
                format!(
                    "duplicate property name '{}' (first declared at position {prev})",
                    property.name
                ),
            );
        }

        if !property.is_wire_mapped() {
            continue;
        }

        check_identifier(&route, "wire name", &property.wire_name, errs);
        if let Some(prev) = wire_names.insert(property.wire_name.as_str(), property.name.as_str())
        {
            errs.add_for(
                &route,
                format!(
                    "wire name '{}' is already used by property '{prev}'",
                    property.wire_name
                ),
            );
        }
    }
}

// Route label for one property; empty names fall back to their position.
fn route_for(property: &Property, position: usize) -> String {
    if property.name.is_empty() {
        format!("#{position}")
    } else {
        property.name.clone()
    }
}

fn check_identifier(route: &str, label: &str, value: &str, errs: &mut ErrorTree) {
    if value.is_empty() {
        errs.add_for(route, format!("{label} must not be empty"));
    } else if value.len() > MAX_PROPERTY_NAME_LEN {
        errs.add_for(
            route,
            format!("{label} '{value}' exceeds {MAX_PROPERTY_NAME_LEN} characters"),
        );
    }
}
