//! Composite key formulas.
//!
//! Encode direction assembles key text from source properties; decode
//! direction splits it back out, best-effort.

use crate::value::Value;
use monotable_schema::node::{ComputedKeyFormula, ExtractedKeyRule};
use thiserror::Error as ThisError;

///
/// KeyError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum KeyError {
    #[error("key source '{property}' has no text form ({kind})")]
    NotKeyable {
        property: String,
        kind: &'static str,
    },

    #[error("key source '{property}' is unset")]
    Unset { property: String },
}

/// Compute key text for `formula`, reading each source through `source`.
///
/// Sources must already be populated; an unset source fails rather than
/// producing a key with an empty component.
pub fn compute<'v, F>(formula: &ComputedKeyFormula, mut source: F) -> Result<String, KeyError>
where
    F: FnMut(&str) -> Option<&'v Value>,
{
    let mut parts = Vec::with_capacity(formula.sources.len());

    for name in &formula.sources {
        let value = source(name)
            .filter(|value| !value.is_null())
            .ok_or_else(|| KeyError::Unset {
                property: name.clone(),
            })?;
        let text = value.key_text().ok_or_else(|| KeyError::NotKeyable {
            property: name.clone(),
            kind: value.label(),
        })?;

        parts.push(text);
    }

    let parts: Vec<&str> = parts.iter().map(AsRef::as_ref).collect();

    Ok(formula.format.render(&parts))
}

/// Extract a key component from an already-decoded source value.
///
/// Unset, null, or non-text sources and out-of-range indices yield `None`.
#[must_use]
pub fn extract(rule: &ExtractedKeyRule, source: Option<&Value>) -> Option<Value> {
    let text = source?.key_text()?;

    rule.extract(&text).map(Value::text)
}
