//! Store-native attribute values.

mod opaque;

pub(crate) use opaque::{from_opaque, record_to_map, to_opaque};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// One wire record: attribute name → wire value.
pub type WireRecord = HashMap<String, WireValue>;

///
/// WireValue
///
/// Tagged attribute value as exchanged with a key-value store. Numbers are
/// carried as decimal text so no precision is lost across boundaries.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[remain::sorted]
pub enum WireValue {
    #[serde(rename = "B")]
    Binary(Vec<u8>),
    #[serde(rename = "BS")]
    BinarySet(BTreeSet<Vec<u8>>),
    #[serde(rename = "BOOL")]
    Boolean(bool),
    #[serde(rename = "L")]
    List(Vec<Self>),
    #[serde(rename = "M")]
    Map(WireRecord),
    #[serde(rename = "NULL")]
    Null,
    #[serde(rename = "N")]
    Number(String),
    #[serde(rename = "NS")]
    NumberSet(BTreeSet<String>),
    #[serde(rename = "S")]
    String(String),
    #[serde(rename = "SS")]
    StringSet(BTreeSet<String>),
}

impl WireValue {
    #[must_use]
    pub fn string(text: impl Into<String>) -> Self {
        Self::String(text.into())
    }

    #[must_use]
    pub fn number(value: impl ToString) -> Self {
        Self::Number(value.to_string())
    }

    #[must_use]
    pub fn string_set<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::StringSet(items.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn number_set<I, N>(items: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: ToString,
    {
        Self::NumberSet(items.into_iter().map(|n| n.to_string()).collect())
    }

    /// Store-style type tag.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Binary(_) => "B",
            Self::BinarySet(_) => "BS",
            Self::Boolean(_) => "BOOL",
            Self::List(_) => "L",
            Self::Map(_) => "M",
            Self::Null => "NULL",
            Self::Number(_) => "N",
            Self::NumberSet(_) => "NS",
            Self::String(_) => "S",
            Self::StringSet(_) => "SS",
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(text) => Some(text),
            _ => None,
        }
    }

    /// Text of a string or number attribute; used for discrimination and
    /// sort-key matching.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::String(text) | Self::Number(text) => Some(text),
            _ => None,
        }
    }

    /// Whether this value is one of the three set families.
    #[must_use]
    pub const fn is_set(&self) -> bool {
        matches!(
            self,
            Self::BinarySet(_) | Self::NumberSet(_) | Self::StringSet(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_structural() {
        let a = WireValue::string_set(["b", "a"]);
        let b = WireValue::string_set(["a", "b", "a"]);

        assert_eq!(a, b);
        assert_ne!(WireValue::string("1"), WireValue::number(1));
    }

    #[test]
    fn tags_follow_store_conventions() {
        assert_eq!(WireValue::number(3).tag(), "N");
        assert_eq!(WireValue::Map(WireRecord::new()).tag(), "M");
        assert!(WireValue::number_set([1, 2]).is_set());
    }

    #[test]
    fn text_accessors() {
        assert_eq!(WireValue::number(42).as_text(), Some("42"));
        assert_eq!(WireValue::number(42).as_str(), None);
        assert_eq!(WireValue::Boolean(true).as_text(), None);
    }

    #[test]
    fn serializes_with_store_tags() {
        let json = serde_json::to_string(&WireValue::number(7)).expect("serialize");

        assert_eq!(json, r#"{"N":"7"}"#);
    }
}
