use crate::value::{FieldValue, RecordError, Value};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, btree_map};

///
/// Record
///
/// One typed in-memory record keyed by logical property name. A missing
/// name means "unset"; `Value::Null` is kept only where it was explicit.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fields: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Value of `name` unless it is unset or explicitly null.
    #[must_use]
    pub fn present(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).filter(|value| !value.is_null())
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(name.into(), value)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.fields.iter()
    }

    /// Builder-style insert of a typed field.
    #[must_use]
    pub fn with<T: FieldValue>(mut self, name: impl Into<String>, value: T) -> Self {
        self.fields.insert(name.into(), value.to_value());
        self
    }

    /// Insert a typed field.
    pub fn set<T: FieldValue>(&mut self, name: impl Into<String>, value: &T) {
        self.fields.insert(name.into(), value.to_value());
    }

    /// Read a typed field; unset reads as `Value::Null`.
    pub fn field<T: FieldValue>(&self, name: &str) -> Result<T, RecordError> {
        let value = self.fields.get(name).unwrap_or(&Value::Null);

        T::from_value(value).ok_or_else(|| RecordError::Field {
            name: name.to_string(),
            expected: std::any::type_name::<T>(),
            found: value.label(),
        })
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl From<BTreeMap<String, Value>> for Record {
    fn from(fields: BTreeMap<String, Value>) -> Self {
        Self { fields }
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
