use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::ops::Index;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ChoicesError;
use crate::value::Value;

/// The resolved choices, ordered by key.
///
/// ```ignore
/// let choices = Choicefig::builder()
///     .source(CommandLineSource::new())
///     .choice(Choice::new("connections").integer().default("0"))
///     .resolve()?;
/// let connections = choices.get_integer("connections");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Choices {
    values: BTreeMap<String, Value>,
}

impl Choices {
    pub fn new(values: BTreeMap<String, Value>) -> Self {
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_integer(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_integer)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn get_list(&self, key: &str) -> Option<&[String]> {
        self.get(key).and_then(Value::as_list)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.values.iter()
    }

    pub fn keys(&self) -> btree_map::Keys<'_, String, Value> {
        self.values.keys()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Deserialize the choices into a typed struct. Field names are choice keys.
    pub fn extract<T: DeserializeOwned>(&self) -> Result<T, ChoicesError> {
        let json = serde_json::to_value(&self.values)?;
        Ok(serde_json::from_value(json)?)
    }

    pub fn into_inner(self) -> BTreeMap<String, Value> {
        self.values
    }
}

impl Index<&str> for Choices {
    type Output = Value;

    /// Panics if `key` was not resolved, like indexing a map.
    fn index(&self, key: &str) -> &Value {
        &self.values[key]
    }
}

impl IntoIterator for Choices {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a Choices {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl fmt::Display for Choices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.values {
            writeln!(f, "{key} = {value}")?;
        }
        Ok(())
    }
}
