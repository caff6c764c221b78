//! The capability every choice source shares.
//!
//! A source owns a [`RawChoices`] map of choice key to value, plus the name each
//! key goes by in that source (`--connections`, `MYPROG_CONNECTIONS`, ...). The
//! resolver drives every source through the same lifecycle:
//!
//! 1. [`bind`](Source::bind): learn the registered choices (the command line
//!    builds its parser here).
//! 2. [`fill`](Source::fill): read the medium once.
//! 3. [`apply`](Source::apply): run conversions over this source's own values,
//!    so failures name this source.
//! 4. [`adjust`](Source::adjust): second pass against the merged result.

use std::collections::BTreeMap;

use crate::choice::Choice;
use crate::conversion::{self, Conversion, ConversionError, ConversionTable};
use crate::error::ChoicesError;
use crate::value::Value;

/// Replaces the generic message for a key's conversion failure. Returning
/// `None` keeps the generic message.
pub type MessageOverride = fn(&ConversionError) -> Option<String>;

pub type ErrorOverrides = BTreeMap<String, MessageOverride>;

/// Which medium a source reads. Sources are conventionally registered in the
/// order these variants are declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SourceKind {
    CommandLine,
    Environment,
    File,
    Default,
}

pub trait Source {
    fn kind(&self) -> SourceKind;

    /// Human-readable origin, as in `"Error in <source name>: ..."`.
    fn source_name(&self) -> String;

    fn raw(&self) -> &RawChoices;

    fn raw_mut(&mut self) -> &mut RawChoices;

    fn bind(&mut self, _choices: &[Choice]) -> Result<(), ChoicesError> {
        Ok(())
    }

    fn fill(&mut self) -> Result<(), ChoicesError>;

    fn apply(&mut self, conversions: &ConversionTable) -> Result<(), ChoicesError> {
        let name = self.source_name();
        self.raw_mut()
            .apply(&name, conversions, &ErrorOverrides::new())
    }

    fn adjust(
        &mut self,
        _merged: &mut BTreeMap<String, Value>,
        _conversions: &ConversionTable,
    ) -> Result<(), ChoicesError> {
        Ok(())
    }
}

/// Values a single source holds, keyed by choice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawChoices {
    values: BTreeMap<String, Value>,
    external_names: BTreeMap<String, String>,
}

impl RawChoices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, external_name: &str, value: Value) {
        self.values.insert(key.to_string(), value);
        self.external_names
            .insert(key.to_string(), external_name.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }

    /// The name `key` goes by in this source. Falls back to the key itself.
    pub fn external_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.external_names
            .get(key)
            .map(String::as_str)
            .unwrap_or(key)
    }

    /// Convert every held key that has conversions registered.
    pub fn apply(
        &mut self,
        source_name: &str,
        conversions: &ConversionTable,
        overrides: &ErrorOverrides,
    ) -> Result<(), ChoicesError> {
        for (key, key_conversions) in conversions {
            self.apply_one(key, key_conversions, source_name, overrides)?;
        }
        Ok(())
    }

    pub fn apply_one(
        &mut self,
        key: &str,
        conversions: &[Conversion],
        source_name: &str,
        overrides: &ErrorOverrides,
    ) -> Result<(), ChoicesError> {
        let Some(value) = self.values.get(key) else {
            return Ok(());
        };
        match conversion::convert_all(value.clone(), conversions) {
            Ok(converted) => {
                self.values.insert(key.to_string(), converted);
                Ok(())
            }
            Err(err) => {
                let message = overrides
                    .get(key)
                    .and_then(|make| make(&err))
                    .unwrap_or_else(|| err.describe(self.external_name(key)));
                Err(ChoicesError::Conversion {
                    source_name: source_name.to_string(),
                    key: key.to_string(),
                    message,
                    source: err,
                })
            }
        }
    }
}
