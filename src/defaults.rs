use std::collections::BTreeMap;

use crate::choice::Choice;
use crate::error::ChoicesError;
use crate::source::{RawChoices, Source, SourceKind};
use crate::value::Value;

/// Hard-coded defaults, the lowest-priority source.
///
/// The resolver appends one of these, built from every [`Choice`] that declares
/// a default, after all registered sources.
#[derive(Debug, Clone, Default)]
pub struct DefaultSource {
    defaults: BTreeMap<String, Value>,
    raw: RawChoices,
}

impl DefaultSource {
    pub fn new(defaults: BTreeMap<String, Value>) -> Self {
        Self {
            defaults,
            raw: RawChoices::new(),
        }
    }

    pub fn from_choices(choices: &[Choice]) -> Self {
        let defaults = choices
            .iter()
            .filter_map(|c| c.default.clone().map(|d| (c.key.clone(), d)))
            .collect();
        Self::new(defaults)
    }
}

impl Source for DefaultSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Default
    }

    fn source_name(&self) -> String {
        "the default values".to_string()
    }

    fn raw(&self) -> &RawChoices {
        &self.raw
    }

    fn raw_mut(&mut self) -> &mut RawChoices {
        &mut self.raw
    }

    fn fill(&mut self) -> Result<(), ChoicesError> {
        for (key, value) in &self.defaults {
            self.raw.insert(key, key, value.clone());
        }
        Ok(())
    }
}
