use std::collections::BTreeMap;

use crate::error::ChoicesError;
use crate::source::{RawChoices, Source, SourceKind};
use crate::value::Value;

/// Environment variables as a source of choices.
///
/// With prefix `myprog_`, `myprog_connections` supplies the choice
/// `connections`. Everything after the prefix names the choice, with dashes
/// turned into underscores (`myprog_dry-run` → `dry_run`). Matching is
/// case-sensitive.
///
/// Extras capture variables outside the prefix convention:
/// `.extra("home", "HOME")` reads `$HOME` into the choice `home`.
///
/// List-typed choices split the value on commas (`myprog_files=a,b`). There is
/// no way to escape a comma.
#[derive(Debug, Clone)]
pub struct EnvironmentSource {
    prefix: String,
    extras: BTreeMap<String, String>,
    vars: Option<Vec<(String, String)>>,
    raw: RawChoices,
}

impl EnvironmentSource {
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            extras: BTreeMap::new(),
            vars: None,
            raw: RawChoices::new(),
        }
    }

    /// Read the variable `var` into choice `key`, regardless of prefix.
    pub fn extra(mut self, key: &str, var: &str) -> Self {
        self.extras.insert(key.to_string(), var.to_string());
        self
    }

    /// Use these pairs instead of the process environment.
    pub fn vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.vars = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }
}

impl Source for EnvironmentSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Environment
    }

    fn source_name(&self) -> String {
        "the environment".to_string()
    }

    fn raw(&self) -> &RawChoices {
        &self.raw
    }

    fn raw_mut(&mut self) -> &mut RawChoices {
        &mut self.raw
    }

    fn fill(&mut self) -> Result<(), ChoicesError> {
        let vars: Vec<(String, String)> = match self.vars.take() {
            Some(vars) => vars,
            None => std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
        };
        self.raw = env_to_choices(&self.prefix, &self.extras, vars);
        Ok(())
    }
}

/// Build the raw choices for `prefix` and `extras` out of `vars`.
///
/// Takes an iterator so tests can pass synthetic data instead of the process
/// environment.
pub fn env_to_choices(
    prefix: &str,
    extras: &BTreeMap<String, String>,
    vars: impl IntoIterator<Item = (String, String)>,
) -> RawChoices {
    let mut by_name: BTreeMap<String, String> = BTreeMap::new();
    let mut raw = RawChoices::new();

    for (name, value) in vars {
        if let Some(rest) = name.strip_prefix(prefix)
            && !rest.is_empty()
        {
            raw.insert(&rest.replace('-', "_"), &name, Value::String(value.clone()));
        }
        by_name.insert(name, value);
    }

    for (key, var) in extras {
        if let Some(value) = by_name.get(var) {
            raw.insert(key, var, Value::String(value.clone()));
        }
    }

    raw
}
