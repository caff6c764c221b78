//! Core resolution pipeline: run every source and produce the resolved choices.
//!
//! Steps:
//!
//! 1. Validate the registrations (duplicate keys, command-line bindings)
//! 2. Bind each source to the registered choices
//! 3. Append a [`DefaultSource`] as the lowest-priority source
//! 4. Fill every source from its medium
//! 5. Reject unknown file keys (if strict)
//! 6. Apply conversions per source, so errors name the source
//! 7. Merge, first-registered source winning
//! 8. Second pass against the merged result (positional arguments)

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::choice::Choice;
use crate::choices::Choices;
use crate::conversion::ConversionTable;
use crate::defaults::DefaultSource;
use crate::error::ChoicesError;
use crate::merge::merge_sources;
use crate::source::{Source, SourceKind};

/// Everything a resolution run needs. Sources are in priority order, highest
/// first.
pub struct ResolveInput {
    pub sources: Vec<Box<dyn Source>>,
    pub choices: Vec<Choice>,
    /// Whether to reject file keys that name no registered choice.
    pub strict: bool,
}

pub fn resolve(input: ResolveInput) -> Result<Choices, ChoicesError> {
    let ResolveInput {
        mut sources,
        choices,
        strict,
    } = input;

    validate(&sources, &choices)?;
    for source in sources.iter_mut() {
        source.bind(&choices)?;
    }
    sources.push(Box::new(DefaultSource::from_choices(&choices)));

    let conversions: ConversionTable = choices
        .iter()
        .filter(|c| !c.conversions.is_empty())
        .map(|c| (c.key.clone(), c.conversions.clone()))
        .collect();
    let registered: BTreeSet<String> = choices.iter().map(|c| c.key.clone()).collect();

    for source in sources.iter_mut() {
        source.fill()?;
        debug!(source = %source.source_name(), keys = source.raw().len(), "filled");
    }

    if strict {
        reject_unknown_keys(&sources, &registered)?;
    }

    for source in sources.iter_mut() {
        source.apply(&conversions)?;
    }
    debug!(choices = conversions.len(), "applied conversions");

    let mut merged: BTreeMap<String, _> = merge_sources(
        sources.iter().map(|s| (s.source_name(), s.raw())),
        &registered,
    );
    debug!(keys = merged.len(), "merged sources");

    for source in sources.iter_mut() {
        source.adjust(&mut merged, &conversions)?;
    }
    debug!(keys = merged.len(), "resolved");

    Ok(Choices::new(merged))
}

fn validate(sources: &[Box<dyn Source>], choices: &[Choice]) -> Result<(), ChoicesError> {
    let mut seen = BTreeSet::new();
    for choice in choices {
        if !seen.insert(choice.key.as_str()) {
            return Err(ChoicesError::InvalidChoice {
                key: choice.key.clone(),
                reason: "registered more than once".to_string(),
            });
        }
    }

    let kinds: Vec<SourceKind> = sources.iter().map(|s| s.kind()).collect();
    let command_lines = kinds
        .iter()
        .filter(|k| **k == SourceKind::CommandLine)
        .count();
    if command_lines > 1 {
        return Err(ChoicesError::DuplicateCommandLine);
    }
    if command_lines == 0
        && let Some(choice) = choices.iter().find(|c| c.command_line.is_some())
    {
        return Err(ChoicesError::NoCommandLineSource {
            key: choice.key.clone(),
        });
    }

    for pair in sources.windows(2) {
        if pair[0].kind() > pair[1].kind() {
            warn!(
                first = %pair[0].source_name(),
                then = %pair[1].source_name(),
                "sources registered out of the usual order; the first one wins on shared keys"
            );
        }
    }
    Ok(())
}

fn reject_unknown_keys(
    sources: &[Box<dyn Source>],
    registered: &BTreeSet<String>,
) -> Result<(), ChoicesError> {
    for source in sources.iter().filter(|s| s.kind() == SourceKind::File) {
        let raw = source.raw();
        if let Some(key) = raw.keys().find(|k| !registered.contains(*k)) {
            return Err(ChoicesError::UnknownKey {
                key: raw.external_name(key).to_string(),
                source_name: source.source_name(),
            });
        }
    }
    Ok(())
}
