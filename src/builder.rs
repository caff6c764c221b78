use serde::de::DeserializeOwned;

use crate::choice::Choice;
use crate::choices::Choices;
use crate::error::ChoicesError;
use crate::resolve::{self, ResolveInput};
use crate::source::Source;

/// Entry point for resolving choices.
pub struct Choicefig;

impl Choicefig {
    pub fn builder() -> ChoicefigBuilder {
        ChoicefigBuilder::new()
    }
}

/// Registers sources and choices, then resolves them.
///
/// Sources are registered **highest priority first**: on a key more than one
/// source supplies, the source registered earliest wins. The usual order is
/// command line, environment, configuration file. Defaults need no
/// registration; every [`Choice::default`] is folded in below all sources.
///
/// ```ignore
/// let choices = Choicefig::builder()
///     .source(CommandLineSource::new())
///     .source(EnvironmentSource::with_prefix("myprog_"))
///     .source(FileSource::yaml(".myprog-config.yml"))
///     .choice(Choice::new("connections").integer().default("0")
///         .option(CliOption::long("connections").short('c')))
///     .resolve()?;
/// ```
#[derive(Default)]
pub struct ChoicefigBuilder {
    sources: Vec<Box<dyn Source>>,
    choices: Vec<Choice>,
    strict: bool,
}

impl ChoicefigBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Register a source below every source registered so far.
    pub fn source(mut self, source: impl Source + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Register a choice. Keys must be unique.
    pub fn choice(mut self, choice: Choice) -> Self {
        self.choices.push(choice);
        self
    }

    /// Enable or disable strict mode (default: `false`).
    /// In strict mode, a configuration file key that names no registered choice
    /// is an error instead of being ignored.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Read every source once and resolve the registered choices.
    pub fn resolve(self) -> Result<Choices, ChoicesError> {
        resolve::resolve(ResolveInput {
            sources: self.sources,
            choices: self.choices,
            strict: self.strict,
        })
    }

    /// Resolve, then deserialize into `T`. Field names are choice keys.
    pub fn resolve_into<T: DeserializeOwned>(self) -> Result<T, ChoicesError> {
        self.resolve()?.extract()
    }
}
