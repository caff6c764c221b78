use thiserror::Error;

use crate::conversion::{ArityMismatch, ConversionError};

#[derive(Debug, Error)]
pub enum ChoicesError {
    #[error("Badly formatted {source_name}: {source}")]
    BadlyFormatted {
        source_name: String,
        source: FormatError,
    },

    #[error("Error in {source_name}: {message}")]
    Conversion {
        source_name: String,
        key: String,
        message: String,
        source: ConversionError,
    },

    #[error("Error in {source_name}: {source}")]
    Arity {
        source_name: String,
        source: ArityViolation,
    },

    #[error("Error in the command line: {}", summarize(.0))]
    CommandLine(#[source] clap::Error),

    #[error("{0}")]
    HelpRequested(String),

    #[error("Invalid definition for choice '{key}': {reason}")]
    InvalidChoice { key: String, reason: String },

    #[error("Only one command-line source may be registered")]
    DuplicateCommandLine,

    #[error("Choice '{key}' describes command-line usage, but no command-line source is registered")]
    NoCommandLineSource { key: String },

    #[error("Unknown key '{key}' in {source_name}")]
    UnknownKey { key: String, source_name: String },

    #[error("Could not extract choices: {0}")]
    Extract(#[from] serde_json::Error),
}

/// Why a configuration file could not be turned into choices.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("{0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0}")]
    Xml(#[from] roxmltree::Error),

    #[error("{0}")]
    Toml(#[from] toml::de::Error),

    #[error("{0}")]
    Shape(String),
}

/// A positional-argument count that the command line's arglist binding rejects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArityViolation {
    #[error("No arguments are allowed.")]
    NoArgumentsAllowed,

    #[error(transparent)]
    Count(#[from] ArityMismatch),
}

/// First line of a clap error, without its `error: ` tag.
fn summarize(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).trim().to_string()
}
