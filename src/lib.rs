//! Resolve a program's choices from the command line, the environment,
//! configuration files and defaults, declared once.
//!
//! A *choice* is one named setting the program needs, whatever supplies it.
//! Choicefig validates each value against the source it came from, then merges
//! all sources by precedence into one ordered map.
//!
//! ```ignore
//! let choices = Choicefig::builder()
//!     .source(CommandLineSource::new())
//!     .source(EnvironmentSource::with_prefix("myprog_"))
//!     .source(FileSource::yaml(".myprog-config.yml"))
//!     .choice(Choice::new("connections").integer().default("0")
//!         .option(CliOption::long("connections").short('c')))
//!     .choice(Choice::new("files").arglist())
//!     .resolve()?;
//! ```
//!
//! That call parses `--connections`, reads `myprog_connections` from the
//! environment and `connections` from `~/.myprog-config.yml`, and falls back to
//! `0`. Any positional arguments become `files`.
//!
//! # Precedence
//!
//! ```text
//! Command line          --connections 5
//!        ↓ overrides
//! Environment           myprog_connections=9
//!        ↓ overrides
//! Configuration file    connections: 19
//!        ↓ overrides
//! Defaults              Choice::default("0")
//! ```
//!
//! Precedence is registration order: the source registered first wins. The
//! builder does not reorder sources; registering them out of the usual order
//! is allowed but logged with a warning.
//!
//! Every source is **sparse**. A source that lacks a key leaves it to the
//! sources below. Keys that no choice was registered for are dropped.
//!
//! # Conversions
//!
//! Sources produce strings and lists of strings. Each [`Choice`] lists
//! conversions ([`Conversion`]) that run in order over each source's own
//! value, so a bad value is reported against the source that supplied it:
//!
//! ```text
//! Error in the environment: myprog_connections's value must be an integer, and 'hi' doesn't look right.
//! ```
//!
//! | Conversion | Accepts | Produces |
//! |------------|---------|----------|
//! | `integer()` | decimal digits | [`Value::Integer`] |
//! | `boolean()` | `true`/`false`, any case | [`Value::Boolean`] |
//! | `string_list()` | `a,b,c` | [`Value::List`] |
//! | `one_of([..])` | listed values only | unchanged |
//! | `length(n)` | lists of `n`, `a..=b` or `a..b` elements | unchanged |
//!
//! List strings split on every comma. There is no escaping.
//!
//! # Positional arguments
//!
//! At most one choice takes the command line's positional arguments, through
//! [`arglist`](Choice::arglist), [`arg`](Choice::arg) or
//! [`optional_arg`](Choice::optional_arg). No arguments on the command line
//! never decides the matter on its own: the other sources are consulted first.
//! Only once everything is merged does an `arglist` choice become an empty
//! list, or an `arg` choice fail with `0 arguments given, 1 expected.`
//!
//! A wrong non-zero count fails right away:
//!
//! ```text
//! Error in the command line: 5 arguments given, 2 to 4 expected.
//! ```
//!
//! # Sources
//!
//! - [`CommandLineSource`]: options, `--name`/`--no-name` switches and
//!   positional arguments, parsed with clap.
//! - [`EnvironmentSource`]: variables starting with a prefix, plus named
//!   extras.
//! - [`FileSource`]: YAML, XML or TOML, found by [`SearchPath`]. A missing file
//!   is an empty source; a malformed one is fatal:
//!   `Badly formatted configuration file /home/me/.myprog-config.yml: ...`.
//! - The defaults, built from the registered choices.
//!
//! Any type implementing [`Source`] can be registered too.
//!
//! # Strict mode
//!
//! Off by default. With [`.strict(true)`](ChoicefigBuilder::strict), a key in a
//! configuration file that names no registered choice fails resolution instead
//! of being ignored.
//!
//! # Error handling
//!
//! Every fallible operation returns [`ChoicesError`]. Messages are single
//! lines meant for the user; printing them and choosing an exit code is the
//! caller's business. `--help` comes back as
//! [`ChoicesError::HelpRequested`] holding the rendered help.
//!
//! # Logging
//!
//! Choicefig emits [`tracing`](https://docs.rs/tracing) events (`debug` per
//! resolution phase, `warn` for unreadable files and unusual source order) and
//! never installs a subscriber.

pub mod error;
pub mod types;

mod arglist;
mod builder;
mod choice;
mod choices;
mod cli;
mod conversion;
mod defaults;
mod env;
mod file;
mod flatten;
mod merge;
mod resolve;
mod source;
mod value;

#[cfg(test)]
mod fixtures;

pub use arglist::ArglistStrategy;
pub use builder::{Choicefig, ChoicefigBuilder};
pub use choice::{Choice, CliOption, CommandLineUse};
pub use choices::Choices;
pub use cli::CommandLineSource;
pub use conversion::{Arity, ArityMismatch, Conversion, ConversionError, ConversionTable};
pub use defaults::DefaultSource;
pub use env::EnvironmentSource;
pub use error::{ArityViolation, ChoicesError, FormatError};
pub use file::FileSource;
pub use source::{ErrorOverrides, MessageOverride, RawChoices, Source, SourceKind};
pub use types::{FileFormat, SearchPath};
pub use value::Value;
