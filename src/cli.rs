//! The command line as a source of choices.
//!
//! Parsing is delegated to [clap](https://docs.rs/clap), driven through its
//! runtime builder API since the options are only known once choices are
//! registered. [`bind`](Source::bind) collects each choice's
//! [`CommandLineUse`]; [`fill`](Source::fill) builds the `clap::Command`,
//! parses, and hands the leftover positional arguments to the
//! [`ArglistStrategy`].
//!
//! Parsing rules:
//!
//! - `--name VALUE` and `-n VALUE`; when an option repeats, the last one wins.
//! - Unambiguous prefixes of long names are accepted (`--conn` for
//!   `--connections`).
//! - Switches take `--name` for `"true"` and `--no-name` for `"false"`.
//! - `--` ends option parsing.
//! - `-h`, `-?` and `--help` ask for help; those spellings are reserved.
//! - Options and positional arguments may be interleaved, unless the source was
//!   created with [`posix`](CommandLineSource::posix): then the first positional
//!   argument ends option parsing.

use std::collections::BTreeMap;
use std::ffi::OsString;

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::arglist::ArglistStrategy;
use crate::choice::{Choice, CommandLineUse};
use crate::conversion::{ConversionError, ConversionTable};
use crate::error::ChoicesError;
use crate::source::{ErrorOverrides, RawChoices, Source, SourceKind};
use crate::value::Value;

const ARGLIST_ID: &str = "choicefig.arglist";
const HELP_ID: &str = "choicefig.help";
const HELP_LONG: &str = "help";
const HELP_SHORTS: [char; 2] = ['h', '?'];

#[derive(Debug, Clone, Default)]
pub struct CommandLineSource {
    args: Option<Vec<OsString>>,
    usage: Option<String>,
    posix: bool,
    declarations: Vec<(String, CommandLineUse)>,
    strategy: ArglistStrategy,
    raw: RawChoices,
}

impl CommandLineSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop option parsing at the first positional argument, so
    /// `prog file --verbose` treats `--verbose` as a second file.
    pub fn posix() -> Self {
        Self {
            posix: true,
            ..Self::default()
        }
    }

    /// Usage line shown in `--help`.
    pub fn usage(mut self, usage: &str) -> Self {
        self.usage = Some(usage.to_string());
        self
    }

    /// Parse these arguments instead of the process's. The first item is the
    /// program name.
    pub fn args<I, T>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        self.args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    pub fn strategy(&self) -> &ArglistStrategy {
        &self.strategy
    }

    fn command(&self) -> Command {
        let mut command = Command::new("program")
            .infer_long_args(true)
            .args_override_self(true)
            .disable_version_flag(true)
            .disable_help_flag(true)
            .arg(
                Arg::new(HELP_ID)
                    .long(HELP_LONG)
                    .short(HELP_SHORTS[0])
                    .short_alias(HELP_SHORTS[1])
                    .action(ArgAction::Help)
                    .help("Print help"),
            );
        if let Some(usage) = &self.usage {
            command = command.override_usage(usage.clone());
        }

        for (key, usage) in &self.declarations {
            match usage {
                CommandLineUse::Option(opt) => {
                    let mut arg = Arg::new(key.clone())
                        .long(opt.long.clone())
                        .action(ArgAction::Set)
                        .value_name(
                            opt.value_name
                                .clone()
                                .unwrap_or_else(|| key.to_uppercase()),
                        );
                    if let Some(short) = opt.short {
                        arg = arg.short(short);
                    }
                    if let Some(help) = &opt.help {
                        arg = arg.help(help.clone());
                    }
                    command = command.arg(arg);
                }
                CommandLineUse::Switch(opt) => {
                    let negated = negated_id(key);
                    let mut arg = Arg::new(key.clone())
                        .long(opt.long.clone())
                        .action(ArgAction::SetTrue)
                        .overrides_with(negated.clone());
                    if let Some(short) = opt.short {
                        arg = arg.short(short);
                    }
                    if let Some(help) = &opt.help {
                        arg = arg.help(help.clone());
                    }
                    command = command.arg(arg).arg(
                        Arg::new(negated)
                            .long(format!("no-{}", opt.long))
                            .action(ArgAction::SetTrue)
                            .overrides_with(key.clone())
                            .hide(true),
                    );
                }
                _ => {}
            }
        }

        let mut positional = Arg::new(ARGLIST_ID)
            .action(ArgAction::Append)
            .num_args(1..)
            .trailing_var_arg(self.posix);
        positional = match self.strategy.choice() {
            Some(key) => positional.value_name(key.to_uppercase()),
            None => positional.hide(true),
        };
        command.arg(positional)
    }

    fn record(&mut self, matches: &ArgMatches) {
        for (key, usage) in &self.declarations {
            match usage {
                CommandLineUse::Option(opt) => {
                    if let Some(value) = matches.get_one::<String>(key) {
                        self.raw
                            .insert(key, &opt.external_name(), Value::String(value.clone()));
                    }
                }
                CommandLineUse::Switch(opt) => {
                    let given = if given_on_command_line(matches, &negated_id(key)) {
                        Some("false")
                    } else if given_on_command_line(matches, key) {
                        Some("true")
                    } else {
                        None
                    };
                    if let Some(given) = given {
                        self.raw.insert(key, &opt.external_name(), Value::from(given));
                    }
                }
                _ => {}
            }
        }
    }

    /// Arity failures on the positional choice read as a bare sentence, without
    /// the external name in front.
    fn overrides(&self) -> ErrorOverrides {
        let mut overrides = ErrorOverrides::new();
        if let Some(key) = self.strategy.choice() {
            overrides.insert(key.to_string(), |err| match err {
                ConversionError::Arity(mismatch) => Some(mismatch.to_string()),
                _ => None,
            });
        }
        overrides
    }
}

impl Source for CommandLineSource {
    fn kind(&self) -> SourceKind {
        SourceKind::CommandLine
    }

    fn source_name(&self) -> String {
        "the command line".to_string()
    }

    fn raw(&self) -> &RawChoices {
        &self.raw
    }

    fn raw_mut(&mut self) -> &mut RawChoices {
        &mut self.raw
    }

    fn bind(&mut self, choices: &[Choice]) -> Result<(), ChoicesError> {
        self.declarations.clear();
        self.strategy = ArglistStrategy::NoArguments;

        for choice in choices {
            let Some(usage) = &choice.command_line else {
                continue;
            };
            if !usage.is_positional() {
                self.declarations.push((choice.key.clone(), usage.clone()));
                continue;
            }
            if let Some(taken) = self.strategy.choice() {
                return Err(ChoicesError::InvalidChoice {
                    key: choice.key.clone(),
                    reason: format!("the argument list already belongs to '{taken}'"),
                });
            }
            let single = !matches!(usage, CommandLineUse::Arglist);
            if single && choice.conversions.iter().any(|c| c.checks_length()) {
                return Err(ChoicesError::InvalidChoice {
                    key: choice.key.clone(),
                    reason: "Don't specify the length of an argument list when it's not treated as an array."
                        .to_string(),
                });
            }
            self.strategy = match usage {
                CommandLineUse::Arg => ArglistStrategy::OneRequired(choice.key.clone()),
                CommandLineUse::OptionalArg => ArglistStrategy::OneOptional(choice.key.clone()),
                _ => ArglistStrategy::ArbitraryList(choice.key.clone()),
            };
        }
        check_spellings(&self.declarations)
    }

    fn fill(&mut self) -> Result<(), ChoicesError> {
        let args = self
            .args
            .take()
            .unwrap_or_else(|| std::env::args_os().collect());
        let matches = self
            .command()
            .try_get_matches_from(args)
            .map_err(|err| match err.kind() {
                clap::error::ErrorKind::DisplayHelp
                | clap::error::ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                | clap::error::ErrorKind::DisplayVersion => {
                    ChoicesError::HelpRequested(err.to_string())
                }
                _ => ChoicesError::CommandLine(err),
            })?;

        self.record(&matches);

        let positional: Vec<String> = matches
            .get_many::<String>(ARGLIST_ID)
            .map(|values| values.cloned().collect())
            .unwrap_or_default();
        let source_name = self.source_name();
        self.strategy
            .update_from_arglist(positional, &mut self.raw)
            .map_err(|source| ChoicesError::Arity {
                source_name,
                source,
            })
    }

    fn apply(&mut self, conversions: &ConversionTable) -> Result<(), ChoicesError> {
        let name = self.source_name();
        let overrides = self.overrides();
        self.raw.apply(&name, conversions, &overrides)
    }

    fn adjust(
        &mut self,
        merged: &mut BTreeMap<String, Value>,
        conversions: &ConversionTable,
    ) -> Result<(), ChoicesError> {
        let key_conversions = self
            .strategy
            .choice()
            .and_then(|key| conversions.get(key))
            .map(Vec::as_slice)
            .unwrap_or_default();
        let name = self.source_name();
        let overrides = self.overrides();
        self.strategy.adapt_to_global_constraints(
            &mut self.raw,
            merged,
            key_conversions,
            &name,
            &overrides,
        )
    }
}

/// Every long and short spelling must belong to one option only, counting the
/// generated `--no-name` of each switch and the reserved help spellings.
fn check_spellings(declarations: &[(String, CommandLineUse)]) -> Result<(), ChoicesError> {
    let help = format!("--{HELP_LONG}");
    let mut longs = BTreeMap::from([(HELP_LONG.to_string(), help.clone())]);
    let mut shorts: BTreeMap<char, String> =
        HELP_SHORTS.iter().map(|c| (*c, help.clone())).collect();
    let mut ids: Vec<String> = vec![ARGLIST_ID.to_string(), HELP_ID.to_string()];

    for (key, usage) in declarations {
        let (CommandLineUse::Option(opt) | CommandLineUse::Switch(opt)) = usage else {
            continue;
        };
        let invalid = |reason: String| ChoicesError::InvalidChoice {
            key: key.clone(),
            reason,
        };
        if opt.long.is_empty() {
            return Err(invalid("an option needs a long name".to_string()));
        }

        let mut spellings = vec![opt.long.clone()];
        ids.push(key.clone());
        if matches!(usage, CommandLineUse::Switch(_)) {
            spellings.push(format!("no-{}", opt.long));
            ids.push(negated_id(key));
        }
        for long in spellings {
            if let Some(owner) = longs.insert(long.clone(), opt.external_name()) {
                return Err(invalid(format!("--{long} is already taken by {owner}")));
            }
        }
        if let Some(short) = opt.short {
            if short == '-' {
                return Err(invalid("'-' is not a usable short option".to_string()));
            }
            if let Some(owner) = shorts.insert(short, opt.external_name()) {
                return Err(invalid(format!("-{short} is already taken by {owner}")));
            }
        }
    }

    ids.sort();
    if let Some(pair) = ids.windows(2).find(|pair| pair[0] == pair[1]) {
        return Err(ChoicesError::InvalidChoice {
            key: pair[0].clone(),
            reason: "clashes with a name used internally by the command line".to_string(),
        });
    }
    Ok(())
}

fn negated_id(key: &str) -> String {
    format!("{key}.negated")
}

fn given_on_command_line(matches: &ArgMatches, id: &str) -> bool {
    matches.value_source(id) == Some(ValueSource::CommandLine)
}
