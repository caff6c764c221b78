use crate::conversion::{Arity, Conversion};
use crate::value::Value;

/// One named choice: its default, its conversions, and how the command line
/// supplies it.
///
/// ```ignore
/// Choice::new("connections")
///     .integer()
///     .default("0")
///     .option(CliOption::long("connections").short('c').value_name("COUNT"))
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub(crate) key: String,
    pub(crate) default: Option<Value>,
    pub(crate) conversions: Vec<Conversion>,
    pub(crate) command_line: Option<CommandLineUse>,
}

impl Choice {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            default: None,
            conversions: Vec::new(),
            command_line: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Default as a raw string. It goes through the same conversions as any
    /// other source's value.
    pub fn default(mut self, raw: &str) -> Self {
        self.default = Some(Value::String(raw.to_string()));
        self
    }

    pub fn default_list<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default = Some(Value::List(items.into_iter().map(Into::into).collect()));
        self
    }

    pub fn integer(self) -> Self {
        self.convert(Conversion::Integer)
    }

    pub fn boolean(self) -> Self {
        self.convert(Conversion::Boolean)
    }

    pub fn string_list(self) -> Self {
        self.convert(Conversion::StringList)
    }

    pub fn one_of<I, S>(self, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.convert(Conversion::OneOf(allowed.into_iter().map(Into::into).collect()))
    }

    /// Require a list of `arity` elements: `2`, `1..=2`, or `2..5`.
    pub fn length(self, arity: impl Into<Arity>) -> Self {
        self.convert(Conversion::Length(arity.into()))
    }

    /// Append any conversion. Conversions run in the order they were added.
    pub fn convert(mut self, conversion: Conversion) -> Self {
        self.conversions.push(conversion);
        self
    }

    /// `--name VALUE` on the command line.
    pub fn option(self, option: CliOption) -> Self {
        self.on_command_line(CommandLineUse::Option(option))
    }

    /// `--name` gives `"true"`, `--no-name` gives `"false"`.
    pub fn switch(self, option: CliOption) -> Self {
        self.on_command_line(CommandLineUse::Switch(option))
    }

    /// Every positional argument, as a list. Zero arguments leaves the choice to
    /// lower-priority sources and, failing those, an empty list.
    pub fn arglist(self) -> Self {
        self.on_command_line(CommandLineUse::Arglist)
    }

    /// Exactly one positional argument, unless another source supplies it.
    pub fn arg(self) -> Self {
        self.on_command_line(CommandLineUse::Arg)
    }

    /// Zero or one positional argument.
    pub fn optional_arg(self) -> Self {
        self.on_command_line(CommandLineUse::OptionalArg)
    }

    fn on_command_line(mut self, usage: CommandLineUse) -> Self {
        self.command_line = Some(usage);
        self
    }
}

/// How a choice appears on the command line.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandLineUse {
    Option(CliOption),
    Switch(CliOption),
    Arglist,
    Arg,
    OptionalArg,
}

impl CommandLineUse {
    pub fn is_positional(&self) -> bool {
        matches!(
            self,
            CommandLineUse::Arglist | CommandLineUse::Arg | CommandLineUse::OptionalArg
        )
    }
}

/// Spelling of an option or switch.
#[derive(Debug, Clone, PartialEq)]
pub struct CliOption {
    pub(crate) long: String,
    pub(crate) short: Option<char>,
    pub(crate) value_name: Option<String>,
    pub(crate) help: Option<String>,
}

impl CliOption {
    /// `long` is given without dashes: `CliOption::long("connections")`.
    pub fn long(long: &str) -> Self {
        Self {
            long: long.trim_start_matches('-').to_string(),
            short: None,
            value_name: None,
            help: None,
        }
    }

    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    pub fn value_name(mut self, name: &str) -> Self {
        self.value_name = Some(name.to_string());
        self
    }

    pub fn help(mut self, help: &str) -> Self {
        self.help = Some(help.to_string());
        self
    }

    /// Name used in error messages: `--connections`.
    pub fn external_name(&self) -> String {
        format!("--{}", self.long)
    }
}
