//! How the command line treats positional arguments.
//!
//! Whether "no positional arguments" is a mistake can't be decided while the
//! command line is parsed: a lower-priority source may still supply the choice.
//! So each strategy works in two passes.
//!
//! 1. [`update_from_arglist`](ArglistStrategy::update_from_arglist) runs right
//!    after parsing. It records a value only when the count is unambiguous, and
//!    rejects a wrong non-zero count on the spot.
//! 2. [`adapt_to_global_constraints`](ArglistStrategy::adapt_to_global_constraints)
//!    runs once every source is merged, and settles what an absent value means.

use std::collections::BTreeMap;

use crate::conversion::{Arity, ArityMismatch, Conversion};
use crate::error::{ArityViolation, ChoicesError};
use crate::source::{ErrorOverrides, RawChoices};
use crate::value::Value;

/// External name of whichever choice the positional arguments are bound to.
pub const ARGLIST: &str = "the argument list";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ArglistStrategy {
    /// Any positional argument is an error.
    #[default]
    NoArguments,
    /// Zero or more arguments, as a list. Zero defers to other sources, then
    /// becomes an empty list.
    ArbitraryList(String),
    /// Exactly one argument, unless another source supplies the choice.
    OneRequired(String),
    /// Zero or one argument.
    OneOptional(String),
}

impl ArglistStrategy {
    /// The choice the arguments are bound to.
    pub fn choice(&self) -> Option<&str> {
        match self {
            ArglistStrategy::NoArguments => None,
            ArglistStrategy::ArbitraryList(key)
            | ArglistStrategy::OneRequired(key)
            | ArglistStrategy::OneOptional(key) => Some(key),
        }
    }

    /// Argument count the single-argument strategies accept.
    pub fn arity(&self) -> Option<Arity> {
        match self {
            ArglistStrategy::OneRequired(_) => Some(Arity::Exactly(1)),
            ArglistStrategy::OneOptional(_) => Some(Arity::Between(0, 1)),
            _ => None,
        }
    }

    /// First pass: record what the positional arguments unambiguously say.
    pub fn update_from_arglist(
        &self,
        args: Vec<String>,
        raw: &mut RawChoices,
    ) -> Result<(), ArityViolation> {
        match self {
            ArglistStrategy::NoArguments if args.is_empty() => Ok(()),
            ArglistStrategy::NoArguments => Err(ArityViolation::NoArgumentsAllowed),
            ArglistStrategy::ArbitraryList(_) if args.is_empty() => Ok(()),
            ArglistStrategy::ArbitraryList(key) => {
                raw.insert(key, ARGLIST, Value::List(args));
                Ok(())
            }
            ArglistStrategy::OneRequired(key) | ArglistStrategy::OneOptional(key) => {
                let expected = self.arity().unwrap_or(Arity::Exactly(1));
                match <[String; 1]>::try_from(args) {
                    Ok([arg]) => {
                        raw.insert(key, ARGLIST, Value::String(arg));
                        Ok(())
                    }
                    // Another source may still supply it.
                    Err(args) if args.is_empty() => Ok(()),
                    Err(args) => Err(ArityMismatch::new(args.len(), expected).into()),
                }
            }
        }
    }

    /// Second pass, against the merged result of every source.
    pub fn adapt_to_global_constraints(
        &self,
        raw: &mut RawChoices,
        merged: &mut BTreeMap<String, Value>,
        conversions: &[Conversion],
        source_name: &str,
        overrides: &ErrorOverrides,
    ) -> Result<(), ChoicesError> {
        match self {
            ArglistStrategy::ArbitraryList(key) => {
                if raw.contains_key(key) || merged.contains_key(key) {
                    return Ok(());
                }
                raw.insert(key, ARGLIST, Value::List(Vec::new()));
                raw.apply_one(key, conversions, source_name, overrides)?;
                if let Some(value) = raw.get(key) {
                    merged.insert(key.clone(), value.clone());
                }
                Ok(())
            }
            ArglistStrategy::OneRequired(key) if !merged.contains_key(key) => {
                Err(ChoicesError::Arity {
                    source_name: source_name.to_string(),
                    source: ArityMismatch::new(0, Arity::Exactly(1)).into(),
                })
            }
            _ => Ok(()),
        }
    }
}
