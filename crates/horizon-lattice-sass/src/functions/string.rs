//! String functions: `quote`, `unquote`, `to-upper-case`, `to-lower-case`,
//! `str-length`.

use super::args::{self, ArgumentError, FunctionCall};
use super::{FunctionGenerator, Generated};
use crate::render::Strategy;
use crate::types::{UnitKind, ValueChain};

fn string_value(text: String, quoted: bool) -> Generated {
    let unit = if quoted {
        UnitKind::Str(text)
    } else {
        UnitKind::Ident(text)
    };
    Generated::Value(ValueChain::single(unit))
}

/// `quote($string)`
#[derive(Debug, Clone, Copy, Default)]
pub struct Quote;

impl FunctionGenerator for Quote {
    fn name(&self) -> &'static str {
        "quote"
    }

    fn apply(&self, call: &FunctionCall<'_>, _strategy: Strategy) -> Result<Generated, ArgumentError> {
        let args = call.args(1, 1)?;
        let (text, _) = args::string(&args[0], 1)?;
        Ok(string_value(text, true))
    }
}

/// `unquote($string)`: the argument rendered bare.
///
/// Unlike the other string functions this accepts any value and emits it as
/// text, so `unquote("")` yields an empty value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unquote;

impl FunctionGenerator for Unquote {
    fn name(&self) -> &'static str {
        "unquote"
    }

    fn apply(&self, call: &FunctionCall<'_>, strategy: Strategy) -> Result<Generated, ArgumentError> {
        let args = call.args(1, 1)?;
        Ok(Generated::Text(strategy.render_unquoted(&args[0])))
    }
}

/// `to-upper-case($string)`
#[derive(Debug, Clone, Copy, Default)]
pub struct ToUpperCase;

impl FunctionGenerator for ToUpperCase {
    fn name(&self) -> &'static str {
        "to-upper-case"
    }

    fn apply(&self, call: &FunctionCall<'_>, _strategy: Strategy) -> Result<Generated, ArgumentError> {
        let args = call.args(1, 1)?;
        let (text, quoted) = args::string(&args[0], 1)?;
        Ok(string_value(text.to_ascii_uppercase(), quoted))
    }
}

/// `to-lower-case($string)`
#[derive(Debug, Clone, Copy, Default)]
pub struct ToLowerCase;

impl FunctionGenerator for ToLowerCase {
    fn name(&self) -> &'static str {
        "to-lower-case"
    }

    fn apply(&self, call: &FunctionCall<'_>, _strategy: Strategy) -> Result<Generated, ArgumentError> {
        let args = call.args(1, 1)?;
        let (text, quoted) = args::string(&args[0], 1)?;
        Ok(string_value(text.to_ascii_lowercase(), quoted))
    }
}

/// `str-length($string)`: length in characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrLength;

impl FunctionGenerator for StrLength {
    fn name(&self) -> &'static str {
        "str-length"
    }

    fn apply(&self, call: &FunctionCall<'_>, _strategy: Strategy) -> Result<Generated, ArgumentError> {
        let args = call.args(1, 1)?;
        let (text, _) = args::string(&args[0], 1)?;
        Ok(Generated::Value(ValueChain::single(UnitKind::Number(
            text.chars().count() as f64,
        ))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(generator: &dyn FunctionGenerator, unit: UnitKind) -> Result<Generated, ArgumentError> {
        let params = ValueChain::single(unit);
        generator.apply(&FunctionCall::new(generator.name(), &params), Strategy::CANONICAL)
    }

    #[test]
    fn quote_and_unquote() {
        assert_eq!(
            apply(&Quote, UnitKind::ident("Helvetica")).unwrap(),
            string_value("Helvetica".into(), true)
        );
        assert_eq!(
            apply(&Unquote, UnitKind::string("a b")).unwrap(),
            Generated::Text("a b".into())
        );
        assert_eq!(
            apply(&Unquote, UnitKind::string("")).unwrap(),
            Generated::Text(String::new())
        );
    }

    #[test]
    fn case_conversion_keeps_quoting() {
        assert_eq!(
            apply(&ToUpperCase, UnitKind::string("bold")).unwrap(),
            string_value("BOLD".into(), true)
        );
        assert_eq!(
            apply(&ToLowerCase, UnitKind::ident("SOLID")).unwrap(),
            string_value("solid".into(), false)
        );
    }

    #[test]
    fn str_length_counts_chars() {
        assert_eq!(
            apply(&StrLength, UnitKind::string("héllo")).unwrap(),
            Generated::Value(ValueChain::single(UnitKind::Number(5.0)))
        );
        assert!(apply(&StrLength, UnitKind::Number(3.0)).is_err());
    }
}
