//! Argument access and validation for function generators.

use crate::render::Strategy;
use crate::types::{Color, UnitKind, ValueChain};

/// Wrong argument count or type in a call to a known function.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ArgumentError {
    /// What was wrong with the arguments.
    pub message: String,
}

impl ArgumentError {
    /// Create an argument error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

type ArgResult<T> = std::result::Result<T, ArgumentError>;

/// A function call as seen by a generator.
#[derive(Debug, Clone, Copy)]
pub struct FunctionCall<'a> {
    /// The function name.
    pub name: &'a str,
    /// The resolved parameter chain, comma separators included.
    pub params: &'a ValueChain,
}

impl<'a> FunctionCall<'a> {
    /// Create a call view.
    pub fn new(name: &'a str, params: &'a ValueChain) -> Self {
        Self { name, params }
    }

    /// Split the parameters into arguments, checking the count is in
    /// `min..=max`.
    pub fn args(&self, min: usize, max: usize) -> ArgResult<Vec<ValueChain>> {
        let args = self.params.split_args();
        if args.len() < min || args.len() > max {
            let expected = if min == max {
                format!("{min}")
            } else {
                format!("{min} to {max}")
            };
            return Err(ArgumentError::new(format!(
                "expected {expected} argument{}, got {}",
                if max == 1 { "" } else { "s" },
                args.len()
            )));
        }
        Ok(args)
    }
}

/// The single unit of an argument.
pub(crate) fn single(arg: &ValueChain, position: usize) -> ArgResult<&UnitKind> {
    let mut units = arg.iter();
    match (units.next(), units.next()) {
        (Some(unit), None) => Ok(unit),
        (None, _) => Err(ArgumentError::new(format!("argument {position} is empty"))),
        (Some(_), Some(_)) => Err(ArgumentError::new(format!(
            "argument {position} must be a single value, got '{}'",
            Strategy::Diagnostic.render(arg)
        ))),
    }
}

/// A color argument. Named colors are accepted.
pub(crate) fn color(arg: &ValueChain, position: usize) -> ArgResult<Color> {
    match single(arg, position)? {
        UnitKind::Color(color) => Ok(*color),
        UnitKind::Ident(name) => Color::from_name(name).ok_or_else(|| not_a(position, "color", arg)),
        _ => Err(not_a(position, "color", arg)),
    }
}

/// A number argument with its optional unit.
pub(crate) fn number(arg: &ValueChain, position: usize) -> ArgResult<(f64, Option<String>)> {
    single(arg, position)?
        .as_number()
        .map(|(value, unit)| (value, unit.map(str::to_string)))
        .ok_or_else(|| not_a(position, "number", arg))
}

/// An amount in `0%..=100%`, returned as a fraction. Unitless numbers are
/// read as percentages.
pub(crate) fn amount(arg: &ValueChain, position: usize) -> ArgResult<f64> {
    let (value, unit) = number(arg, position)?;
    match unit.as_deref() {
        None | Some("%") => {}
        Some(other) => {
            return Err(ArgumentError::new(format!(
                "argument {position} must be a percentage, got unit '{other}'"
            )));
        }
    }
    if !(0.0..=100.0).contains(&value) {
        return Err(ArgumentError::new(format!(
            "argument {position} must be between 0% and 100%, got {}",
            Strategy::Diagnostic.render(arg)
        )));
    }
    Ok(value / 100.0)
}

/// A string argument, quoted or not. Returns the text and whether it was quoted.
pub(crate) fn string(arg: &ValueChain, position: usize) -> ArgResult<(String, bool)> {
    match single(arg, position)? {
        UnitKind::Str(text) => Ok((text.clone(), true)),
        UnitKind::Ident(text) => Ok((text.clone(), false)),
        _ => Err(not_a(position, "string", arg)),
    }
}

fn not_a(position: usize, kind: &str, arg: &ValueChain) -> ArgumentError {
    ArgumentError::new(format!(
        "argument {position} must be a {kind}, got '{}'",
        Strategy::Diagnostic.render(arg)
    ))
}
