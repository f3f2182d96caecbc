//! Value chains.
//!
//! A property value is represented as an ordered, singly linked chain of typed
//! units. Order is presentation order: `1px solid red` is three units, and the
//! parameters of a function call are a nested chain owned by that unit.
//!
//! # Example
//!
//! ```
//! use horizon_lattice_sass::prelude::*;
//!
//! let chain: ValueChain = [
//!     UnitKind::dimension(1.0, "px"),
//!     UnitKind::ident("solid"),
//!     UnitKind::variable("accent"),
//! ]
//! .into_iter()
//! .collect();
//!
//! assert_eq!(chain.len(), 3);
//! assert_eq!(Strategy::CANONICAL.render(&chain), "1px solid $accent");
//! ```

use super::Color;

/// An operator unit inside a value chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`, arithmetic division (see [`Separator::Slash`] for the literal form).
    Div,
    /// A `-` with a space before it and none after, as in `0 -$gap`. It
    /// negates the next operand instead of subtracting it.
    Neg,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
}

impl Operator {
    /// The source symbol for this operator.
    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub | Operator::Neg => '-',
            Operator::Mul => '*',
            Operator::Div => '/',
            Operator::LeftParen => '(',
            Operator::RightParen => ')',
        }
    }

    /// Whether this is a binary arithmetic operator (not a parenthesis).
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Operator::Add | Operator::Sub | Operator::Mul | Operator::Div
        )
    }
}

/// A separator unit inside a value chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Separator {
    /// `,` between list items or function arguments.
    Comma,
    /// A literal `/`, as in the `font` shorthand `12px/1.5`.
    Slash,
}

/// The typed payload of a single unit.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitKind {
    /// A unitless number.
    Number(f64),
    /// A number with a unit suffix (`px`, `em`, `%`, ...).
    Dimension { value: f64, unit: String },
    /// A quoted string, stored without its quotes.
    Str(String),
    /// An unquoted identifier or raw text.
    Ident(String),
    /// A color literal.
    Color(Color),
    /// A function call owning its parameter chain.
    Function { name: String, params: ValueChain },
    /// A `$variable` reference, stored without the `$`.
    Variable(String),
    /// An arithmetic operator or parenthesis.
    Operator(Operator),
    /// A list separator.
    Separator(Separator),
}

impl UnitKind {
    /// Create a unitless number.
    pub fn number(value: f64) -> Self {
        Self::Number(value)
    }

    /// Create a dimension. An empty unit yields a plain number.
    pub fn dimension(value: f64, unit: impl Into<String>) -> Self {
        let unit = unit.into();
        if unit.is_empty() {
            Self::Number(value)
        } else {
            Self::Dimension { value, unit }
        }
    }

    /// Create an identifier.
    pub fn ident(text: impl Into<String>) -> Self {
        Self::Ident(text.into())
    }

    /// Create a quoted string.
    pub fn string(text: impl Into<String>) -> Self {
        Self::Str(text.into())
    }

    /// Create a variable reference. A leading `$` is stripped.
    pub fn variable(name: impl Into<String>) -> Self {
        let name = name.into();
        let name = name.strip_prefix('$').unwrap_or(&name).to_string();
        Self::Variable(name)
    }

    /// Create a function call.
    pub fn function(name: impl Into<String>, params: ValueChain) -> Self {
        Self::Function {
            name: name.into(),
            params,
        }
    }

    /// Numeric value and unit, if this is a number or dimension.
    pub fn as_number(&self) -> Option<(f64, Option<&str>)> {
        match self {
            UnitKind::Number(value) => Some((*value, None)),
            UnitKind::Dimension { value, unit } => Some((*value, Some(unit.as_str()))),
            _ => None,
        }
    }

    /// Whether this unit is a number or dimension.
    pub fn is_numeric(&self) -> bool {
        self.as_number().is_some()
    }

    /// Whether this unit is the given operator.
    pub fn is_operator(&self, op: Operator) -> bool {
        matches!(self, UnitKind::Operator(o) if *o == op)
    }

    /// Whether this unit is a comma separator.
    pub fn is_comma(&self) -> bool {
        matches!(self, UnitKind::Separator(Separator::Comma))
    }
}

/// One node of a value chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueUnit {
    /// The unit's payload.
    pub kind: UnitKind,
    next: Option<Box<ValueUnit>>,
}

impl ValueUnit {
    /// The unit following this one, if any.
    pub fn next(&self) -> Option<&ValueUnit> {
        self.next.as_deref()
    }
}

/// An ordered, singly linked chain of value units.
///
/// Equality is structural: two chains are equal when their units are equal
/// element for element, including nested function parameters. Cloning a chain
/// deep-copies it, so no structure is ever shared between two owners.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValueChain {
    head: Option<Box<ValueUnit>>,
}

impl ValueChain {
    /// Create an empty chain (an omitted value).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a chain holding a single unit.
    pub fn single(kind: UnitKind) -> Self {
        Self {
            head: Some(Box::new(ValueUnit { kind, next: None })),
        }
    }

    /// The first unit, if any.
    pub fn head(&self) -> Option<&ValueUnit> {
        self.head.as_deref()
    }

    /// The kind of the first unit, if any.
    pub fn first(&self) -> Option<&UnitKind> {
        self.head().map(|unit| &unit.kind)
    }

    /// Whether the chain has no units.
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Number of top-level units.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Append a unit at the tail.
    pub fn push(&mut self, kind: UnitKind) {
        let mut cursor = &mut self.head;
        while let Some(unit) = cursor {
            cursor = &mut unit.next;
        }
        *cursor = Some(Box::new(ValueUnit { kind, next: None }));
    }

    /// Append every unit of `other` at the tail.
    pub fn append(&mut self, other: ValueChain) {
        let mut cursor = &mut self.head;
        while let Some(unit) = cursor {
            cursor = &mut unit.next;
        }
        *cursor = other.head;
    }

    /// Iterate over the top-level units in chain order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            next: self.head.as_deref(),
        }
    }

    /// Split at top-level commas, as for a function's argument list.
    ///
    /// An empty chain has no arguments.
    pub fn split_args(&self) -> Vec<ValueChain> {
        if self.is_empty() {
            return vec![];
        }

        let mut args = vec![];
        let mut current = vec![];
        for unit in self.iter() {
            if unit.is_comma() {
                args.push(current.drain(..).collect());
            } else {
                current.push(unit.clone());
            }
        }
        args.push(current.into_iter().collect());
        args
    }

    /// Names of all variables referenced anywhere in the chain, nested
    /// parameters included, in chain order.
    pub fn variable_names(&self) -> Vec<String> {
        let mut names = vec![];
        collect_variable_names(self, &mut names);
        names
    }

    /// Whether `name` is referenced anywhere in the chain.
    pub fn contains_variable(&self, name: &str) -> bool {
        self.iter().any(|unit| match unit {
            UnitKind::Variable(var) => var == name,
            UnitKind::Function { params, .. } => params.contains_variable(name),
            _ => false,
        })
    }
}

fn collect_variable_names(chain: &ValueChain, names: &mut Vec<String>) {
    for unit in chain.iter() {
        match unit {
            UnitKind::Variable(name) => names.push(name.clone()),
            UnitKind::Function { params, .. } => collect_variable_names(params, names),
            _ => {}
        }
    }
}

impl FromIterator<UnitKind> for ValueChain {
    fn from_iter<I: IntoIterator<Item = UnitKind>>(iter: I) -> Self {
        let units: Vec<UnitKind> = iter.into_iter().collect();
        let mut head = None;
        for kind in units.into_iter().rev() {
            head = Some(Box::new(ValueUnit { kind, next: head }));
        }
        Self { head }
    }
}

impl From<UnitKind> for ValueChain {
    fn from(kind: UnitKind) -> Self {
        Self::single(kind)
    }
}

/// Borrowing iterator over a chain.
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    next: Option<&'a ValueUnit>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a UnitKind;

    fn next(&mut self) -> Option<Self::Item> {
        self.next.map(|unit| {
            self.next = unit.next.as_deref();
            &unit.kind
        })
    }
}

impl<'a> IntoIterator for &'a ValueChain {
    type Item = &'a UnitKind;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Owning iterator over a chain.
#[derive(Debug)]
pub struct IntoIter {
    next: Option<Box<ValueUnit>>,
}

impl Iterator for IntoIter {
    type Item = UnitKind;

    fn next(&mut self) -> Option<Self::Item> {
        self.next.take().map(|unit| {
            let ValueUnit { kind, next } = *unit;
            self.next = next;
            kind
        })
    }
}

impl IntoIterator for ValueChain {
    type Item = UnitKind;
    type IntoIter = IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { next: self.head }
    }
}

/// Widen a tokenizer `f32` to `f64` through its shortest decimal form, so
/// `0.3` stays `0.3` instead of picking up binary noise.
pub(crate) fn widen(value: f32) -> f64 {
    value.to_string().parse().unwrap_or(value as f64)
}
