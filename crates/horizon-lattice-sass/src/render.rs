//! Serialization strategies for value chains.
//!
//! Everything that turns a value into text goes through [`Strategy`]. The
//! canonical strategy produces CSS; the diagnostic strategy produces text for
//! logs and error messages and keeps full numeric precision.

use std::fmt::Write;

use crate::types::{Color, Operator, Separator, UnitKind, ValueChain};

/// Default number of decimal places kept by canonical output.
pub const DEFAULT_PRECISION: u8 = 5;

/// How a value chain is rendered to text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Valid CSS. Numbers are rounded to `precision` decimal places.
    Canonical {
        /// Decimal places kept for numbers.
        precision: u8,
    },
    /// Human-readable output for logs and errors, numbers unrounded.
    Diagnostic,
}

impl Default for Strategy {
    fn default() -> Self {
        Self::CANONICAL
    }
}

impl Strategy {
    /// Canonical CSS output with the default precision.
    pub const CANONICAL: Self = Self::Canonical {
        precision: DEFAULT_PRECISION,
    };

    /// Canonical CSS output with a custom precision.
    pub fn canonical(precision: u8) -> Self {
        Self::Canonical { precision }
    }

    /// Whether this is the diagnostic strategy.
    pub fn is_diagnostic(self) -> bool {
        matches!(self, Strategy::Diagnostic)
    }

    /// Render a chain.
    pub fn render(self, chain: &ValueChain) -> String {
        let mut out = String::new();
        self.write_chain(&mut out, chain, true);
        out
    }

    /// Render a chain with quoted strings written bare.
    pub fn render_unquoted(self, chain: &ValueChain) -> String {
        let mut out = String::new();
        self.write_chain(&mut out, chain, false);
        out
    }

    /// Render a single unit.
    pub fn render_unit(self, unit: &UnitKind) -> String {
        let mut out = String::new();
        self.write_unit(&mut out, unit, true);
        out
    }

    /// Render a number the way this strategy renders numeric units.
    pub fn format_number(self, value: f64) -> String {
        match self {
            Strategy::Canonical { precision } => round_to_precision(value, precision),
            Strategy::Diagnostic => {
                if value == 0.0 {
                    "0".to_string()
                } else {
                    format!("{value}")
                }
            }
        }
    }

    fn write_chain(self, out: &mut String, chain: &ValueChain, quoted: bool) {
        let mut prev: Option<&UnitKind> = None;
        for unit in chain.iter() {
            if let Some(prev) = prev
                && needs_space(prev, unit)
            {
                out.push(' ');
            }
            self.write_unit(out, unit, quoted);
            prev = Some(unit);
        }
    }

    fn write_unit(self, out: &mut String, unit: &UnitKind, quoted: bool) {
        match unit {
            UnitKind::Number(value) => out.push_str(&self.format_number(*value)),
            UnitKind::Dimension { value, unit } => {
                out.push_str(&self.format_number(*value));
                out.push_str(unit);
            }
            UnitKind::Str(text) if quoted => {
                out.push('"');
                for c in text.chars() {
                    if c == '"' || c == '\\' {
                        out.push('\\');
                    }
                    out.push(c);
                }
                out.push('"');
            }
            UnitKind::Str(text) | UnitKind::Ident(text) => out.push_str(text),
            UnitKind::Color(color) => self.write_color(out, color),
            UnitKind::Function { name, params } => {
                out.push_str(name);
                out.push('(');
                self.write_chain(out, params, quoted);
                out.push(')');
            }
            UnitKind::Variable(name) => {
                out.push('$');
                out.push_str(name);
            }
            UnitKind::Operator(op) => out.push(op.symbol()),
            UnitKind::Separator(Separator::Comma) => out.push(','),
            UnitKind::Separator(Separator::Slash) => out.push('/'),
        }
    }

    fn write_color(self, out: &mut String, color: &Color) {
        if color.is_opaque() {
            out.push_str(&color.to_hex());
        } else {
            let _ = write!(
                out,
                "rgba({}, {}, {}, {})",
                color.r,
                color.g,
                color.b,
                self.format_number(color.alpha)
            );
        }
    }
}

/// Spacing between two adjacent units.
fn needs_space(prev: &UnitKind, next: &UnitKind) -> bool {
    use UnitKind::{Operator as Op, Separator as Sep};

    match (prev, next) {
        (_, Sep(Separator::Comma)) => false,
        (Sep(Separator::Slash), _) | (_, Sep(Separator::Slash)) => false,
        (Op(Operator::Div), _) | (_, Op(Operator::Div)) => false,
        (Op(Operator::LeftParen), _) | (_, Op(Operator::RightParen)) => false,
        (Op(Operator::Neg), _) => false,
        _ => true,
    }
}

fn round_to_precision(value: f64, precision: u8) -> String {
    let factor = 10f64.powi(precision as i32);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 {
        return "0".to_string();
    }

    let mut text = format!("{:.*}", precision as usize, rounded);
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(units: impl IntoIterator<Item = UnitKind>) -> ValueChain {
        units.into_iter().collect()
    }

    #[test]
    fn spaces_between_units() {
        let value = chain([
            UnitKind::dimension(1.0, "px"),
            UnitKind::ident("solid"),
            UnitKind::Color(Color::rgb(255, 0, 0)),
        ]);
        assert_eq!(Strategy::CANONICAL.render(&value), "1px solid #ff0000");
    }

    #[test]
    fn commas_and_slashes() {
        let value = chain([
            UnitKind::dimension(12.0, "px"),
            UnitKind::Separator(Separator::Slash),
            UnitKind::Number(1.5),
            UnitKind::ident("Arial"),
            UnitKind::Separator(Separator::Comma),
            UnitKind::ident("sans-serif"),
        ]);
        assert_eq!(
            Strategy::CANONICAL.render(&value),
            "12px/1.5 Arial, sans-serif"
        );
    }

    #[test]
    fn operators_and_parentheses() {
        let value = chain([
            UnitKind::Operator(Operator::LeftParen),
            UnitKind::variable("a"),
            UnitKind::Operator(Operator::Add),
            UnitKind::Number(2.0),
            UnitKind::Operator(Operator::RightParen),
            UnitKind::Operator(Operator::Mul),
            UnitKind::variable("b"),
            UnitKind::Operator(Operator::Div),
            UnitKind::Number(4.0),
        ]);
        assert_eq!(Strategy::Diagnostic.render(&value), "($a + 2) * $b/4");
    }

    #[test]
    fn functions_render_params() {
        let params = chain([
            UnitKind::variable("c"),
            UnitKind::Separator(Separator::Comma),
            UnitKind::dimension(10.0, "%"),
        ]);
        let value = chain([UnitKind::function("lighten", params)]);
        assert_eq!(Strategy::CANONICAL.render(&value), "lighten($c, 10%)");
    }

    #[test]
    fn canonical_rounds_diagnostic_does_not() {
        let value = chain([UnitKind::dimension(1.0 / 3.0, "em")]);
        assert_eq!(Strategy::CANONICAL.render(&value), "0.33333em");
        assert_eq!(Strategy::canonical(2).render(&value), "0.33em");
        assert_eq!(
            Strategy::Diagnostic.render(&value),
            format!("{}em", 1.0 / 3.0)
        );
    }

    #[test]
    fn number_formatting() {
        assert_eq!(Strategy::CANONICAL.format_number(5.0), "5");
        assert_eq!(Strategy::CANONICAL.format_number(-0.000001), "0");
        assert_eq!(Strategy::CANONICAL.format_number(2.50), "2.5");
        assert_eq!(Strategy::CANONICAL.format_number(-1.25), "-1.25");
    }

    #[test]
    fn strings_quoted_and_unquoted() {
        let value = chain([UnitKind::string("say \"hi\"")]);
        assert_eq!(Strategy::CANONICAL.render(&value), r#""say \"hi\"""#);
        assert_eq!(Strategy::CANONICAL.render_unquoted(&value), r#"say "hi""#);
    }

    #[test]
    fn translucent_colors() {
        let value = chain([UnitKind::Color(Color::rgba(0, 0, 0, 0.5))]);
        assert_eq!(Strategy::CANONICAL.render(&value), "rgba(0, 0, 0, 0.5)");
    }

    #[test]
    fn empty_chain_renders_empty() {
        assert_eq!(Strategy::CANONICAL.render(&ValueChain::new()), "");
    }
}
