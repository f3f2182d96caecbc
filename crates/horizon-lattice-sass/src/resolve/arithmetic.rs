//! Arithmetic in property values.
//!
//! Detection and reduction are separate steps. [`classify_division`] and
//! [`contains_arithmetic`] are cheap structural scans that must run before
//! variables are substituted, because only then can a `/` next to a variable
//! be told apart from the literal `/` of `font: 12px/1.5`. [`evaluate`] is the
//! reducer proper and runs on the substituted chain.

use crate::render::Strategy;
use crate::types::{Operator, Separator, UnitKind, ValueChain};

/// Incompatible operands, a missing operand, or division by zero.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ArithmeticError {
    /// The operator being applied when the error occurred.
    pub operator: Option<Operator>,
    /// What went wrong.
    pub message: String,
}

impl ArithmeticError {
    fn new(operator: Option<Operator>, message: impl Into<String>) -> Self {
        Self {
            operator,
            message: message.into(),
        }
    }
}

type ArithResult<T> = std::result::Result<T, ArithmeticError>;

/// Turn every `/` that is not division into a literal [`Separator::Slash`].
///
/// A `/` is division when a neighbour is a variable reference or a
/// parenthesis, or when its comma-separated segment holds another arithmetic
/// operator. Function parameters are classified too.
pub fn classify_division(chain: &ValueChain) -> ValueChain {
    let units: Vec<&UnitKind> = chain.iter().collect();

    units
        .iter()
        .enumerate()
        .map(|(index, unit)| match unit {
            UnitKind::Operator(Operator::Div) if !is_division(&units, index) => {
                UnitKind::Separator(Separator::Slash)
            }
            UnitKind::Function { name, params } => UnitKind::Function {
                name: name.clone(),
                params: classify_division(params),
            },
            other => (*other).clone(),
        })
        .collect()
}

fn is_division(units: &[&UnitKind], index: usize) -> bool {
    let prev = index.checked_sub(1).and_then(|i| units.get(i));
    let next = units.get(index + 1);

    let variable_operand = matches!(prev, Some(UnitKind::Variable(_)))
        || matches!(next, Some(UnitKind::Variable(_)));
    let grouped = prev.is_some_and(|u| u.is_operator(Operator::RightParen))
        || next.is_some_and(|u| u.is_operator(Operator::LeftParen));

    variable_operand || grouped || segment_has_operators(units, index)
}

/// Whether the comma-separated segment around `index` holds an operator other
/// than `/`.
fn segment_has_operators(units: &[&UnitKind], index: usize) -> bool {
    let start = units[..index]
        .iter()
        .rposition(|u| u.is_comma())
        .map_or(0, |p| p + 1);
    let end = units[index..]
        .iter()
        .position(|u| u.is_comma())
        .map_or(units.len(), |p| index + p);

    units[start..end]
        .iter()
        .any(|u| matches!(u, UnitKind::Operator(op) if *op != Operator::Div))
}

/// Whether the top level of a classified chain needs evaluation.
pub fn contains_arithmetic(chain: &ValueChain) -> bool {
    chain.iter().any(|unit| matches!(unit, UnitKind::Operator(_)))
}

/// Reduce every arithmetic run in the chain to a single number or dimension.
///
/// `*` and `/` bind tighter than `+` and `-`; operators of equal precedence
/// associate left; parentheses group. Units outside any run are kept as they
/// are, so `1px + 1px solid red` becomes `2px solid red`. A chain that still
/// holds variable references is returned unchanged.
pub fn evaluate(chain: &ValueChain) -> ArithResult<ValueChain> {
    if chain.iter().any(|unit| matches!(unit, UnitKind::Variable(_))) {
        return Ok(chain.clone());
    }

    let units: Vec<&UnitKind> = chain.iter().collect();
    let mut out = Vec::with_capacity(units.len());
    let mut pos = 0;

    while pos < units.len() {
        if starts_operand(&units, pos) {
            let mut cursor = Cursor {
                units: &units,
                pos,
                operator: None,
            };
            let value = cursor.expression()?;
            if cursor.pos - pos == 1 {
                out.push(units[pos].clone());
            } else {
                out.push(value.into_unit());
            }
            pos = cursor.pos;
            continue;
        }

        match units[pos] {
            // Negation of something that is not a number stays as written.
            UnitKind::Operator(Operator::Neg) => out.push(units[pos].clone()),
            UnitKind::Operator(op) if *op != Operator::LeftParen => {
                return Err(ArithmeticError::new(
                    Some(*op),
                    format!("missing left operand for '{}'", op.symbol()),
                ));
            }
            unit => {
                if let Some(UnitKind::Operator(op)) = units.get(pos + 1)
                    && op.is_arithmetic()
                {
                    return Err(not_a_number(Some(*op), unit));
                }
                out.push(unit.clone());
            }
        }
        pos += 1;
    }

    Ok(out.into_iter().collect())
}

/// Whether an arithmetic operand (possibly negated or parenthesised) starts at `pos`.
fn starts_operand(units: &[&UnitKind], pos: usize) -> bool {
    match units.get(pos) {
        Some(UnitKind::Number(_)) | Some(UnitKind::Dimension { .. }) => true,
        Some(UnitKind::Operator(Operator::LeftParen)) => true,
        Some(UnitKind::Operator(Operator::Sub | Operator::Neg)) => starts_operand(units, pos + 1),
        _ => false,
    }
}

fn not_a_number(operator: Option<Operator>, unit: &UnitKind) -> ArithmeticError {
    ArithmeticError::new(
        operator,
        format!("'{}' is not a number", Strategy::Diagnostic.render_unit(unit)),
    )
}

/// Recursive-descent reducer over a slice of units.
struct Cursor<'a> {
    units: &'a [&'a UnitKind],
    pos: usize,
    /// Last operator consumed, for error context.
    operator: Option<Operator>,
}

impl Cursor<'_> {
    fn peek_operator(&self) -> Option<Operator> {
        match self.units.get(self.pos) {
            Some(UnitKind::Operator(op)) => Some(*op),
            _ => None,
        }
    }

    fn expression(&mut self) -> ArithResult<Numeric> {
        let mut lhs = self.term()?;
        while let Some(op @ (Operator::Add | Operator::Sub)) = self.peek_operator() {
            self.pos += 1;
            self.operator = Some(op);
            let rhs = self.term()?;
            lhs = lhs.apply(op, rhs)?;
        }
        Ok(lhs)
    }

    fn term(&mut self) -> ArithResult<Numeric> {
        let mut lhs = self.factor()?;
        while let Some(op @ (Operator::Mul | Operator::Div)) = self.peek_operator() {
            self.pos += 1;
            self.operator = Some(op);
            let rhs = self.factor()?;
            lhs = lhs.apply(op, rhs)?;
        }
        Ok(lhs)
    }

    fn factor(&mut self) -> ArithResult<Numeric> {
        let Some(unit) = self.units.get(self.pos) else {
            return Err(ArithmeticError::new(self.operator, "missing right operand"));
        };

        match unit {
            UnitKind::Number(value) => {
                self.pos += 1;
                Ok(Numeric::new(*value, None))
            }
            UnitKind::Dimension { value, unit } => {
                self.pos += 1;
                Ok(Numeric::new(*value, Some(unit.clone())))
            }
            UnitKind::Operator(op @ (Operator::Sub | Operator::Neg)) => {
                self.pos += 1;
                self.operator = Some(*op);
                let inner = self.factor()?;
                Ok(Numeric::new(-inner.value, inner.unit))
            }
            UnitKind::Operator(Operator::LeftParen) => {
                self.pos += 1;
                let inner = self.expression()?;
                if self.peek_operator() != Some(Operator::RightParen) {
                    return Err(ArithmeticError::new(
                        Some(Operator::LeftParen),
                        "unbalanced parentheses",
                    ));
                }
                self.pos += 1;
                Ok(inner)
            }
            UnitKind::Operator(op) => Err(ArithmeticError::new(
                Some(*op),
                format!("unexpected '{}'", op.symbol()),
            )),
            other => Err(not_a_number(self.operator, other)),
        }
    }
}

/// A number with an optional unit, the value type of the reducer.
#[derive(Debug, Clone, PartialEq)]
struct Numeric {
    value: f64,
    unit: Option<String>,
}

impl Numeric {
    fn new(value: f64, unit: Option<String>) -> Self {
        Self { value, unit }
    }

    fn into_unit(self) -> UnitKind {
        UnitKind::dimension(self.value, self.unit.unwrap_or_default())
    }

    fn apply(self, op: Operator, rhs: Numeric) -> ArithResult<Numeric> {
        let unit = match (op, self.unit, rhs.unit) {
            (Operator::Add | Operator::Sub, l, r) => match (l, r) {
                (Some(l), Some(r)) if !l.eq_ignore_ascii_case(&r) => {
                    return Err(ArithmeticError::new(
                        Some(op),
                        format!("incompatible units '{l}' and '{r}'"),
                    ));
                }
                (l, r) => l.or(r),
            },
            (Operator::Mul, Some(l), Some(r)) => {
                return Err(ArithmeticError::new(
                    Some(op),
                    format!("cannot multiply '{l}' by '{r}'"),
                ));
            }
            (Operator::Mul, l, r) => l.or(r),
            (Operator::Div, _, _) if rhs.value == 0.0 => {
                return Err(ArithmeticError::new(Some(op), "division by zero"));
            }
            (Operator::Div, l, None) => l,
            (Operator::Div, Some(l), Some(r)) if l.eq_ignore_ascii_case(&r) => None,
            (Operator::Div, l, Some(r)) => {
                return Err(ArithmeticError::new(
                    Some(op),
                    format!("cannot divide '{}' by '{r}'", l.as_deref().unwrap_or("a unitless number")),
                ));
            }
            (Operator::LeftParen | Operator::RightParen | Operator::Neg, _, _) => {
                return Err(ArithmeticError::new(
                    Some(op),
                    format!("'{}' is not a binary operator", op.symbol()),
                ));
            }
        };

        let value = match op {
            Operator::Add => self.value + rhs.value,
            Operator::Sub => self.value - rhs.value,
            Operator::Mul => self.value * rhs.value,
            _ => self.value / rhs.value,
        };
        if !value.is_finite() {
            return Err(ArithmeticError::new(Some(op), "result is out of range"));
        }

        Ok(Numeric { value, unit })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn px(value: f64) -> UnitKind {
        UnitKind::dimension(value, "px")
    }

    fn op(op: Operator) -> UnitKind {
        UnitKind::Operator(op)
    }

    fn chain(units: impl IntoIterator<Item = UnitKind>) -> ValueChain {
        units.into_iter().collect()
    }

    #[test]
    fn literal_slash_is_classified_as_separator() {
        let font = chain([
            px(12.0),
            op(Operator::Div),
            UnitKind::Number(1.5),
            UnitKind::ident("sans-serif"),
        ]);
        let classified = classify_division(&font);

        assert_eq!(
            classified.iter().nth(1),
            Some(&UnitKind::Separator(Separator::Slash))
        );
        assert!(!contains_arithmetic(&classified));
    }

    #[test]
    fn slash_next_to_variable_is_division() {
        let value = chain([
            UnitKind::variable("a"),
            op(Operator::Div),
            UnitKind::variable("b"),
        ]);
        let classified = classify_division(&value);

        assert_eq!(classified, value);
        assert!(contains_arithmetic(&classified));
    }

    #[test]
    fn slash_with_other_operators_is_division() {
        let value = chain([
            px(2.0),
            op(Operator::Add),
            px(10.0),
            op(Operator::Div),
            UnitKind::Number(2.0),
        ]);
        assert_eq!(classify_division(&value), value);

        // A different comma segment does not count.
        let value = chain([
            px(1.0),
            op(Operator::Add),
            px(1.0),
            UnitKind::Separator(Separator::Comma),
            px(12.0),
            op(Operator::Div),
            UnitKind::Number(1.5),
        ]);
        let classified = classify_division(&value);
        assert_eq!(
            classified.iter().nth(5),
            Some(&UnitKind::Separator(Separator::Slash))
        );
    }

    #[test]
    fn classification_recurses_into_functions() {
        let params = chain([px(4.0), op(Operator::Div), UnitKind::Number(2.0)]);
        let value = chain([UnitKind::function("f", params)]);
        let classified = classify_division(&value);

        let Some(UnitKind::Function { params, .. }) = classified.first() else {
            panic!("expected function");
        };
        assert_eq!(
            params.iter().nth(1),
            Some(&UnitKind::Separator(Separator::Slash))
        );
    }

    #[test]
    fn precedence() {
        let value = chain([
            px(2.0),
            op(Operator::Add),
            px(3.0),
            op(Operator::Mul),
            UnitKind::Number(2.0),
        ]);
        assert_eq!(evaluate(&value).unwrap(), chain([px(8.0)]));
    }

    #[test]
    fn left_associativity() {
        let value = chain([
            px(10.0),
            op(Operator::Sub),
            px(3.0),
            op(Operator::Sub),
            px(2.0),
        ]);
        assert_eq!(evaluate(&value).unwrap(), chain([px(5.0)]));

        let value = chain([
            UnitKind::Number(8.0),
            op(Operator::Div),
            UnitKind::Number(2.0),
            op(Operator::Div),
            UnitKind::Number(2.0),
        ]);
        assert_eq!(evaluate(&value).unwrap(), chain([UnitKind::Number(2.0)]));
    }

    #[test]
    fn parentheses_and_unary_minus() {
        let value = chain([
            op(Operator::LeftParen),
            px(2.0),
            op(Operator::Add),
            px(3.0),
            op(Operator::RightParen),
            op(Operator::Mul),
            op(Operator::Sub),
            UnitKind::Number(2.0),
        ]);
        assert_eq!(evaluate(&value).unwrap(), chain([px(-10.0)]));
    }

    #[test]
    fn unit_rules() {
        let mixed = chain([px(10.0), op(Operator::Add), UnitKind::Number(5.0)]);
        assert_eq!(evaluate(&mixed).unwrap(), chain([px(15.0)]));

        let ratio = chain([px(10.0), op(Operator::Div), px(4.0)]);
        assert_eq!(evaluate(&ratio).unwrap(), chain([UnitKind::Number(2.5)]));

        let err = evaluate(&chain([
            px(10.0),
            op(Operator::Add),
            UnitKind::dimension(5.0, "%"),
        ]))
        .unwrap_err();
        assert_eq!(err.operator, Some(Operator::Add));
        assert_eq!(err.message, "incompatible units 'px' and '%'");

        assert!(evaluate(&chain([px(2.0), op(Operator::Mul), px(2.0)])).is_err());
        assert!(evaluate(&chain([UnitKind::Number(2.0), op(Operator::Div), px(2.0)])).is_err());
    }

    #[test]
    fn division_by_zero() {
        let err = evaluate(&chain([px(10.0), op(Operator::Div), UnitKind::Number(0.0)])).unwrap_err();
        assert_eq!(err.operator, Some(Operator::Div));
        assert_eq!(err.message, "division by zero");
    }

    #[test]
    fn overflow_is_an_error() {
        let err = evaluate(&chain([px(1e308), op(Operator::Mul), UnitKind::Number(10.0)])).unwrap_err();
        assert_eq!(err.operator, Some(Operator::Mul));
        assert_eq!(err.message, "result is out of range");

        assert!(evaluate(&chain([px(-1e308), op(Operator::Sub), px(1e308)])).is_err());
    }

    #[test]
    fn negation_starts_a_new_item() {
        let value = chain([UnitKind::Number(0.0), op(Operator::Neg), px(4.0)]);
        assert_eq!(evaluate(&value).unwrap(), chain([UnitKind::Number(0.0), px(-4.0)]));

        let value = chain([
            px(1.0),
            op(Operator::Add),
            px(1.0),
            op(Operator::Neg),
            px(2.0),
            op(Operator::Mul),
            UnitKind::Number(2.0),
        ]);
        assert_eq!(evaluate(&value).unwrap(), chain([px(2.0), px(-4.0)]));

        let value = chain([UnitKind::Number(0.0), op(Operator::Neg), UnitKind::ident("auto")]);
        assert_eq!(evaluate(&value).unwrap(), value);
    }

    #[test]
    fn runs_are_reduced_independently() {
        let value = chain([
            px(1.0),
            op(Operator::Add),
            px(1.0),
            UnitKind::ident("solid"),
            UnitKind::ident("red"),
        ]);
        assert_eq!(
            evaluate(&value).unwrap(),
            chain([px(2.0), UnitKind::ident("solid"), UnitKind::ident("red")])
        );

        let value = chain([
            px(1.0),
            op(Operator::Mul),
            UnitKind::Number(2.0),
            px(3.0),
            op(Operator::Mul),
            UnitKind::Number(2.0),
        ]);
        assert_eq!(evaluate(&value).unwrap(), chain([px(2.0), px(6.0)]));
    }

    #[test]
    fn non_numeric_operands_fail() {
        let err = evaluate(&chain([
            UnitKind::ident("auto"),
            op(Operator::Add),
            px(2.0),
        ]))
        .unwrap_err();
        assert_eq!(err.message, "'auto' is not a number");

        let err = evaluate(&chain([px(2.0), op(Operator::Mul), UnitKind::string("x")])).unwrap_err();
        assert_eq!(err.operator, Some(Operator::Mul));
    }

    #[test]
    fn unbalanced_parentheses_fail() {
        let value = chain([op(Operator::LeftParen), px(2.0), op(Operator::Add), px(3.0)]);
        assert!(evaluate(&value).is_err());
    }

    #[test]
    fn unresolved_variables_are_left_alone() {
        let value = chain([UnitKind::variable("x"), op(Operator::Mul), UnitKind::Number(2.0)]);
        assert_eq!(evaluate(&value).unwrap(), value);
    }

    #[test]
    fn evaluation_is_pure() {
        let value = chain([px(2.0), op(Operator::Mul), UnitKind::Number(3.0)]);
        assert_eq!(evaluate(&value).unwrap(), evaluate(&value).unwrap());
        assert_eq!(value.len(), 3);
    }
}
