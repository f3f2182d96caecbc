//! Number functions: `abs`, `ceil`, `floor`, `round`, `percentage`.

use super::args::{self, ArgumentError, FunctionCall};
use super::{FunctionGenerator, Generated};
use crate::render::Strategy;
use crate::types::{UnitKind, ValueChain};

/// A one-argument function that maps the numeric part and keeps the unit.
#[derive(Debug, Clone, Copy)]
pub struct Rounding {
    name: &'static str,
    op: fn(f64) -> f64,
}

impl Rounding {
    /// `ceil($number)`
    pub const CEIL: Self = Self::new("ceil", f64::ceil);
    /// `floor($number)`
    pub const FLOOR: Self = Self::new("floor", f64::floor);
    /// `round($number)`, halves away from zero.
    pub const ROUND: Self = Self::new("round", f64::round);

    /// Create a generator named `name` applying `op`.
    pub const fn new(name: &'static str, op: fn(f64) -> f64) -> Self {
        Self { name, op }
    }
}

impl FunctionGenerator for Rounding {
    fn name(&self) -> &'static str {
        self.name
    }

    fn apply(&self, call: &FunctionCall<'_>, _strategy: Strategy) -> Result<Generated, ArgumentError> {
        let args = call.args(1, 1)?;
        let (value, unit) = args::number(&args[0], 1)?;
        Ok(number_value((self.op)(value), unit))
    }
}

/// `abs($number)`
#[derive(Debug, Clone, Copy, Default)]
pub struct Abs;

impl FunctionGenerator for Abs {
    fn name(&self) -> &'static str {
        "abs"
    }

    fn apply(&self, call: &FunctionCall<'_>, _strategy: Strategy) -> Result<Generated, ArgumentError> {
        let args = call.args(1, 1)?;
        let (value, unit) = args::number(&args[0], 1)?;
        Ok(number_value(value.abs(), unit))
    }
}

/// `percentage($number)`: a unitless ratio as a percentage.
#[derive(Debug, Clone, Copy, Default)]
pub struct Percentage;

impl FunctionGenerator for Percentage {
    fn name(&self) -> &'static str {
        "percentage"
    }

    fn apply(&self, call: &FunctionCall<'_>, _strategy: Strategy) -> Result<Generated, ArgumentError> {
        let args = call.args(1, 1)?;
        match args::number(&args[0], 1)? {
            (value, None) => Ok(number_value(value * 100.0, Some("%".to_string()))),
            (_, Some(unit)) => Err(ArgumentError::new(format!(
                "argument 1 must be unitless, got unit '{unit}'"
            ))),
        }
    }
}

fn number_value(value: f64, unit: Option<String>) -> Generated {
    Generated::Value(ValueChain::single(UnitKind::dimension(
        value,
        unit.unwrap_or_default(),
    )))
}
