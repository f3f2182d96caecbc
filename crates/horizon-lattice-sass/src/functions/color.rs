//! Color functions: `lighten`, `darken`, `mix`, `rgb`, `rgba`.

use super::args::{self, ArgumentError, FunctionCall};
use super::{FunctionGenerator, Generated};
use crate::render::Strategy;
use crate::types::{Color, UnitKind, ValueChain};

fn color_value(color: Color) -> Generated {
    Generated::Value(ValueChain::single(UnitKind::Color(color)))
}

/// `lighten($color, $amount)`: raise HSL lightness by `$amount`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lighten;

impl FunctionGenerator for Lighten {
    fn name(&self) -> &'static str {
        "lighten"
    }

    fn apply(&self, call: &FunctionCall<'_>, _strategy: Strategy) -> Result<Generated, ArgumentError> {
        let args = call.args(2, 2)?;
        let base = args::color(&args[0], 1)?;
        let amount = args::amount(&args[1], 2)?;
        Ok(color_value(base.lighten(amount)))
    }
}

/// `darken($color, $amount)`: lower HSL lightness by `$amount`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Darken;

impl FunctionGenerator for Darken {
    fn name(&self) -> &'static str {
        "darken"
    }

    fn apply(&self, call: &FunctionCall<'_>, _strategy: Strategy) -> Result<Generated, ArgumentError> {
        let args = call.args(2, 2)?;
        let base = args::color(&args[0], 1)?;
        let amount = args::amount(&args[1], 2)?;
        Ok(color_value(base.darken(amount)))
    }
}

/// `mix($color1, $color2, $weight: 50%)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mix;

impl FunctionGenerator for Mix {
    fn name(&self) -> &'static str {
        "mix"
    }

    fn apply(&self, call: &FunctionCall<'_>, _strategy: Strategy) -> Result<Generated, ArgumentError> {
        let args = call.args(2, 3)?;
        let first = args::color(&args[0], 1)?;
        let second = args::color(&args[1], 2)?;
        let weight = match args.get(2) {
            Some(arg) => args::amount(arg, 3)?,
            None => 0.5,
        };
        Ok(color_value(first.mix(second, weight)))
    }
}

/// `rgb($red, $green, $blue)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rgb;

impl FunctionGenerator for Rgb {
    fn name(&self) -> &'static str {
        "rgb"
    }

    fn apply(&self, call: &FunctionCall<'_>, _strategy: Strategy) -> Result<Generated, ArgumentError> {
        let args = call.args(3, 3)?;
        let [r, g, b] = [
            rgb_channel(&args[0], 1)?,
            rgb_channel(&args[1], 2)?,
            rgb_channel(&args[2], 3)?,
        ];
        Ok(color_value(Color::rgb(r, g, b)))
    }
}

/// `rgba($red, $green, $blue, $alpha)` or `rgba($color, $alpha)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rgba;

impl FunctionGenerator for Rgba {
    fn name(&self) -> &'static str {
        "rgba"
    }

    fn apply(&self, call: &FunctionCall<'_>, _strategy: Strategy) -> Result<Generated, ArgumentError> {
        let args = call.args(2, 4)?;
        let color = match args.len() {
            2 => {
                let base = args::color(&args[0], 1)?;
                Color::rgba(base.r, base.g, base.b, alpha(&args[1], 2)?)
            }
            4 => Color::rgba(
                rgb_channel(&args[0], 1)?,
                rgb_channel(&args[1], 2)?,
                rgb_channel(&args[2], 3)?,
                alpha(&args[3], 4)?,
            ),
            n => {
                return Err(ArgumentError::new(format!(
                    "expected 2 or 4 arguments, got {n}"
                )));
            }
        };
        Ok(color_value(color))
    }
}

/// A channel given as `0..=255` or as a percentage.
fn rgb_channel(arg: &ValueChain, position: usize) -> Result<u8, ArgumentError> {
    let (value, unit) = args::number(arg, position)?;
    let value = match unit.as_deref() {
        None => value,
        Some("%") => value / 100.0 * 255.0,
        Some(other) => {
            return Err(ArgumentError::new(format!(
                "argument {position} must be unitless or a percentage, got unit '{other}'"
            )));
        }
    };
    Ok(value.round().clamp(0.0, 255.0) as u8)
}

fn alpha(arg: &ValueChain, position: usize) -> Result<f64, ArgumentError> {
    let (value, unit) = args::number(arg, position)?;
    match unit.as_deref() {
        None => Ok(value.clamp(0.0, 1.0)),
        Some("%") => Ok((value / 100.0).clamp(0.0, 1.0)),
        Some(other) => Err(ArgumentError::new(format!(
            "argument {position} must be unitless or a percentage, got unit '{other}'"
        ))),
    }
}
