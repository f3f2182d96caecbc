//! Built-in SCSS functions and the registry that dispatches them.
//!
//! Each function is a stateless [`FunctionGenerator`] looked up by name in a
//! [`FunctionRegistry`]. Generators receive the call with its arguments
//! already substituted and evaluated, and return either a replacement value
//! or pre-rendered text.

mod args;
mod color;
mod numeric;
mod registry;
mod string;

pub use args::{ArgumentError, FunctionCall};
pub use color::{Darken, Lighten, Mix, Rgb, Rgba};
pub use numeric::{Abs, Percentage, Rounding};
pub use registry::{FunctionRegistry, RegistryBuilder};
pub use string::{Quote, StrLength, ToLowerCase, ToUpperCase, Unquote};

use crate::render::Strategy;
use crate::types::ValueChain;

/// What a generator produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Generated {
    /// A value that replaces the call in the chain.
    Value(ValueChain),
    /// Text emitted verbatim in place of the call.
    Text(String),
}

/// A named, stateless SCSS function.
pub trait FunctionGenerator: Send + Sync {
    /// The case-sensitive name this generator is registered under.
    fn name(&self) -> &'static str;

    /// Apply the function to a call.
    ///
    /// `strategy` is the active serialization strategy, for generators that
    /// produce text.
    fn apply(
        &self,
        call: &FunctionCall<'_>,
        strategy: Strategy,
    ) -> std::result::Result<Generated, ArgumentError>;
}
