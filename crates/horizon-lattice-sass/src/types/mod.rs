//! Core value types: value chains, units, and colors.

mod color;
mod value;

pub use color::Color;
pub use value::{Iter, IntoIter, Operator, Separator, UnitKind, ValueChain, ValueUnit};
pub(crate) use value::widen;
