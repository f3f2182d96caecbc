//! SCSS value compiler for Horizon Lattice.
//!
//! This crate compiles a flat SCSS stylesheet into CSS text, featuring:
//!
//! - **Value chains**: Typed, linked sequences of numbers, dimensions, colors,
//!   strings, functions, variables and operators
//! - **Variables**: `$name` bindings with hoisting, `!default` and `#{$name}`
//!   interpolation
//! - **Arithmetic**: `+ - * /` with unit checking, where a literal `/` such as
//!   `font: 12px/1.5` is left alone
//! - **Functions**: A registry of built-in color, number and string functions
//! - **Serialization**: Canonical CSS output and a full-precision diagnostic form
//!
//! # Example
//!
//! ```
//! use horizon_lattice_sass::prelude::*;
//!
//! let scss = "
//!     $base: #000000;
//!     $gap: 4px;
//!     color: lighten($base, 50%);
//!     margin: $gap * 2 $gap;
//!     font: 12px/1.5 serif;
//! ";
//!
//! let compilation = Compiler::default().compile_str(scss)?;
//! assert_eq!(
//!     compilation.css,
//!     "color: #808080;\nmargin: 8px 4px;\nfont: 12px/1.5 serif;"
//! );
//! # Ok::<(), horizon_lattice_sass::Error>(())
//! ```

pub mod functions;
pub mod parser;
pub mod render;
pub mod resolve;
pub mod rules;
pub mod types;

mod error;

pub use error::{Error, Result};
pub use resolve::{Compilation, Compiler, CompilerOptions};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::functions::{FunctionGenerator, FunctionRegistry, Generated};
    pub use crate::parser::{parse_stylesheet, parse_value};
    pub use crate::render::Strategy;
    pub use crate::resolve::{Compilation, Compiler, CompilerOptions, VariableTable};
    pub use crate::rules::{Declaration, Node, Stylesheet, VariableDeclaration};
    pub use crate::types::{Color, Operator, Separator, UnitKind, ValueChain};
    pub use crate::{Error, Result};
}
