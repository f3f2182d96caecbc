//! Variable resolution, arithmetic and the compilation pass.

pub mod arithmetic;
mod engine;
pub mod variables;

pub use arithmetic::ArithmeticError;
pub use engine::{Compilation, Compiler, CompilerOptions};
pub use variables::VariableTable;
