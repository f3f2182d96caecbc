//! Declarations and stylesheets.

mod declaration;
mod stylesheet;

pub use declaration::{Declaration, VariableDeclaration};
pub use stylesheet::{Node, Stylesheet};
