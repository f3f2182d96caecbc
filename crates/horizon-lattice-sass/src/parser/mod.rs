//! SCSS reading.

mod reader;

pub use reader::{parse_stylesheet, parse_value};
