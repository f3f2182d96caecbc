//! Property and variable declarations.

use std::fmt;

use crate::render::Strategy;
use crate::types::ValueChain;

/// A `property: value [!important];` declaration.
///
/// Each declaration has:
/// - A property name, which may contain `#{$name}` interpolation markers
/// - A value chain, replaced in place by its resolved form during compilation
/// - The `!important` flag and an optional trailing comment
/// - The source line it was read from, when known
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// The property name.
    pub property: String,
    /// The value chain.
    pub value: ValueChain,
    /// Whether the declaration is `!important`.
    pub important: bool,
    /// A comment emitted after the declaration, including its delimiters.
    pub comment: Option<String>,
    /// Source line (1-indexed).
    pub line: Option<u32>,
}

impl Declaration {
    /// Create a declaration.
    pub fn new(property: impl Into<String>, value: ValueChain) -> Self {
        Self {
            property: property.into(),
            value,
            important: false,
            comment: None,
            line: None,
        }
    }

    /// Mark the declaration `!important`.
    pub fn important(mut self) -> Self {
        self.important = true;
        self
    }

    /// Attach a trailing comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Record the source line.
    pub fn at_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    /// Render as `property: value[ !important];` followed by the comment.
    ///
    /// When the value renders blank the `property: value;` part is left out
    /// entirely; only the comment, if any, remains.
    pub fn render(&self, strategy: Strategy) -> String {
        self.render_with(strategy, true)
    }

    pub(crate) fn render_with(&self, strategy: Strategy, include_comment: bool) -> String {
        let value = strategy.render(&self.value);
        let mut out = String::new();

        if !value.trim().is_empty() {
            out.push_str(&self.property);
            out.push_str(": ");
            out.push_str(&value);
            if self.important {
                out.push_str(" !important");
            }
            out.push(';');
        }

        if include_comment && let Some(comment) = &self.comment {
            out.push_str(comment);
        }
        out
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Declaration [{}]", self.render(Strategy::Diagnostic))
    }
}

/// A `$name: value [!default];` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    /// Variable name without the `$`.
    pub name: String,
    /// The bound expression.
    pub expression: ValueChain,
    /// Whether this is a `!default` binding, made only if the name is unbound.
    pub guarded: bool,
    /// Source line (1-indexed).
    pub line: Option<u32>,
}

impl VariableDeclaration {
    /// Create a variable declaration. A leading `$` is stripped.
    pub fn new(name: impl Into<String>, expression: ValueChain) -> Self {
        let name = name.into();
        let name = name.strip_prefix('$').unwrap_or(&name).to_string();
        Self {
            name,
            expression,
            guarded: false,
            line: None,
        }
    }

    /// Make this a `!default` binding.
    pub fn guarded(mut self) -> Self {
        self.guarded = true;
        self
    }

    /// Record the source line.
    pub fn at_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }
}

impl fmt::Display for VariableDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Variable [${}: {}{}]",
            self.name,
            Strategy::Diagnostic.render(&self.expression),
            if self.guarded { " !default" } else { "" }
        )
    }
}
