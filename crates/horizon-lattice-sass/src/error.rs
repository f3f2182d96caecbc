//! Error types for the SCSS compiler.

/// Result type alias for compiler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors and diagnostics produced while reading or compiling a stylesheet.
///
/// Not every variant stops compilation. See [`Error::is_fatal`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// SCSS text could not be read into nodes.
    #[error("SCSS parse error at line {line}, column {column}: {message}")]
    Parse {
        message: String,
        line: u32,
        column: u32,
    },

    /// A variable reference has no binding; it is passed through unresolved.
    #[error("Undefined variable '${name}' in '{context}'{}", at_line(.line))]
    UnboundVariable {
        name: String,
        context: String,
        line: Option<u32>,
    },

    /// A function has no generator; the call is passed through literally.
    #[error("Unknown function '{function}()' in '{context}'{}, passed through", at_line(.line))]
    UnknownFunction {
        function: String,
        context: String,
        line: Option<u32>,
    },

    /// Incompatible units, a non-numeric operand, or division by zero.
    #[error("Arithmetic error in '{context}'{}{}: {message}", at_line(.line), near(.operator))]
    Arithmetic {
        context: String,
        operator: Option<char>,
        message: String,
        line: Option<u32>,
    },

    /// A known function was called with the wrong number or type of arguments.
    #[error("Invalid call to '{function}()' in '{context}'{}: {message}", at_line(.line))]
    FunctionArgument {
        function: String,
        context: String,
        message: String,
        line: Option<u32>,
    },

    /// A variable declaration could not be collected or settled.
    #[error("Invalid variable declaration '${name}'{}: {message}", at_line(.line))]
    InvalidVariable {
        name: String,
        message: String,
        line: Option<u32>,
    },
}

impl Error {
    /// Create a parse error.
    pub fn parse(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self::Parse {
            message: message.into(),
            line,
            column,
        }
    }

    /// Create an unbound-variable diagnostic.
    pub fn unbound_variable(
        name: impl Into<String>,
        context: impl Into<String>,
        line: Option<u32>,
    ) -> Self {
        Self::UnboundVariable {
            name: name.into(),
            context: context.into(),
            line,
        }
    }

    /// Create an unknown-function diagnostic.
    pub fn unknown_function(
        function: impl Into<String>,
        context: impl Into<String>,
        line: Option<u32>,
    ) -> Self {
        Self::UnknownFunction {
            function: function.into(),
            context: context.into(),
            line,
        }
    }

    /// Create an arithmetic error.
    pub fn arithmetic(
        context: impl Into<String>,
        operator: Option<char>,
        message: impl Into<String>,
        line: Option<u32>,
    ) -> Self {
        Self::Arithmetic {
            context: context.into(),
            operator,
            message: message.into(),
            line,
        }
    }

    /// Create a function argument error.
    pub fn function_argument(
        function: impl Into<String>,
        context: impl Into<String>,
        message: impl Into<String>,
        line: Option<u32>,
    ) -> Self {
        Self::FunctionArgument {
            function: function.into(),
            context: context.into(),
            message: message.into(),
            line,
        }
    }

    /// Create an invalid-variable error.
    pub fn invalid_variable(
        name: impl Into<String>,
        message: impl Into<String>,
        line: Option<u32>,
    ) -> Self {
        Self::InvalidVariable {
            name: name.into(),
            message: message.into(),
            line,
        }
    }

    /// Whether this error prevented output.
    ///
    /// Unbound variables and unknown functions are reported but the value is
    /// still emitted. Everything else drops the enclosing declaration, or the
    /// whole compilation when it happens while collecting variables.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Error::UnboundVariable { .. } | Error::UnknownFunction { .. }
        )
    }

    /// Source line the error refers to, if known.
    pub fn line(&self) -> Option<u32> {
        match self {
            Error::Parse { line, .. } => Some(*line),
            Error::UnboundVariable { line, .. }
            | Error::UnknownFunction { line, .. }
            | Error::Arithmetic { line, .. }
            | Error::FunctionArgument { line, .. }
            | Error::InvalidVariable { line, .. } => *line,
        }
    }
}

fn at_line(line: &Option<u32>) -> String {
    line.map(|line| format!(" (line {line})")).unwrap_or_default()
}

fn near(operator: &Option<char>) -> String {
    operator
        .map(|op| format!(" near '{op}'"))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let err = Error::arithmetic("width", Some('+'), "incompatible units 'px' and '%'", Some(3));
        assert_eq!(
            err.to_string(),
            "Arithmetic error in 'width' (line 3) near '+': incompatible units 'px' and '%'"
        );

        let err = Error::unbound_variable("gap", "margin", None);
        assert_eq!(err.to_string(), "Undefined variable '$gap' in 'margin'");
    }

    #[test]
    fn fatality() {
        assert!(!Error::unbound_variable("a", "b", None).is_fatal());
        assert!(!Error::unknown_function("calc", "width", None).is_fatal());
        assert!(Error::function_argument("lighten", "color", "expected 2 arguments", None).is_fatal());
        assert!(Error::invalid_variable("a", "empty value", Some(1)).is_fatal());
    }
}
