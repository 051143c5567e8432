#[derive(Debug)]
/// Represents all errors that can occur during lexing or parsing.
pub enum SyntaxError {
    /// The lexer could not match the input.
    InvalidToken {
        /// The unmatched source slice.
        token: String,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// Found an unexpected token while parsing.
    UnexpectedToken {
        /// The token encountered.
        token: String,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// Reached the end of input unexpectedly.
    UnexpectedEndOfInput {
        /// The source line where the error occurred.
        line: usize,
    },
    /// The precedence table has no action for the pair of symbols.
    InvalidExpression {
        /// The token at which the expression broke down.
        token: String,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// No reduction rule matches the symbols above the boundary.
    NoMatchingRule {
        /// The source line where the error occurred.
        line: usize,
    },
    /// An expression was required but none was found.
    ExpectedExpression {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A condition used a form the condition compiler does not accept.
    UnsupportedCondition {
        /// The source line where the error occurred.
        line: usize,
    },
    /// `return` appeared outside a function body.
    ReturnOutsideFunction {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A function definition appeared inside a block.
    NestedFunction {
        /// The name of the function.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidToken { token, line } => {
                write!(f, "Error on line {line}: Invalid token: {token}")
            },

            Self::UnexpectedToken { token, line } => {
                write!(f, "Error on line {line}: Unexpected token: {token}.")
            },

            Self::UnexpectedEndOfInput { line } => {
                write!(f, "Error on line {line}: Unexpected end of input.")
            },

            Self::InvalidExpression { token, line } => {
                write!(f, "Error on line {line}: Invalid expression near {token}.")
            },

            Self::NoMatchingRule { line } => {
                write!(f, "Error on line {line}: Malformed expression.")
            },

            Self::ExpectedExpression { line } => {
                write!(f, "Error on line {line}: Expected an expression.")
            },

            Self::UnsupportedCondition { line } => write!(f,
                                                          "Error on line {line}: Conditions must be a single relational comparison."),

            Self::ReturnOutsideFunction { line } => {
                write!(f, "Error on line {line}: 'return' outside of a function body.")
            },

            Self::NestedFunction { name, line } => write!(f,
                                                          "Error on line {line}: Function '{name}' must be defined at the top level."),
        }
    }
}

impl std::error::Error for SyntaxError {}
