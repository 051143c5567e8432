/// Syntax errors.
///
/// Defines all errors raised while lexing the source or while matching tokens
/// against the grammar and the precedence table. Lexical errors carry the
/// offending slice; grammar errors carry the token that could not be used.
pub mod syntax_error;
/// Semantic errors.
///
/// Contains every error raised by type resolution and symbol checks:
/// undefined symbols, argument mismatches, uninitialized variables, bad
/// returns, incompatible types and types that cannot be inferred.
pub mod semantic_error;

pub use semantic_error::{SemanticError, SemanticKind};
pub use syntax_error::SyntaxError;

/// Result type used throughout the compiler.
pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug)]
/// Any error that terminates a compilation.
pub enum CompileError {
    /// A lexical or grammatical error.
    Syntax(SyntaxError),
    /// A type or symbol error.
    Semantic(SemanticError),
    /// A broken compiler invariant.
    Internal {
        /// Details about what went wrong.
        details: String,
    },
}

impl CompileError {
    /// Returns the process exit status for this error.
    ///
    /// # Example
    /// ```
    /// use ifj23c::error::{CompileError, SyntaxError};
    ///
    /// let lexical = CompileError::from(SyntaxError::InvalidToken { token: "?".into(),
    ///                                                               line:  1, });
    /// assert_eq!(lexical.exit_code(), 1);
    ///
    /// let grammar = CompileError::from(SyntaxError::UnexpectedEndOfInput { line: 3 });
    /// assert_eq!(grammar.exit_code(), 2);
    /// ```
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Syntax(SyntaxError::InvalidToken { .. }) => 1,
            Self::Syntax(_) => 2,
            Self::Semantic(error) => error.kind().exit_code(),
            Self::Internal { .. } => 99,
        }
    }
}

impl From<SyntaxError> for CompileError {
    fn from(error: SyntaxError) -> Self {
        Self::Syntax(error)
    }
}

impl From<SemanticError> for CompileError {
    fn from(error: SemanticError) -> Self {
        Self::Semantic(error)
    }
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Syntax(error) => write!(f, "{error}"),
            Self::Semantic(error) => write!(f, "{error}"),
            Self::Internal { details } => write!(f, "Internal compiler error: {details}"),
        }
    }
}

impl std::error::Error for CompileError {}
