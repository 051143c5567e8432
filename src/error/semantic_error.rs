/// Categories of semantic failure, each with its own exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticKind {
    /// Undefined function or redefinition of a symbol.
    Undefined,
    /// Wrong argument count, label or type, or wrong return type.
    ArgMismatch,
    /// Use of an undefined or uninitialized variable.
    Uninitialized,
    /// Missing or extra expression in a `return`.
    ReturnMismatch,
    /// Incompatible operand or assignment types.
    TypeIncompatible,
    /// A type that cannot be inferred.
    UnknownType,
    /// Any other semantic error.
    Other,
}

impl SemanticKind {
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Undefined => 3,
            Self::ArgMismatch => 4,
            Self::Uninitialized => 5,
            Self::ReturnMismatch => 6,
            Self::TypeIncompatible => 7,
            Self::UnknownType => 8,
            Self::Other => 9,
        }
    }
}

#[derive(Debug)]
/// Represents all errors found while checking names and types.
pub enum SemanticError {
    /// Called a function that does not exist.
    UndefinedFunction {
        /// The function name.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// Declared a name that already exists in the same scope.
    Redefinition {
        /// The redeclared name.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// A call does not match the signature of the callee.
    ArgumentMismatch {
        /// Details about the mismatch.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// A returned value does not match the declared return type.
    ReturnTypeMismatch {
        /// Details about the mismatch.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// Read a variable that is undefined or has no value yet.
    UninitializedVariable {
        /// The variable name.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// A non-void function returns without a value.
    MissingReturnValue {
        /// The function name.
        function: String,
        /// The source line where the error occurred.
        line:     usize,
    },
    /// A void function returns a value.
    UnexpectedReturnValue {
        /// The function name.
        function: String,
        /// The source line where the error occurred.
        line:     usize,
    },
    /// Operand or assignment types are incompatible.
    TypeMismatch {
        /// Details about the mismatch.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// The type of a declaration can neither be read nor inferred.
    CannotInferType {
        /// The variable name.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// Assigned to a constant that already holds a value.
    AssignToConstant {
        /// The constant name.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// A parameter uses the same name for its label and its identifier.
    InvalidParameter {
        /// The parameter name.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
}

impl SemanticError {
    /// Returns the category this error belongs to.
    #[must_use]
    pub const fn kind(&self) -> SemanticKind {
        match self {
            Self::UndefinedFunction { .. } | Self::Redefinition { .. } => SemanticKind::Undefined,
            Self::ArgumentMismatch { .. } | Self::ReturnTypeMismatch { .. } => {
                SemanticKind::ArgMismatch
            },
            Self::UninitializedVariable { .. } => SemanticKind::Uninitialized,
            Self::MissingReturnValue { .. } | Self::UnexpectedReturnValue { .. } => {
                SemanticKind::ReturnMismatch
            },
            Self::TypeMismatch { .. } => SemanticKind::TypeIncompatible,
            Self::CannotInferType { .. } => SemanticKind::UnknownType,
            Self::AssignToConstant { .. } | Self::InvalidParameter { .. } => SemanticKind::Other,
        }
    }
}

impl std::fmt::Display for SemanticError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UndefinedFunction { name, line } => {
                write!(f, "Error on line {line}: Function '{name}' is not defined.")
            },

            Self::Redefinition { name, line } => {
                write!(f, "Error on line {line}: '{name}' is already defined in this scope.")
            },

            Self::ArgumentMismatch { details, line } => {
                write!(f, "Error on line {line}: Bad call: {details}")
            },

            Self::ReturnTypeMismatch { details, line } => {
                write!(f, "Error on line {line}: Bad return value: {details}")
            },

            Self::UninitializedVariable { name, line } => write!(f,
                                                                 "Error on line {line}: Variable '{name}' is undefined or uninitialized."),

            Self::MissingReturnValue { function, line } => write!(f,
                                                                  "Error on line {line}: Function '{function}' must return a value."),

            Self::UnexpectedReturnValue { function, line } => write!(f,
                                                                     "Error on line {line}: Function '{function}' does not return a value."),

            Self::TypeMismatch { details, line } => {
                write!(f, "Error on line {line}: Type mismatch: {details}")
            },

            Self::CannotInferType { name, line } => {
                write!(f, "Error on line {line}: Cannot infer the type of '{name}'.")
            },

            Self::AssignToConstant { name, line } => {
                write!(f, "Error on line {line}: Cannot assign to constant '{name}'.")
            },

            Self::InvalidParameter { name, line } => write!(f,
                                                            "Error on line {line}: Parameter '{name}' cannot share its name with its label."),
        }
    }
}

impl std::error::Error for SemanticError {}
