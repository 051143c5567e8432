use std::fmt;

/// Static type of an expression, variable or function result.
///
/// Optional variants are separate members rather than a flag on the base type
/// because the coercion and nil-coalescing rules differ per base type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Int,
    Double,
    Bool,
    String,
    /// Type of the `nil` literal.
    Nil,
    IntNil,
    DoubleNil,
    StringNil,
    /// Result of a function without a return type.
    Void,
    /// Type of an unknown or uninitialized identifier.
    Undefined,
}

impl ValueType {
    /// Returns `true` for `Int?`, `Double?` and `String?`.
    #[must_use]
    pub const fn is_optional(self) -> bool {
        matches!(self, Self::IntNil | Self::DoubleNil | Self::StringNil)
    }

    /// Returns the non-optional counterpart, or the type itself.
    ///
    /// # Example
    /// ```
    /// use ifj23c::compiler::types::ValueType;
    ///
    /// assert_eq!(ValueType::IntNil.unwrapped(), ValueType::Int);
    /// assert_eq!(ValueType::String.unwrapped(), ValueType::String);
    /// ```
    #[must_use]
    pub const fn unwrapped(self) -> Self {
        match self {
            Self::IntNil => Self::Int,
            Self::DoubleNil => Self::Double,
            Self::StringNil => Self::String,
            other => other,
        }
    }

    /// Returns the optional counterpart of a base type, if it has one.
    #[must_use]
    pub const fn optional(self) -> Option<Self> {
        match self {
            Self::Int | Self::IntNil => Some(Self::IntNil),
            Self::Double | Self::DoubleNil => Some(Self::DoubleNil),
            Self::String | Self::StringNil => Some(Self::StringNil),
            _ => None,
        }
    }

    /// Returns `true` when a value of type `value` may be stored in a slot of
    /// this type.
    ///
    /// Optional slots take their base type and `nil`; every other slot takes
    /// only its own type.
    ///
    /// # Example
    /// ```
    /// use ifj23c::compiler::types::ValueType;
    ///
    /// assert!(ValueType::IntNil.accepts(ValueType::Int));
    /// assert!(ValueType::IntNil.accepts(ValueType::Nil));
    /// assert!(!ValueType::Int.accepts(ValueType::IntNil));
    /// assert!(!ValueType::Double.accepts(ValueType::Int));
    /// ```
    #[must_use]
    pub fn accepts(self, value: Self) -> bool {
        self == value || (self.is_optional() && (value == Self::Nil || value == self.unwrapped()))
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Int => "Int",
            Self::Double => "Double",
            Self::Bool => "Bool",
            Self::String => "String",
            Self::Nil => "nil",
            Self::IntNil => "Int?",
            Self::DoubleNil => "Double?",
            Self::StringNil => "String?",
            Self::Void => "Void",
            Self::Undefined => "undefined",
        };
        write!(f, "{name}")
    }
}
