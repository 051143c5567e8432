/// Turns source text into `(Token, line)` pairs.
///
/// Built on `logos`. Comments, including nested block comments, are skipped
/// and line breaks are kept as tokens since they end statements.
pub mod lexer;
/// The static types of values and the assignment compatibility between them.
pub mod types;
/// Variables in nested scopes and the function namespace.
pub mod symtable;
/// The target instruction set and the sinks that collect instructions.
pub mod codegen;
/// The operator precedence expression engine.
///
/// Parses an expression with a shift/reduce loop driven by a precedence
/// table, checks its types while reducing, and emits stack code in the same
/// pass. Inside `if` and `while` headers the final comparison becomes a
/// conditional jump instead of a value.
pub mod expression;
/// The mutable state threaded through one compilation.
pub mod context;
/// Statements, blocks, functions and calls.
pub mod parser;
/// Functions provided by the compiler and expanded inline.
pub mod builtins;
