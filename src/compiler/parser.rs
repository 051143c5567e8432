/// Program entry, prologue and token helpers shared by the statement parsers.
pub mod core;
/// Statements: declarations, assignments, returns and dispatch.
pub mod statement;
/// Blocks and the `if` and `while` statements built from them.
pub mod block;
/// Function signatures and definitions.
pub mod function;
/// Calls to user and built-in functions.
pub mod call;
