/// Terminal symbols and the operator precedence table.
///
/// Every token maps to exactly one terminal symbol, and every pair of
/// terminals maps to one parser action. Literals and identifiers are all the
/// same `Operand` terminal; anything that cannot continue an expression is the
/// end marker.
pub mod precedence;
/// The parser's working stack.
///
/// A `Vec` of typed items with the two scans the driver needs: the topmost
/// terminal, and the run of items above the most recent boundary marker.
pub mod stack;
/// Reduction rules and their typing.
///
/// Matches the items above a boundary against the grammar's handles and
/// computes the resulting type, including literal promotion, optional types
/// and nil-coalescing.
pub mod rules;
/// Instructions produced by shifts and reductions.
///
/// Operand loads are emitted at shift time and operators at reduce time, so
/// the machine evaluates the expression in postfix order.
pub mod emit;
/// Jump sequences for `if` and `while` conditions.
///
/// Replaces the value-producing comparison of a condition with a compare and
/// conditional jump to the body label.
pub mod condition;
/// The shift/reduce loop.
///
/// Pulls tokens, consults the precedence table, drives the stack, the rules
/// and the emitter, and applies the post-checks of the surrounding statement.
pub mod driver;

pub use driver::{ExpressionContext, compile_expression};
