/// Instructions and operands of the target stack machine.
///
/// Every instruction knows how to print itself in the exact textual form the
/// downstream interpreter reads, one instruction per line.
pub mod instruction;
/// Destinations for emitted instructions.
///
/// Compilation never writes text directly; it hands instructions to a
/// [`sink::CodeSink`]. The `Vec`-backed [`sink::Program`] is used both by the
/// command line tool and by tests that assert on instruction sequences.
pub mod sink;

pub use instruction::{Frame, Instruction, Operand, ReadType};
pub use sink::{CodeSink, Program};
