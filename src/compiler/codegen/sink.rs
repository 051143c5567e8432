use std::fmt;

use crate::compiler::codegen::Instruction;

/// First line of every program.
pub const HEADER: &str = ".IFJcode23";

/// Receives instructions in program order.
///
/// Besides appending, a sink must let the compiler insert an instruction at an
/// earlier position. Declarations made inside a loop body are moved in front
/// of the loop that way.
pub trait CodeSink {
    /// Appends one instruction.
    fn emit(&mut self, instruction: Instruction);

    /// Number of instructions emitted so far.
    fn position(&self) -> usize;

    /// Inserts an instruction before the one currently at `index`.
    fn insert(&mut self, index: usize, instruction: Instruction);
}

/// An in-memory program.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    #[must_use]
    pub const fn new() -> Self {
        Self { instructions: Vec::new() }
    }

    /// All instructions in program order.
    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// The instructions rendered one per line, without the header.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.instructions.iter().map(ToString::to_string).collect()
    }
}

impl CodeSink for Program {
    fn emit(&mut self, instruction: Instruction) {
        log::trace!("emit {instruction}");
        self.instructions.push(instruction);
    }

    fn position(&self) -> usize {
        self.instructions.len()
    }

    fn insert(&mut self, index: usize, instruction: Instruction) {
        log::trace!("insert {instruction} at {index}");
        self.instructions.insert(index, instruction);
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{HEADER}")?;
        for instruction in &self.instructions {
            writeln!(f, "{instruction}")?;
        }
        Ok(())
    }
}
