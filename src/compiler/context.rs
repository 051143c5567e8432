use crate::compiler::{
    codegen::{CodeSink, Frame, Instruction, Operand, Program},
    symtable::SymbolTable,
    types::ValueType,
};

/// Global scratch variable for the left operand of multi-step operators.
pub const SCRATCH_LHS: &str = "$lhs";
/// Global scratch variable for the right operand of multi-step operators.
pub const SCRATCH_RHS: &str = "$rhs";
/// Global variable that swallows unused call results.
pub const SCRATCH_DISCARD: &str = "$discard";

/// Per-construct counters used to keep labels and temporaries unique.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counters {
    pub ifs:       usize,
    pub whiles:    usize,
    pub coalesces: usize,
    pub builtins:  usize,
}

/// The function whose body is being compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionContext {
    pub name:    String,
    pub ret:     ValueType,
    /// Set once any `return` has been compiled.
    pub returns: bool,
}

/// Stores the state of one compilation.
///
/// A `Compiler` is created per program and passed by mutable reference to
/// every parsing and emitting function. It owns the symbol table and the sink
/// that receives instructions.
pub struct Compiler<S: CodeSink = Program> {
    pub sink:     S,
    pub symbols:  SymbolTable,
    pub counters: Counters,
    pub function: Option<FunctionContext>,
    loop_depth:   usize,
    /// Where hoisted declarations go while inside a loop.
    loop_anchor:  Option<usize>,
}

impl Compiler<Program> {
    /// Creates a compiler writing into a fresh [`Program`].
    #[must_use]
    pub fn with_program() -> Self {
        Self::new(Program::new())
    }
}

impl<S: CodeSink> Compiler<S> {
    #[must_use]
    pub fn new(sink: S) -> Self {
        Self { sink,
               symbols: SymbolTable::new(),
               counters: Counters::default(),
               function: None,
               loop_depth: 0,
               loop_anchor: None }
    }

    /// Consumes the compiler and returns its sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn emit(&mut self, instruction: Instruction) {
        self.sink.emit(instruction);
    }

    /// The frame new variables are declared in.
    ///
    /// Function bodies use the local frame of their call. Everything else,
    /// loop bodies at the top level included, lives in the global frame.
    #[must_use]
    pub const fn frame(&self) -> Frame {
        if self.function.is_some() { Frame::Local } else { Frame::Global }
    }

    /// Marks the start of a loop. Declarations made until the matching
    /// [`Compiler::exit_loop`] are placed in front of the outermost loop.
    pub fn enter_loop(&mut self) {
        if self.loop_depth == 0 {
            self.loop_anchor = Some(self.sink.position());
        }
        self.loop_depth += 1;
    }

    pub fn exit_loop(&mut self) {
        self.loop_depth = self.loop_depth.saturating_sub(1);
        if self.loop_depth == 0 {
            self.loop_anchor = None;
        }
    }

    /// Emits `DEFVAR` for `variable`, ahead of the outermost loop if one is
    /// open, so that no iteration declares it twice.
    pub fn declare_storage(&mut self, variable: &Operand) {
        let instruction = Instruction::DefVar(variable.clone());

        match self.loop_anchor {
            Some(anchor) => {
                self.sink.insert(anchor, instruction);
                self.loop_anchor = Some(anchor + 1);
            },
            None => self.sink.emit(instruction),
        }
    }

    /// Declares a compiler-generated variable in the current frame.
    pub fn declare_temporary(&mut self, name: String) -> Operand {
        let variable = Operand::var(self.frame(), name);
        self.declare_storage(&variable);
        variable
    }

    #[must_use]
    pub fn scratch(name: &str) -> Operand {
        Operand::var(Frame::Global, name)
    }

    pub const fn next_if(&mut self) -> usize {
        let id = self.counters.ifs;
        self.counters.ifs += 1;
        id
    }

    pub const fn next_while(&mut self) -> usize {
        let id = self.counters.whiles;
        self.counters.whiles += 1;
        id
    }

    pub const fn next_coalesce(&mut self) -> usize {
        let id = self.counters.coalesces;
        self.counters.coalesces += 1;
        id
    }

    pub const fn next_builtin(&mut self) -> usize {
        let id = self.counters.builtins;
        self.counters.builtins += 1;
        id
    }
}
