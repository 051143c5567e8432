use crate::{
    compiler::{
        codegen::{CodeSink, Instruction, Operand},
        context::Compiler,
        expression::rules::BinaryOp,
    },
    error::{CompileResult, SyntaxError},
};

/// Which statement a condition belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionKind {
    If,
    While,
}

/// A numbered `if` or `while` condition.
///
/// The number namespaces every label and temporary the construct uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Condition {
    pub kind: ConditionKind,
    pub id:   usize,
}

impl Condition {
    #[must_use]
    pub const fn new(kind: ConditionKind, id: usize) -> Self {
        Self { kind, id }
    }

    fn prefix(self) -> String {
        match self.kind {
            ConditionKind::If => format!("if${}", self.id),
            ConditionKind::While => format!("while${}", self.id),
        }
    }

    /// Start of the body, the target of the conditional jump.
    #[must_use]
    pub fn true_label(self) -> String {
        match self.kind {
            ConditionKind::If => format!("{}$true", self.prefix()),
            ConditionKind::While => format!("{}$body", self.prefix()),
        }
    }

    /// Where control goes when the condition does not hold.
    #[must_use]
    pub fn false_label(self) -> String {
        match self.kind {
            ConditionKind::If => format!("{}$false", self.prefix()),
            ConditionKind::While => format!("{}$end", self.prefix()),
        }
    }

    /// Re-entry point of a loop.
    #[must_use]
    pub fn check_label(self) -> String {
        format!("{}$check", self.prefix())
    }

    /// End of the whole statement.
    #[must_use]
    pub fn end_label(self) -> String {
        format!("{}$end", self.prefix())
    }
}

/// Emits what precedes the operand loads of a condition: the label a loop
/// jumps back to.
pub fn begin<S: CodeSink>(ctx: &mut Compiler<S>, condition: Condition) {
    if condition.kind == ConditionKind::While {
        ctx.emit(Instruction::Label(condition.check_label()));
    }
}

/// Emits the test of a relational condition whose two operands are on the
/// data stack.
///
/// The operands are popped into temporaries. Equality jumps on them directly.
/// Strict orderings compute one comparison, and non-strict orderings OR a
/// strict comparison with an equality. The single conditional jump then
/// checks the result against `false`. Afterwards control continues at the
/// false branch, and the true label is placed for the body.
///
/// # Errors
/// Returns [`SyntaxError::UnsupportedCondition`] for a non-relational
/// operator.
pub fn emit_test<S: CodeSink>(ctx: &mut Compiler<S>,
                              condition: Condition,
                              op: BinaryOp,
                              line: usize)
                              -> CompileResult<()> {
    if !op.is_relational() {
        return Err(SyntaxError::UnsupportedCondition { line }.into());
    }

    log::debug!("condition {} uses {op}", condition.prefix());

    let prefix = condition.prefix();
    let target = condition.true_label();
    let lhs = ctx.declare_temporary(format!("{prefix}$lhs"));
    let rhs = ctx.declare_temporary(format!("{prefix}$rhs"));

    ctx.emit(Instruction::PopS(rhs.clone()));
    ctx.emit(Instruction::PopS(lhs.clone()));

    match op {
        BinaryOp::Eq => ctx.emit(Instruction::JumpIfEq(target, lhs, rhs)),
        BinaryOp::NotEq => ctx.emit(Instruction::JumpIfNeq(target, lhs, rhs)),
        BinaryOp::Less | BinaryOp::Greater => {
            let result = ctx.declare_temporary(format!("{prefix}$result"));
            ctx.emit(ordering(op, result.clone(), lhs, rhs));
            jump_unless_false(ctx, target, result);
        },
        _ => {
            let strict = if op == BinaryOp::LessEq { "lt" } else { "gt" };
            let ordered = ctx.declare_temporary(format!("{prefix}${strict}"));
            let equal = ctx.declare_temporary(format!("{prefix}$eq"));
            let result = ctx.declare_temporary(format!("{prefix}$result"));

            ctx.emit(ordering(op, ordered.clone(), lhs.clone(), rhs.clone()));
            ctx.emit(Instruction::Eq(equal.clone(), lhs, rhs));
            ctx.emit(Instruction::Or(result.clone(), ordered, equal));
            jump_unless_false(ctx, target, result);
        },
    }

    ctx.emit(Instruction::Jump(condition.false_label()));
    ctx.emit(Instruction::Label(condition.true_label()));
    Ok(())
}

fn ordering(op: BinaryOp, result: Operand, lhs: Operand, rhs: Operand) -> Instruction {
    match op {
        BinaryOp::Less | BinaryOp::LessEq => Instruction::Lt(result, lhs, rhs),
        _ => Instruction::Gt(result, lhs, rhs),
    }
}

fn jump_unless_false<S: CodeSink>(ctx: &mut Compiler<S>, target: String, result: Operand) {
    ctx.emit(Instruction::JumpIfNeq(target, result, Operand::Bool(false)));
}
