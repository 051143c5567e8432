use crate::compiler::{
    codegen::{CodeSink, Instruction, Operand},
    context::{Compiler, SCRATCH_LHS, SCRATCH_RHS},
    expression::{
        rules::{BinaryOp, Promotion},
        stack::StackItem,
    },
    lexer::Token,
    types::ValueType,
};

/// The constant operand of a literal token.
#[must_use]
pub fn literal_operand(token: &Token) -> Option<Operand> {
    match token {
        Token::Integer(value) => Some(Operand::Int(*value)),
        Token::Double(value) => Some(Operand::Float(*value)),
        Token::Str(value) => Some(Operand::Str(value.clone())),
        Token::Nil => Some(Operand::Nil),
        _ => None,
    }
}

/// Where an operand token's value comes from: a constant, or the storage of
/// an initialized variable.
#[must_use]
pub fn operand_location<S: CodeSink>(ctx: &Compiler<S>, token: &Token) -> Option<Operand> {
    match token {
        Token::Identifier(name) => ctx.symbols
                                      .lookup(name)
                                      .filter(|variable| variable.initialized)
                                      .map(|variable| variable.storage.clone()),
        other => literal_operand(other),
    }
}

/// Pushes a shifted operand onto the data stack.
///
/// Unknown or uninitialized identifiers emit nothing; the reduction that
/// consumes them reports the error.
pub fn load<S: CodeSink>(ctx: &mut Compiler<S>, token: &Token) {
    if let Some(location) = operand_location(ctx, token) {
        ctx.emit(Instruction::PushS(location));
    }
}

/// Converts an integer literal operand to a double in place.
pub fn promote<S: CodeSink>(ctx: &mut Compiler<S>, promotion: Promotion) {
    match promotion {
        Promotion::None => {},
        Promotion::Right => ctx.emit(Instruction::Int2FloatS),
        Promotion::Left => {
            let rhs = Compiler::<S>::scratch(SCRATCH_RHS);
            ctx.emit(Instruction::PopS(rhs.clone()));
            ctx.emit(Instruction::Int2FloatS);
            ctx.emit(Instruction::PushS(rhs));
        },
    }
}

/// Emits the instructions for a binary operator whose operands are already on
/// the data stack, leaving the result there.
pub fn operator<S: CodeSink>(ctx: &mut Compiler<S>,
                             op: BinaryOp,
                             right: &StackItem<'_>,
                             result: ValueType) {
    log::debug!("emit {op} -> {result}");

    match op {
        BinaryOp::Mul => ctx.emit(Instruction::MulS),
        BinaryOp::Add if result == ValueType::String => concat(ctx),
        BinaryOp::Add => ctx.emit(Instruction::AddS),
        BinaryOp::Sub => ctx.emit(Instruction::SubS),
        BinaryOp::Div => ctx.emit(divide(right, result)),
        BinaryOp::Eq => ctx.emit(Instruction::EqS),
        BinaryOp::NotEq => {
            ctx.emit(Instruction::EqS);
            ctx.emit(Instruction::NotS);
        },
        BinaryOp::Less => ctx.emit(Instruction::LtS),
        BinaryOp::Greater => ctx.emit(Instruction::GtS),
        BinaryOp::LessEq => {
            ctx.emit(Instruction::GtS);
            ctx.emit(Instruction::NotS);
        },
        BinaryOp::GreaterEq => {
            ctx.emit(Instruction::LtS);
            ctx.emit(Instruction::NotS);
        },
        BinaryOp::Coalesce => coalesce(ctx),
    }
}

/// Picks the division by the right operand's literal kind. A promoted
/// integer literal and a non-literal operand follow the result type.
fn divide(right: &StackItem<'_>, result: ValueType) -> Instruction {
    if right.is_double_literal() || result == ValueType::Double {
        Instruction::DivS
    } else {
        Instruction::IDivS
    }
}

fn concat<S: CodeSink>(ctx: &mut Compiler<S>) {
    let lhs = Compiler::<S>::scratch(SCRATCH_LHS);
    let rhs = Compiler::<S>::scratch(SCRATCH_RHS);

    ctx.emit(Instruction::PopS(rhs.clone()));
    ctx.emit(Instruction::PopS(lhs.clone()));
    ctx.emit(Instruction::Concat(lhs.clone(), lhs.clone(), rhs));
    ctx.emit(Instruction::PushS(lhs));
}

fn coalesce<S: CodeSink>(ctx: &mut Compiler<S>) {
    let id = ctx.next_coalesce();
    let on_nil = format!("coalesce${id}$nil");
    let end = format!("coalesce${id}$end");
    let lhs = Compiler::<S>::scratch(SCRATCH_LHS);
    let rhs = Compiler::<S>::scratch(SCRATCH_RHS);

    ctx.emit(Instruction::PopS(rhs.clone()));
    ctx.emit(Instruction::PopS(lhs.clone()));
    ctx.emit(Instruction::JumpIfEq(on_nil.clone(), lhs.clone(), Operand::Nil));
    ctx.emit(Instruction::PushS(lhs));
    ctx.emit(Instruction::Jump(end.clone()));
    ctx.emit(Instruction::Label(on_nil));
    ctx.emit(Instruction::PushS(rhs));
    ctx.emit(Instruction::Label(end));
}
