use std::iter::Peekable;

use crate::{
    compiler::{
        codegen::{CodeSink, Instruction, Operand},
        context::Compiler,
        expression::{
            ExpressionContext,
            compile_expression,
            condition::{Condition, ConditionKind},
        },
        lexer::Token,
        parser::{
            core::{expect, expect_identifier, skip_newlines, unexpected},
            statement::parse_statement,
        },
        symtable::Variable,
    },
    error::{CompileResult, SemanticError},
};

/// Parses `{ statements }` in a new scope.
///
/// `shadow` is declared in the new scope before the first statement.
pub fn parse_block<'a, I, S>(tokens: &mut Peekable<I>,
                             ctx: &mut Compiler<S>,
                             line: usize,
                             shadow: Option<(String, Variable)>)
                             -> CompileResult<()>
    where I: Iterator<Item = &'a (Token, usize)> + Clone,
          S: CodeSink
{
    skip_newlines(tokens);
    let line = expect(tokens, &Token::LBrace, line)?;

    ctx.symbols.push_scope();
    if let Some((name, variable)) = shadow {
        ctx.symbols.declare(&name, variable, line)?;
    }

    loop {
        skip_newlines(tokens);

        match tokens.peek().copied() {
            Some((Token::RBrace, _)) => {
                tokens.next();
                break;
            },
            None => return Err(unexpected(None, line)),
            Some(_) => parse_statement(tokens, ctx)?,
        }
    }

    ctx.symbols.pop_scope();
    Ok(())
}

/// Parses an `if` statement after the keyword.
///
/// Syntax:
/// ```text
///     if <condition> { ... } [else { ... }]
///     if let <name> { ... } [else { ... }]
/// ```
/// The condition jumps to the then-branch; falling through leads to the
/// else-branch, or straight to the end without one.
pub fn parse_if<'a, I, S>(tokens: &mut Peekable<I>, ctx: &mut Compiler<S>, line: usize) -> CompileResult<()>
    where I: Iterator<Item = &'a (Token, usize)> + Clone,
          S: CodeSink
{
    let condition = Condition::new(ConditionKind::If, ctx.next_if());

    let shadow = if let Some((Token::Let, _)) = tokens.peek() {
        tokens.next();
        Some(parse_if_let(tokens, ctx, condition, line)?)
    } else {
        compile_expression(tokens, ctx, &ExpressionContext::Condition(condition))?;
        None
    };

    parse_block(tokens, ctx, line, shadow)?;
    ctx.emit(Instruction::Jump(condition.end_label()));
    ctx.emit(Instruction::Label(condition.false_label()));

    let mut ahead = tokens.clone();
    skip_newlines(&mut ahead);
    if let Some((Token::Else, _)) = ahead.peek() {
        skip_newlines(tokens);
        tokens.next();
        parse_block(tokens, ctx, line, None)?;
    }

    ctx.emit(Instruction::Label(condition.end_label()));
    Ok(())
}

/// Compiles the nil test of `if let name` and returns the non-optional
/// variable that shadows `name` in the then-branch.
fn parse_if_let<'a, I, S>(tokens: &mut Peekable<I>,
                          ctx: &mut Compiler<S>,
                          condition: Condition,
                          line: usize)
                          -> CompileResult<(String, Variable)>
    where I: Iterator<Item = &'a (Token, usize)> + Clone,
          S: CodeSink
{
    let (name, line) = expect_identifier(tokens, line)?;

    let Some(variable) = ctx.symbols.lookup(&name).filter(|v| v.initialized).cloned() else {
        return Err(SemanticError::UninitializedVariable { name, line }.into());
    };

    if !variable.ty.is_optional() {
        return Err(SemanticError::TypeMismatch { details: format!("'if let' needs an optional, '{name}' is {}",
                                                                  variable.ty),
                                                 line }.into());
    }

    ctx.emit(Instruction::JumpIfNeq(condition.true_label(), variable.storage.clone(), Operand::Nil));
    ctx.emit(Instruction::Jump(condition.false_label()));
    ctx.emit(Instruction::Label(condition.true_label()));

    let unwrapped = Variable { ty:          variable.ty.unwrapped(),
                               initialized: true,
                               constant:    true,
                               storage:     variable.storage, };
    Ok((name, unwrapped))
}

/// Parses a `while` statement after the keyword.
///
/// The condition starts with the label the body jumps back to. Declarations
/// anywhere inside the loop are hoisted in front of it.
pub fn parse_while<'a, I, S>(tokens: &mut Peekable<I>,
                             ctx: &mut Compiler<S>,
                             line: usize)
                             -> CompileResult<()>
    where I: Iterator<Item = &'a (Token, usize)> + Clone,
          S: CodeSink
{
    let condition = Condition::new(ConditionKind::While, ctx.next_while());

    ctx.enter_loop();
    compile_expression(tokens, ctx, &ExpressionContext::Condition(condition))?;
    parse_block(tokens, ctx, line, None)?;
    ctx.emit(Instruction::Jump(condition.check_label()));
    ctx.emit(Instruction::Label(condition.end_label()));
    ctx.exit_loop();

    Ok(())
}
