use std::iter::Peekable;

use crate::{
    compiler::{
        codegen::{CodeSink, Instruction},
        context::{Compiler, SCRATCH_DISCARD, SCRATCH_LHS, SCRATCH_RHS},
        lexer::Token,
        parser::{
            function::{collect_signatures, parse_function},
            statement::parse_statement,
        },
        types::ValueType,
    },
    error::{CompileError, CompileResult, SyntaxError},
};

/// Compiles a whole program.
///
/// Function signatures are collected first so that calls may appear before
/// the definition. The scratch globals used by multi-step operators are
/// declared next, then the top level is compiled statement by statement.
///
/// # Parameters
/// - `tokens`: Token iterator providing `(Token, line)` pairs.
/// - `ctx`: The compiler state receiving the instructions.
pub fn compile_program<'a, I, S>(tokens: &mut Peekable<I>, ctx: &mut Compiler<S>) -> CompileResult<()>
    where I: Iterator<Item = &'a (Token, usize)> + Clone,
          S: CodeSink
{
    collect_signatures(tokens.clone(), ctx)?;

    for name in [SCRATCH_LHS, SCRATCH_RHS, SCRATCH_DISCARD] {
        ctx.emit(Instruction::DefVar(Compiler::<S>::scratch(name)));
    }

    loop {
        skip_newlines(tokens);

        match tokens.peek().copied() {
            None => break,
            Some((Token::Func, line)) => parse_function(tokens, ctx, *line)?,
            Some(_) => parse_statement(tokens, ctx)?,
        }
    }

    log::info!("compiled {} if, {} while statements",
               ctx.counters.ifs,
               ctx.counters.whiles);
    Ok(())
}

/// The error for an unusable token, or for running out of tokens.
pub fn unexpected(item: Option<&(Token, usize)>, line: usize) -> CompileError {
    match item {
        Some((token, line)) => SyntaxError::UnexpectedToken { token: token.to_string(),
                                                              line:  *line, }.into(),
        None => SyntaxError::UnexpectedEndOfInput { line }.into(),
    }
}

/// Consumes `expected` and returns its line.
pub fn expect<'a, I>(tokens: &mut Peekable<I>, expected: &Token, line: usize) -> CompileResult<usize>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    match tokens.next() {
        Some((token, line)) if token == expected => Ok(*line),
        other => Err(unexpected(other, line)),
    }
}

/// Consumes an identifier and returns its name and line.
pub fn expect_identifier<'a, I>(tokens: &mut Peekable<I>, line: usize) -> CompileResult<(String, usize)>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    match tokens.next() {
        Some((Token::Identifier(name), line)) => Ok((name.clone(), *line)),
        other => Err(unexpected(other, line)),
    }
}

/// Consumes a type name.
pub fn parse_type<'a, I>(tokens: &mut Peekable<I>, line: usize) -> CompileResult<ValueType>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    match tokens.next() {
        Some((Token::Type(ty), _)) => Ok(*ty),
        other => Err(unexpected(other, line)),
    }
}

pub fn skip_newlines<'a, I>(tokens: &mut Peekable<I>)
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    while let Some((Token::NewLine, _)) = tokens.peek() {
        tokens.next();
    }
}

/// Checks that a statement is over: at a line break, which is consumed, or
/// before a closing brace or the end of input.
pub fn expect_statement_end<'a, I>(tokens: &mut Peekable<I>, line: usize) -> CompileResult<()>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    match tokens.peek() {
        Some((Token::NewLine, _)) => {
            tokens.next();
            Ok(())
        },
        Some((Token::RBrace, _)) | None => Ok(()),
        other => Err(unexpected(other.copied(), line)),
    }
}

/// Returns `true` if the next token is `expected`, without consuming it.
pub fn next_is<'a, I>(tokens: &mut Peekable<I>, expected: &Token) -> bool
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    tokens.peek().is_some_and(|(token, _)| token == expected)
}

/// Returns `true` if the tokens start with `name(`, a call.
pub fn is_call_ahead<'a, I>(tokens: &Peekable<I>) -> bool
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut ahead = tokens.clone();
    matches!(ahead.next(), Some((Token::Identifier(_), _)))
    && matches!(ahead.next(), Some((Token::LParen, _)))
}
