use std::iter::Peekable;

use crate::{
    compiler::{
        codegen::{CodeSink, Frame, Instruction, Operand},
        context::{Compiler, FunctionContext},
        lexer::Token,
        parser::{
            block::parse_block,
            core::{expect, expect_identifier, next_is, parse_type, unexpected},
        },
        symtable::{Param, Signature, Variable},
        types::ValueType,
    },
    error::{CompileResult, SemanticError, SyntaxError},
};

/// Label of a user function's entry point.
#[must_use]
pub fn function_label(name: &str) -> String {
    format!("${name}")
}

/// Name of the `index`-th argument slot in the callee's frame.
#[must_use]
pub fn argument_slot(index: usize) -> String {
    format!("%{index}")
}

/// Registers the signature of every function in the program.
///
/// Runs over a copy of the token stream before compilation starts.
pub fn collect_signatures<'a, I, S>(tokens: Peekable<I>, ctx: &mut Compiler<S>) -> CompileResult<()>
    where I: Iterator<Item = &'a (Token, usize)> + Clone,
          S: CodeSink
{
    let mut tokens = tokens;

    while let Some((token, line)) = tokens.next() {
        if *token == Token::Func {
            let (name, signature) = parse_signature(&mut tokens, *line)?;
            log::debug!("found function {name} with {} parameters", signature.params.len());
            ctx.symbols.declare_function(&name, signature, *line)?;
        }
    }

    Ok(())
}

/// Parses a function header after `func`.
///
/// Syntax:
/// ```text
///     name '(' [param {',' param}] ')' ['->' type]
///     param := (label | '_') name ':' type
/// ```
pub fn parse_signature<'a, I>(tokens: &mut Peekable<I>, line: usize) -> CompileResult<(String, Signature)>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let (name, line) = expect_identifier(tokens, line)?;
    expect(tokens, &Token::LParen, line)?;

    let mut params = Vec::new();
    if !next_is(tokens, &Token::RParen) {
        loop {
            params.push(parse_param(tokens, line)?);
            if !next_is(tokens, &Token::Comma) {
                break;
            }
            tokens.next();
        }
    }
    expect(tokens, &Token::RParen, line)?;

    let ret = if next_is(tokens, &Token::Arrow) {
        tokens.next();
        parse_type(tokens, line)?
    } else {
        ValueType::Void
    };

    Ok((name,
        Signature { params,
                    ret,
                    variadic: false,
                    builtin: None }))
}

fn parse_param<'a, I>(tokens: &mut Peekable<I>, line: usize) -> CompileResult<Param>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let label = match tokens.next() {
        Some((Token::Identifier(label), _)) => Some(label.clone()),
        Some((Token::Underscore, _)) => None,
        other => return Err(unexpected(other, line)),
    };

    let (name, line) = expect_identifier(tokens, line)?;
    expect(tokens, &Token::Colon, line)?;
    let ty = parse_type(tokens, line)?;

    if label.as_deref() == Some(name.as_str()) {
        return Err(SemanticError::InvalidParameter { name, line }.into());
    }

    Ok(Param { label, name, ty })
}

/// Compiles a function definition starting at `func`.
///
/// The body is placed inline behind a jump that skips it. On entry the
/// argument frame becomes the local frame and the arguments are copied into
/// named locals. Falling off the end returns without a value, which only
/// void functions may do.
pub fn parse_function<'a, I, S>(tokens: &mut Peekable<I>,
                                ctx: &mut Compiler<S>,
                                line: usize)
                                -> CompileResult<()>
    where I: Iterator<Item = &'a (Token, usize)> + Clone,
          S: CodeSink
{
    expect(tokens, &Token::Func, line)?;
    let (name, signature) = parse_signature(tokens, line)?;

    if !ctx.symbols.at_top_level() || ctx.function.is_some() {
        return Err(SyntaxError::NestedFunction { name, line }.into());
    }

    let label = function_label(&name);
    let skip = format!("{label}$end");

    ctx.emit(Instruction::Jump(skip.clone()));
    ctx.emit(Instruction::Label(label));
    ctx.emit(Instruction::PushFrame);

    ctx.function = Some(FunctionContext { name:    name.clone(),
                                          ret:     signature.ret,
                                          returns: false, });
    ctx.symbols.push_scope();

    for (index, param) in signature.params.iter().enumerate() {
        let storage = Operand::var(Frame::Local, ctx.symbols.storage_name(&param.name));
        ctx.declare_storage(&storage);
        ctx.emit(Instruction::Move(storage.clone(), Operand::var(Frame::Local, argument_slot(index))));

        let variable = Variable { ty: param.ty,
                                  initialized: true,
                                  constant: true,
                                  storage };
        ctx.symbols.declare(&param.name, variable, line)?;
    }

    parse_block(tokens, ctx, line, None)?;

    ctx.symbols.pop_scope();
    let returns = ctx.function.take().is_some_and(|function| function.returns);

    if signature.ret != ValueType::Void && !returns {
        return Err(SemanticError::MissingReturnValue { function: name,
                                                       line }.into());
    }

    ctx.emit(Instruction::PopFrame);
    ctx.emit(Instruction::Return);
    ctx.emit(Instruction::Label(skip));
    Ok(())
}
