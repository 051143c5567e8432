use std::iter::Peekable;

use crate::{
    compiler::{
        codegen::{CodeSink, Instruction, Operand},
        context::{Compiler, SCRATCH_DISCARD},
        expression::{ExpressionContext, compile_expression},
        lexer::Token,
        parser::{
            block::{parse_if, parse_while},
            call::compile_call,
            core::{
                expect, expect_identifier, expect_statement_end, is_call_ahead, next_is,
                parse_type, unexpected,
            },
        },
        symtable::Variable,
        types::ValueType,
    },
    error::{CompileResult, SemanticError, SyntaxError},
};

/// Parses and compiles a single statement, including its line break.
///
/// Grammar:
/// ```text
///     statement := var_def | assignment | if | while | call | return
/// ```
pub fn parse_statement<'a, I, S>(tokens: &mut Peekable<I>, ctx: &mut Compiler<S>) -> CompileResult<()>
    where I: Iterator<Item = &'a (Token, usize)> + Clone,
          S: CodeSink
{
    let Some(item) = tokens.peek().copied() else {
        return Err(unexpected(None, 0));
    };
    let line = item.1;

    match &item.0 {
        Token::Let | Token::Var => {
            tokens.next();
            parse_var_def(tokens, ctx, item.0 == Token::Let, line)?;
        },
        Token::If => {
            tokens.next();
            parse_if(tokens, ctx, line)?;
        },
        Token::While => {
            tokens.next();
            parse_while(tokens, ctx, line)?;
        },
        Token::Return => {
            tokens.next();
            parse_return(tokens, ctx, line)?;
        },
        Token::Identifier(_) if is_call_ahead(tokens) => {
            let ret = compile_call(tokens, ctx, line)?;
            if ret != ValueType::Void {
                ctx.emit(Instruction::PopS(Compiler::<S>::scratch(SCRATCH_DISCARD)));
            }
        },
        Token::Identifier(name) => {
            tokens.next();
            parse_assignment(tokens, ctx, name, line)?;
        },
        Token::Func => {
            let name = match tokens.clone().nth(1) {
                Some((Token::Identifier(name), _)) => name.clone(),
                _ => "<anonymous>".to_string(),
            };
            return Err(SyntaxError::NestedFunction { name, line }.into());
        },
        _ => return Err(unexpected(Some(item), line)),
    }

    expect_statement_end(tokens, line)
}

/// Parses a variable declaration after its `let` or `var` keyword.
///
/// Syntax:
/// ```text
///     ('let' | 'var') name [':' type] ['=' (call | expression)]
/// ```
/// A declaration needs a type, an initializer or both. Optional variables
/// without an initializer start as `nil`. The new name is not visible inside
/// its own initializer.
pub fn parse_var_def<'a, I, S>(tokens: &mut Peekable<I>,
                               ctx: &mut Compiler<S>,
                               constant: bool,
                               line: usize)
                               -> CompileResult<()>
    where I: Iterator<Item = &'a (Token, usize)> + Clone,
          S: CodeSink
{
    let (name, line) = expect_identifier(tokens, line)?;

    let declared = if next_is(tokens, &Token::Colon) {
        tokens.next();
        Some(parse_type(tokens, line)?)
    } else {
        None
    };

    let storage = Operand::var(ctx.frame(), ctx.symbols.storage_name(&name));

    if !next_is(tokens, &Token::Equals) {
        let Some(ty) = declared else {
            return Err(SemanticError::CannotInferType { name, line }.into());
        };

        ctx.declare_storage(&storage);
        if ty.is_optional() {
            ctx.emit(Instruction::Move(storage.clone(), Operand::Nil));
        }

        let variable = Variable { ty,
                                  initialized: ty.is_optional(),
                                  constant,
                                  storage };
        return ctx.symbols.declare(&name, variable, line);
    }

    tokens.next();
    ctx.declare_storage(&storage);

    let ty = if is_call_ahead(tokens) {
        let ret = compile_call(tokens, ctx, line)?;
        call_result(declared, ret, &name, line)?
    } else {
        let context = ExpressionContext::Initializer { name: name.clone(),
                                                       declared };
        compile_expression(tokens, ctx, &context)?
    };

    log::debug!("declare {name}: {ty} at {storage}");
    ctx.emit(Instruction::PopS(storage.clone()));

    let variable = Variable { ty,
                              initialized: true,
                              constant,
                              storage };
    ctx.symbols.declare(&name, variable, line)
}

/// Parses `name = value` after the name.
pub fn parse_assignment<'a, I, S>(tokens: &mut Peekable<I>,
                                  ctx: &mut Compiler<S>,
                                  name: &str,
                                  line: usize)
                                  -> CompileResult<()>
    where I: Iterator<Item = &'a (Token, usize)> + Clone,
          S: CodeSink
{
    expect(tokens, &Token::Equals, line)?;

    let Some(variable) = ctx.symbols.lookup(name).cloned() else {
        return Err(SemanticError::UninitializedVariable { name: name.to_string(),
                                                          line }.into());
    };

    if variable.constant && variable.initialized {
        return Err(SemanticError::AssignToConstant { name: name.to_string(),
                                                     line }.into());
    }

    if is_call_ahead(tokens) {
        let ret = compile_call(tokens, ctx, line)?;
        call_result(Some(variable.ty), ret, name, line)?;
    } else {
        let context = ExpressionContext::Assignment { name:   name.to_string(),
                                                      target: variable.ty, };
        compile_expression(tokens, ctx, &context)?;
    }

    ctx.emit(Instruction::PopS(variable.storage));

    if let Some(variable) = ctx.symbols.lookup_mut(name) {
        variable.initialized = true;
    }
    Ok(())
}

/// Parses `return [expression]` after the keyword.
///
/// A value is left on the data stack for the caller; then the function's
/// frame is dropped and control returns.
pub fn parse_return<'a, I, S>(tokens: &mut Peekable<I>,
                              ctx: &mut Compiler<S>,
                              line: usize)
                              -> CompileResult<()>
    where I: Iterator<Item = &'a (Token, usize)> + Clone,
          S: CodeSink
{
    let Some(function) = ctx.function.clone() else {
        return Err(SyntaxError::ReturnOutsideFunction { line }.into());
    };

    let has_value = tokens.peek().is_some_and(|(token, _)| !token.ends_statement());

    match (has_value, function.ret == ValueType::Void) {
        (true, true) => {
            return Err(SemanticError::UnexpectedReturnValue { function: function.name,
                                                              line }.into());
        },
        (false, false) => {
            return Err(SemanticError::MissingReturnValue { function: function.name,
                                                           line }.into());
        },
        (true, false) => {
            compile_expression(tokens, ctx, &ExpressionContext::Return)?;
        },
        (false, true) => {},
    }

    ctx.emit(Instruction::PopFrame);
    ctx.emit(Instruction::Return);

    if let Some(function) = ctx.function.as_mut() {
        function.returns = true;
    }
    Ok(())
}

/// Checks a call result stored into a slot that may or may not have a
/// declared type.
fn call_result(declared: Option<ValueType>,
               ret: ValueType,
               name: &str,
               line: usize)
               -> CompileResult<ValueType> {
    match declared {
        _ if ret == ValueType::Void => {
            Err(SemanticError::TypeMismatch { details: format!("the call assigned to '{name}' returns no value"),
                                              line }.into())
        },
        None => Ok(ret),
        Some(target) if target.accepts(ret) => Ok(target),
        Some(target) => {
            Err(SemanticError::TypeMismatch { details: format!("cannot store {ret} in '{name}' of type {target}"),
                                              line }.into())
        },
    }
}
