use std::iter::Peekable;

use ordered_float::OrderedFloat;

use crate::{
    compiler::{
        codegen::{CodeSink, Frame, Instruction, Operand},
        context::Compiler,
        expression::emit::literal_operand,
        lexer::Token,
        parser::{
            core::{expect, expect_identifier, next_is, unexpected},
            function::{argument_slot, function_label},
        },
        symtable::{Param, Signature},
        types::ValueType,
    },
    error::{CompileResult, SemanticError},
};

/// One argument at a call site.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Argument {
    label:   Option<String>,
    value:   Operand,
    ty:      ValueType,
    /// The argument is an integer literal.
    literal: Option<i64>,
}

/// Compiles `name(args)` and returns the callee's return type.
///
/// Syntax:
/// ```text
///     name '(' [[label ':'] term {',' [label ':'] term}] ')'
///     term := identifier | literal | nil
/// ```
/// Built-ins are expanded inline. User functions get a fresh temporary frame
/// with one slot per argument. A returned value is left on the data stack.
pub fn compile_call<'a, I, S>(tokens: &mut Peekable<I>,
                              ctx: &mut Compiler<S>,
                              line: usize)
                              -> CompileResult<ValueType>
    where I: Iterator<Item = &'a (Token, usize)> + Clone,
          S: CodeSink
{
    let (name, line) = expect_identifier(tokens, line)?;

    let Some(signature) = ctx.symbols.function(&name).cloned() else {
        return Err(SemanticError::UndefinedFunction { name, line }.into());
    };

    expect(tokens, &Token::LParen, line)?;

    let mut args = Vec::new();
    if !next_is(tokens, &Token::RParen) {
        loop {
            args.push(parse_argument(tokens, ctx, line)?);
            if !next_is(tokens, &Token::Comma) {
                break;
            }
            tokens.next();
        }
    }
    expect(tokens, &Token::RParen, line)?;

    let values = check_arguments(&name, &signature, &args, line)?;

    if let Some(builtin) = signature.builtin {
        builtin.emit(ctx, &values);
    } else {
        ctx.emit(Instruction::CreateFrame);
        for (index, value) in values.into_iter().enumerate() {
            let slot = Operand::var(Frame::Temporary, argument_slot(index));
            ctx.emit(Instruction::DefVar(slot.clone()));
            ctx.emit(Instruction::Move(slot, value));
        }
        ctx.emit(Instruction::Call(function_label(&name)));
    }

    Ok(signature.ret)
}

fn parse_argument<'a, I, S>(tokens: &mut Peekable<I>,
                            ctx: &Compiler<S>,
                            line: usize)
                            -> CompileResult<Argument>
    where I: Iterator<Item = &'a (Token, usize)> + Clone,
          S: CodeSink
{
    let mut ahead = tokens.clone();
    let label = match (ahead.next(), ahead.next()) {
        (Some((Token::Identifier(label), _)), Some((Token::Colon, _))) => {
            tokens.next();
            tokens.next();
            Some(label.clone())
        },
        _ => None,
    };

    let Some(item) = tokens.next() else {
        return Err(unexpected(None, line));
    };

    match item {
        (Token::Identifier(name), line) => {
            let Some(variable) = ctx.symbols.lookup(name).filter(|v| v.initialized) else {
                return Err(SemanticError::UninitializedVariable { name: name.clone(),
                                                                  line: *line, }.into());
            };
            Ok(Argument { label,
                          value: variable.storage.clone(),
                          ty: variable.ty,
                          literal: None })
        },
        (token, line) => {
            let Some(value) = literal_operand(token) else {
                return Err(unexpected(Some(item), *line));
            };
            let (ty, literal) = match token {
                Token::Integer(value) => (ValueType::Int, Some(*value)),
                Token::Double(_) => (ValueType::Double, None),
                Token::Str(_) => (ValueType::String, None),
                _ => (ValueType::Nil, None),
            };
            Ok(Argument { label,
                          value,
                          ty,
                          literal })
        },
    }
}

/// Matches arguments to parameters by position, label and type.
///
/// Returns the operands to pass, with integer literals given to `Double`
/// parameters already converted.
fn check_arguments(name: &str,
                   signature: &Signature,
                   args: &[Argument],
                   line: usize)
                   -> CompileResult<Vec<Operand>> {
    if signature.variadic {
        return Ok(args.iter().map(|arg| arg.value.clone()).collect());
    }

    if args.len() != signature.params.len() {
        return Err(SemanticError::ArgumentMismatch { details: format!("'{name}' takes {} arguments, {} given",
                                                                      signature.params.len(),
                                                                      args.len()),
                                                     line }.into());
    }

    signature.params
             .iter()
             .zip(args)
             .map(|(param, arg)| check_argument(name, param, arg, line))
             .collect()
}

#[allow(clippy::cast_precision_loss)]
fn check_argument(name: &str, param: &Param, arg: &Argument, line: usize) -> CompileResult<Operand> {
    if param.label != arg.label {
        let expected = param.label.as_deref().unwrap_or("_");
        return Err(SemanticError::ArgumentMismatch { details: format!("'{name}' expects label '{expected}' for '{}'",
                                                                      param.name),
                                                     line }.into());
    }

    if param.ty.accepts(arg.ty) {
        return Ok(arg.value.clone());
    }

    if let Some(value) = arg.literal
       && param.ty.unwrapped() == ValueType::Double
    {
        return Ok(Operand::Float(OrderedFloat(value as f64)));
    }

    Err(SemanticError::ArgumentMismatch { details: format!("'{name}' expects {} for '{}', found {}",
                                                           param.ty, param.name, arg.ty),
                                          line }.into())
}
