use std::iter::Peekable;

use crate::{
    compiler::{
        codegen::{CodeSink, Instruction},
        context::Compiler,
        expression::{
            condition::{self, Condition},
            emit,
            precedence::{Action, Symbol, classify, relation},
            rules::{self, Rule},
            stack::{OperandStack, StackItem},
        },
        lexer::Token,
        types::ValueType,
    },
    error::{CompileError, CompileResult, SemanticError, SyntaxError},
};

/// The statement an expression belongs to. Selects the checks applied to the
/// final type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpressionContext {
    /// `let`/`var` initializer. Without a declared type, the inferred type is
    /// adopted.
    Initializer {
        name:     String,
        declared: Option<ValueType>,
    },
    /// Right-hand side of `name = ...`.
    Assignment {
        name:   String,
        target: ValueType,
    },
    /// Condition of an `if` or `while`; emits the conditional jump.
    Condition(Condition),
    /// Value of a `return` inside the current function.
    Return,
}

/// Parses, type checks and emits one expression.
///
/// Tokens are consumed up to, but not including, the first token that cannot
/// continue the expression. Loads are emitted as operands are shifted and
/// operators as they are reduced, so on success the value is on top of the
/// data stack. Conditions instead end with a jump and leave the stack as they
/// found it.
///
/// Returns the type of the expression after the context checks. For an
/// untyped initializer that is the inferred type.
///
/// # Errors
/// - Syntax errors for token sequences the precedence table or the rules
///   reject, and for an empty expression.
/// - Semantic errors from typing and from the context checks.
pub fn compile_expression<'a, I, S>(tokens: &mut Peekable<I>,
                                    ctx: &mut Compiler<S>,
                                    context: &ExpressionContext)
                                    -> CompileResult<ValueType>
    where I: Iterator<Item = &'a (Token, usize)> + Clone,
          S: CodeSink
{
    let start_line = tokens.peek().map_or(0, |(_, line)| *line);
    let condition = match context {
        ExpressionContext::Condition(condition) => Some(*condition),
        _ => None,
    };

    if let Some(condition) = condition {
        condition::begin(ctx, condition);
    }

    let mut stack = OperandStack::new();
    let mut tested = false;
    let mut line = start_line;

    loop {
        let lookahead = tokens.peek().copied();
        if let Some((_, token_line)) = lookahead {
            line = *token_line;
        }

        let symbol = classify(lookahead.map(|(token, _)| token));
        let top = stack.top_terminal();
        let action = relation(top, symbol);
        log::trace!("{top:?} / {symbol:?} -> {action:?}");

        match (action, lookahead) {
            (Action::Shift, Some(item)) => {
                log::debug!("shift {} over {top:?}", item.0);
                stack.push_boundary();
                stack.push(StackItem::terminal(symbol, operand_type(ctx, symbol, &item.0), item));
                if symbol == Symbol::Operand {
                    emit::load(ctx, &item.0);
                }
                tokens.next();
            },

            (Action::Equal, Some(item)) => {
                stack.push(StackItem::terminal(symbol, ValueType::Undefined, item));
                tokens.next();
            },

            (Action::Reduce, _) => {
                let reduction = rules::resolve(stack.handle(), line)?;
                log::debug!("reduce {:?} to {}", reduction.rule, reduction.result.ty);

                if let Rule::Binary { op, right, .. } = reduction.rule {
                    emit::promote(ctx, reduction.promotion);

                    match condition {
                        Some(condition) if op.is_relational() && !tested => {
                            condition::emit_test(ctx, condition, op, line)?;
                            tested = true;
                        },
                        _ => emit::operator(ctx, op, &right, reduction.result.ty),
                    }
                }

                stack.reduce(reduction.result);
            },

            (Action::Error, _) if top == Symbol::End && symbol == Symbol::End => break,

            (_, lookahead) => {
                let token = lookahead.map_or_else(|| "end of input".to_string(),
                                                  |(token, _)| token.to_string());
                return Err(SyntaxError::InvalidExpression { token, line }.into());
            },
        }
    }

    let Some(result) = stack.finished() else {
        if stack.has_boundary() {
            return Err(CompileError::Internal { details: "boundary left on the expression stack".to_string() });
        }
        return Err(SyntaxError::ExpectedExpression { line: start_line }.into());
    };

    check_context(ctx, context, &result, tested, start_line)
}

/// Type of a shifted item. Operators have none; identifiers without a value
/// are `Undefined`.
fn operand_type<S: CodeSink>(ctx: &Compiler<S>, symbol: Symbol, token: &Token) -> ValueType {
    if symbol != Symbol::Operand {
        return ValueType::Undefined;
    }

    match token {
        Token::Integer(_) => ValueType::Int,
        Token::Double(_) => ValueType::Double,
        Token::Str(_) => ValueType::String,
        Token::Nil => ValueType::Nil,
        Token::Identifier(name) => ctx.symbols
                                      .lookup(name)
                                      .filter(|variable| variable.initialized)
                                      .map_or(ValueType::Undefined, |variable| variable.ty),
        _ => ValueType::Undefined,
    }
}

fn check_context<S: CodeSink>(ctx: &mut Compiler<S>,
                              context: &ExpressionContext,
                              result: &StackItem<'_>,
                              tested: bool,
                              line: usize)
                              -> CompileResult<ValueType> {
    match context {
        ExpressionContext::Initializer { name, declared: None } => match result.ty {
            ValueType::Nil | ValueType::Void | ValueType::Undefined => {
                Err(SemanticError::CannotInferType { name: name.clone(),
                                                     line }.into())
            },
            ty => Ok(ty),
        },

        ExpressionContext::Initializer { name,
                                         declared: Some(target), }
        | ExpressionContext::Assignment { name, target } => {
            coerce(ctx, *target, result).ok_or_else(|| {
                                            SemanticError::TypeMismatch { details: format!("cannot store {} in '{name}' of type {target}",
                                                                                           result.ty),
                                                                          line }.into()
                                        })
        },

        ExpressionContext::Condition(_) => {
            if result.ty != ValueType::Bool {
                return Err(SemanticError::TypeMismatch { details: format!("condition must be Bool, found {}",
                                                                          result.ty),
                                                         line }.into());
            }
            if !tested {
                return Err(SyntaxError::UnsupportedCondition { line }.into());
            }
            Ok(ValueType::Bool)
        },

        ExpressionContext::Return => {
            let Some(function) = ctx.function.clone() else {
                return Err(SyntaxError::ReturnOutsideFunction { line }.into());
            };

            coerce(ctx, function.ret, result).ok_or_else(|| {
                SemanticError::ReturnTypeMismatch { details: format!("'{}' returns {}, found {}",
                                                                     function.name,
                                                                     function.ret,
                                                                     result.ty),
                                                    line }.into()
            })
        },
    }
}

/// Checks that `result` fits a slot of type `target`, converting a bare
/// integer literal for a double slot.
fn coerce<S: CodeSink>(ctx: &mut Compiler<S>,
                       target: ValueType,
                       result: &StackItem<'_>)
                       -> Option<ValueType> {
    if target.accepts(result.ty) {
        return Some(target);
    }

    if target.unwrapped() == ValueType::Double && result.is_int_literal() {
        ctx.emit(Instruction::Int2FloatS);
        return Some(target);
    }

    None
}
