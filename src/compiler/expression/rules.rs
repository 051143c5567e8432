use std::fmt;

use crate::{
    compiler::{
        expression::{precedence::Symbol, stack::StackItem},
        lexer::Token,
        types::ValueType,
    },
    error::{CompileResult, SemanticError, SyntaxError},
};

/// Binary operators of the expression grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Mul,
    Div,
    Add,
    Sub,
    Eq,
    NotEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    Coalesce,
}

impl BinaryOp {
    #[must_use]
    pub const fn from_symbol(symbol: Symbol) -> Option<Self> {
        match symbol {
            Symbol::Mul => Some(Self::Mul),
            Symbol::Div => Some(Self::Div),
            Symbol::Add => Some(Self::Add),
            Symbol::Sub => Some(Self::Sub),
            Symbol::Eq => Some(Self::Eq),
            Symbol::NotEq => Some(Self::NotEq),
            Symbol::Less => Some(Self::Less),
            Symbol::Greater => Some(Self::Greater),
            Symbol::LessEq => Some(Self::LessEq),
            Symbol::GreaterEq => Some(Self::GreaterEq),
            Symbol::Coalesce => Some(Self::Coalesce),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_relational(self) -> bool {
        matches!(self,
                 Self::Eq | Self::NotEq | Self::Less | Self::Greater | Self::LessEq | Self::GreaterEq)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Mul => "*",
            Self::Div => "/",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessEq => "<=",
            Self::GreaterEq => ">=",
            Self::Coalesce => "??",
        };
        write!(f, "{text}")
    }
}

/// Which integer literal operand has to be converted to a double.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Promotion {
    None,
    /// The left operand, which sits below the top of the data stack.
    Left,
    /// The right operand, on top of the data stack.
    Right,
}

/// The handle that was matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule<'a> {
    /// `E -> id`
    Operand,
    /// `E -> E!`
    Unwrap,
    /// `E -> (E)`
    Parens,
    /// `E -> E op E`
    Binary {
        op:    BinaryOp,
        left:  StackItem<'a>,
        right: StackItem<'a>,
    },
}

/// A typed reduction, ready to be emitted and pushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reduction<'a> {
    pub rule:      Rule<'a>,
    pub result:    StackItem<'a>,
    pub promotion: Promotion,
}

/// Matches a handle against the grammar and types the result.
///
/// `line` is used for errors about items that carry no token.
///
/// # Errors
/// - [`SyntaxError::NoMatchingRule`] when the handle is not a rule.
/// - [`SemanticError::UninitializedVariable`] for undefined operands.
/// - [`SemanticError::TypeMismatch`] for incompatible operands.
pub fn resolve<'a>(handle: &[StackItem<'a>], line: usize) -> CompileResult<Reduction<'a>> {
    match handle {
        [operand] if operand.symbol == Symbol::Operand => {
            require_defined(operand, line)?;
            reject_bool(operand, line)?;

            let literal = match operand.source {
                Some((Token::Identifier(_), _)) | None => None,
                source => source,
            };
            Ok(plain(Rule::Operand, StackItem::result(operand.ty, literal)))
        },

        [operand, bang] if operand.symbol == Symbol::Result && bang.symbol == Symbol::Unwrap => {
            require_defined(operand, line)?;
            if operand.ty == ValueType::Nil {
                return Err(SemanticError::TypeMismatch { details: "cannot unwrap nil".to_string(),
                                                         line:    line_of(bang, line), }.into());
            }
            Ok(plain(Rule::Unwrap, StackItem::result(operand.ty.unwrapped(), None)))
        },

        [open, inner, close]
            if open.symbol == Symbol::LParen
               && inner.symbol == Symbol::Result
               && close.symbol == Symbol::RParen =>
        {
            require_defined(inner, line)?;
            Ok(plain(Rule::Parens, *inner))
        },

        [left, op, right] if left.symbol == Symbol::Result && right.symbol == Symbol::Result => {
            let Some(op_kind) = BinaryOp::from_symbol(op.symbol) else {
                return Err(SyntaxError::NoMatchingRule { line }.into());
            };
            binary(op_kind, *left, *right, line_of(op, line))
        },

        _ => Err(SyntaxError::NoMatchingRule { line }.into()),
    }
}

const fn plain<'a>(rule: Rule<'a>, result: StackItem<'a>) -> Reduction<'a> {
    Reduction { rule,
                result,
                promotion: Promotion::None }
}

fn line_of(item: &StackItem<'_>, fallback: usize) -> usize {
    item.source.map_or(fallback, |(_, line)| *line)
}

fn require_defined(item: &StackItem<'_>, line: usize) -> CompileResult<()> {
    if item.ty != ValueType::Undefined {
        return Ok(());
    }

    let name = match item.source {
        Some((Token::Identifier(name), _)) => name.clone(),
        _ => "<expression>".to_string(),
    };
    Err(SemanticError::UninitializedVariable { name,
                                               line: line_of(item, line) }.into())
}

fn reject_bool(item: &StackItem<'_>, line: usize) -> CompileResult<()> {
    if item.ty == ValueType::Bool {
        return Err(SemanticError::TypeMismatch { details: "a Bool value cannot be an operand".to_string(),
                                                 line:    line_of(item, line), }.into());
    }
    Ok(())
}

fn binary<'a>(op: BinaryOp,
              left: StackItem<'a>,
              right: StackItem<'a>,
              line: usize)
              -> CompileResult<Reduction<'a>> {
    for operand in [&left, &right] {
        require_defined(operand, line)?;
        reject_bool(operand, line)?;
    }

    let (ty, promotion) = match op {
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Add | BinaryOp::Sub => {
            arithmetic(op, &left, &right)
        },
        BinaryOp::Eq | BinaryOp::NotEq => equality(&left, &right),
        BinaryOp::Less | BinaryOp::Greater | BinaryOp::LessEq | BinaryOp::GreaterEq => {
            ordering(&left, &right)
        },
        BinaryOp::Coalesce => coalesce(&left, &right),
    }.ok_or_else(|| SemanticError::TypeMismatch { details: format!("cannot apply '{op}' to {} and {}",
                                                                   left.ty, right.ty),
                                                  line })?;

    log::debug!("typed {} {op} {} as {ty}", left.ty, right.ty);

    Ok(Reduction { rule: Rule::Binary { op, left, right },
                   result: StackItem::result(ty, None),
                   promotion })
}

fn arithmetic(op: BinaryOp,
              left: &StackItem<'_>,
              right: &StackItem<'_>)
              -> Option<(ValueType, Promotion)> {
    use ValueType::{Double, Int, String};

    match (left.ty, right.ty) {
        (Int, Int) => Some((Int, Promotion::None)),
        (Double, Double) => Some((Double, Promotion::None)),
        (Double, Int) if right.is_int_literal() => Some((Double, Promotion::Right)),
        (Int, Double) if left.is_int_literal() => Some((Double, Promotion::Left)),
        (String, String) if op == BinaryOp::Add => Some((String, Promotion::None)),
        _ => None,
    }
}

fn equality(left: &StackItem<'_>, right: &StackItem<'_>) -> Option<(ValueType, Promotion)> {
    use ValueType::{Bool, Double, Int, Nil};

    match (left.ty, right.ty) {
        (l, r) if l == r => Some((Bool, Promotion::None)),
        (Int, Double) if left.is_int_literal() => Some((Bool, Promotion::Left)),
        (Double, Int) if right.is_int_literal() => Some((Bool, Promotion::Right)),
        (l, r) if l.is_optional() && (r == Nil || r == l.unwrapped()) => {
            Some((Bool, Promotion::None))
        },
        (l, r) if r.is_optional() && (l == Nil || l == r.unwrapped()) => {
            Some((Bool, Promotion::None))
        },
        _ => None,
    }
}

fn ordering(left: &StackItem<'_>, right: &StackItem<'_>) -> Option<(ValueType, Promotion)> {
    use ValueType::{Bool, Double, Int, String};

    match (left.ty, right.ty) {
        (l, r) if l == r && matches!(l, Int | Double | String) => Some((Bool, Promotion::None)),
        _ => None,
    }
}

/// `a ?? b` takes an optional or `nil` on the left and a value of the matching
/// base type on the right. The result is the base type.
fn coalesce(left: &StackItem<'_>, right: &StackItem<'_>) -> Option<(ValueType, Promotion)> {
    match (left.ty, right.ty) {
        (ValueType::Nil, r) if r.optional().is_some() && !r.is_optional() => {
            Some((r, Promotion::None))
        },
        (l, r) if l.is_optional() && r == l.unwrapped() => Some((r, Promotion::None)),
        _ => None,
    }
}
