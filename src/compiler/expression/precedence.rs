use crate::compiler::lexer::Token;

/// Symbols that can appear on the expression stack.
///
/// The first sixteen are terminals and index the precedence table. `Result`
/// and `Boundary` exist only on the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// Postfix `!`.
    Unwrap,
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
    /// `??`
    Coalesce,
    LParen,
    RParen,
    /// An identifier or literal.
    Operand,
    /// Bottom of the stack, and any token that cannot continue an expression.
    End,
    /// A reduced sub-expression.
    Result,
    /// Lower limit of the next reduction.
    Boundary,
}

impl Symbol {
    /// Position of a terminal in the precedence table.
    #[must_use]
    pub const fn index(self) -> Option<usize> {
        match self {
            Self::Unwrap => Some(0),
            Self::Mul => Some(1),
            Self::Div => Some(2),
            Self::Add => Some(3),
            Self::Sub => Some(4),
            Self::Eq => Some(5),
            Self::NotEq => Some(6),
            Self::Less => Some(7),
            Self::Greater => Some(8),
            Self::LessEq => Some(9),
            Self::GreaterEq => Some(10),
            Self::Coalesce => Some(11),
            Self::LParen => Some(12),
            Self::RParen => Some(13),
            Self::Operand => Some(14),
            Self::End => Some(15),
            Self::Result | Self::Boundary => None,
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        self.index().is_some()
    }
}

/// What the driver does for a (top terminal, lookahead) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Shift,
    Reduce,
    /// Push without a boundary; matches `(` with `)`.
    Equal,
    Error,
}

use Action::{Equal as Q, Error as X, Reduce as R, Shift as S};

/// Rows are the top terminal, columns the lookahead, both in the order
/// `! * / + - == != < > <= >= ?? ( ) id $`.
#[rustfmt::skip]
const TABLE: [[Action; 16]; 16] = [
    /* !  */ [X, R, R, R, R, R, R, R, R, R, R, R, S, R, S, R],
    /* *  */ [S, R, R, R, R, R, R, R, R, R, R, R, S, R, S, R],
    /* /  */ [S, R, R, R, R, R, R, R, R, R, R, R, S, R, S, R],
    /* +  */ [S, S, S, R, R, R, R, R, R, R, R, R, S, R, S, R],
    /* -  */ [S, S, S, R, R, R, R, R, R, R, R, R, S, R, S, R],
    /* == */ [S, S, S, S, S, X, X, X, X, X, X, R, S, R, S, R],
    /* != */ [S, S, S, S, S, X, X, X, X, X, X, R, S, R, S, R],
    /* <  */ [S, S, S, S, S, X, X, X, X, X, X, R, S, R, S, R],
    /* >  */ [S, S, S, S, S, X, X, X, X, X, X, R, S, R, S, R],
    /* <= */ [S, S, S, S, S, X, X, X, X, X, X, R, S, R, S, R],
    /* >= */ [S, S, S, S, S, X, X, X, X, X, X, R, S, R, S, R],
    /* ?? */ [S, S, S, S, S, S, S, S, S, S, S, S, S, R, S, R],
    /* (  */ [S, S, S, S, S, S, S, S, S, S, S, S, S, Q, S, X],
    /* )  */ [R, R, R, R, R, R, R, R, R, R, R, R, X, R, X, R],
    /* id */ [R, R, R, R, R, R, R, R, R, R, R, R, X, R, X, R],
    /* $  */ [S, S, S, S, S, S, S, S, S, S, S, S, S, X, S, X],
];

/// Maps a lookahead token to its terminal. `None` is the end of input.
///
/// # Example
/// ```
/// use ifj23c::compiler::{expression::precedence::{Symbol, classify}, lexer::Token};
///
/// assert_eq!(classify(Some(&Token::Integer(3))), Symbol::Operand);
/// assert_eq!(classify(Some(&Token::Nil)), Symbol::Operand);
/// assert_eq!(classify(Some(&Token::LBrace)), Symbol::End);
/// assert_eq!(classify(None), Symbol::End);
/// ```
#[must_use]
pub const fn classify(token: Option<&Token>) -> Symbol {
    let Some(token) = token else {
        return Symbol::End;
    };

    match token {
        Token::Bang => Symbol::Unwrap,
        Token::Star => Symbol::Mul,
        Token::Slash => Symbol::Div,
        Token::Plus => Symbol::Add,
        Token::Minus => Symbol::Sub,
        Token::EqualEqual => Symbol::Eq,
        Token::BangEqual => Symbol::NotEq,
        Token::Less => Symbol::Less,
        Token::Greater => Symbol::Greater,
        Token::LessEqual => Symbol::LessEq,
        Token::GreaterEqual => Symbol::GreaterEq,
        Token::QuestionQuestion => Symbol::Coalesce,
        Token::LParen => Symbol::LParen,
        Token::RParen => Symbol::RParen,
        Token::Integer(_)
        | Token::Double(_)
        | Token::Str(_)
        | Token::Identifier(_)
        | Token::Nil => Symbol::Operand,
        _ => Symbol::End,
    }
}

/// Looks up the action for a top terminal and a lookahead terminal.
///
/// Non-terminal arguments always yield [`Action::Error`].
///
/// # Example
/// ```
/// use ifj23c::compiler::expression::precedence::{Action, Symbol, relation};
///
/// assert_eq!(relation(Symbol::Add, Symbol::Mul), Action::Shift);
/// assert_eq!(relation(Symbol::Mul, Symbol::Add), Action::Reduce);
/// assert_eq!(relation(Symbol::LParen, Symbol::RParen), Action::Equal);
/// assert_eq!(relation(Symbol::Less, Symbol::Eq), Action::Error);
/// ```
#[must_use]
pub const fn relation(top: Symbol, lookahead: Symbol) -> Action {
    match (top.index(), lookahead.index()) {
        (Some(row), Some(column)) => TABLE[row][column],
        _ => Action::Error,
    }
}
