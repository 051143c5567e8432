use std::fmt;

use logos::{FilterResult, Logos};
use ordered_float::OrderedFloat;

use crate::{
    compiler::types::ValueType,
    error::{CompileResult, SyntaxError},
};

/// Represents a lexical token in the source input.
/// A token is a minimal but meaningful unit of text produced by the lexer.
/// This enum defines all recognized tokens in the language.
#[derive(Logos, Debug, PartialEq, Eq, Clone)]
#[logos(extras = LexerExtras)]
pub enum Token {
    /// Floating point literal tokens, such as `3.14`, `2.0` or `2.1e-10`.
    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?", parse_double)]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+", parse_double)]
    Double(OrderedFloat<f64>),
    /// Integer literal tokens, such as `42`.
    #[regex(r"[0-9]+", parse_integer)]
    Integer(i64),
    /// String literal tokens with escapes already resolved.
    #[regex(r#""([^"\\\n]|\\[^\n])*""#, parse_string)]
    #[token(r#"""""#, parse_multiline_string)]
    Str(String),
    /// Type names, optionally followed by `?`.
    #[token("Int", |_| ValueType::Int)]
    #[token("Int?", |_| ValueType::IntNil)]
    #[token("Double", |_| ValueType::Double)]
    #[token("Double?", |_| ValueType::DoubleNil)]
    #[token("String", |_| ValueType::String)]
    #[token("String?", |_| ValueType::StringNil)]
    Type(ValueType),
    /// `nil`
    #[token("nil")]
    Nil,
    /// `let`
    #[token("let")]
    Let,
    /// `var`
    #[token("var")]
    Var,
    /// `if`
    #[token("if")]
    If,
    /// `else`
    #[token("else")]
    Else,
    /// `while`
    #[token("while")]
    While,
    /// `func`
    #[token("func")]
    Func,
    /// `return`
    #[token("return")]
    Return,
    /// Identifier tokens; variable or function names such as `x` or `readInt`.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),
    /// `_`
    #[token("_", priority = 3)]
    Underscore,
    /// `// Comments.`
    #[regex(r"//[^\n]*", logos::skip, allow_greedy = true)]
    Comment,
    /// Block comments, which may nest.
    #[token("/*", skip_block_comment)]
    BlockComment,
    /// `*`
    #[token("*")]
    Star,
    /// `/`
    #[token("/")]
    Slash,
    /// `+`
    #[token("+")]
    Plus,
    /// `-`
    #[token("-")]
    Minus,
    /// `==`
    #[token("==")]
    EqualEqual,
    /// `!=`
    #[token("!=")]
    BangEqual,
    /// `<`
    #[token("<")]
    Less,
    /// `>`
    #[token(">")]
    Greater,
    /// `<=`
    #[token("<=")]
    LessEqual,
    /// `>=`
    #[token(">=")]
    GreaterEqual,
    /// `??`
    #[token("??")]
    QuestionQuestion,
    /// `!`
    #[token("!")]
    Bang,
    /// `=`
    #[token("=")]
    Equals,
    /// `:`
    #[token(":")]
    Colon,
    /// `,`
    #[token(",")]
    Comma,
    /// `->`
    #[token("->")]
    Arrow,
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `{`
    #[token("{")]
    LBrace,
    /// `}`
    #[token("}")]
    RBrace,
    /// Line breaks end statements and expressions.
    #[token("\n", |lex| lex.extras.line += 1)]
    NewLine,
    /// Spaces, tabs and feeds.
    #[regex(r"[ \t\r\f]+", logos::skip)]
    Ignored,
}

impl Token {
    /// Returns `true` for tokens that end a statement without being part of
    /// it.
    #[must_use]
    pub const fn ends_statement(&self) -> bool {
        matches!(self, Self::NewLine | Self::RBrace)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Double(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Str(value) => write!(f, "{value:?}"),
            Self::Type(ty) => write!(f, "{ty}"),
            Self::Identifier(name) => write!(f, "{name}"),
            Self::Nil => write!(f, "nil"),
            Self::Let => write!(f, "let"),
            Self::Var => write!(f, "var"),
            Self::If => write!(f, "if"),
            Self::Else => write!(f, "else"),
            Self::While => write!(f, "while"),
            Self::Func => write!(f, "func"),
            Self::Return => write!(f, "return"),
            Self::Underscore => write!(f, "_"),
            Self::Star => write!(f, "*"),
            Self::Slash => write!(f, "/"),
            Self::Plus => write!(f, "+"),
            Self::Minus => write!(f, "-"),
            Self::EqualEqual => write!(f, "=="),
            Self::BangEqual => write!(f, "!="),
            Self::Less => write!(f, "<"),
            Self::Greater => write!(f, ">"),
            Self::LessEqual => write!(f, "<="),
            Self::GreaterEqual => write!(f, ">="),
            Self::QuestionQuestion => write!(f, "??"),
            Self::Bang => write!(f, "!"),
            Self::Equals => write!(f, "="),
            Self::Colon => write!(f, ":"),
            Self::Comma => write!(f, ","),
            Self::Arrow => write!(f, "->"),
            Self::LParen => write!(f, "("),
            Self::RParen => write!(f, ")"),
            Self::LBrace => write!(f, "{{"),
            Self::RBrace => write!(f, "}}"),
            Self::NewLine => write!(f, "end of line"),
            Self::Comment | Self::BlockComment | Self::Ignored => write!(f, "comment"),
        }
    }
}

/// Additional information carried by the lexer during tokenization.
///
/// Tracks the current line number for error reporting and diagnostics.
#[derive(Default)]
pub struct LexerExtras {
    /// The current line number in the source being tokenized.
    pub line: usize,
}

/// Splits the whole source into `(token, line)` pairs.
///
/// # Errors
/// Returns [`SyntaxError::InvalidToken`] for the first slice no token matches,
/// including malformed strings and unterminated block comments.
///
/// # Example
/// ```
/// use ifj23c::compiler::lexer::{Token, tokenize};
///
/// let tokens = tokenize("let x: Int? = nil").unwrap();
/// assert_eq!(tokens.len(), 6);
/// assert_eq!(tokens[5].0, Token::Nil);
///
/// assert!(tokenize("let s = \"unterminated").is_err());
/// ```
pub fn tokenize(source: &str) -> CompileResult<Vec<(Token, usize)>> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer_with_extras(source, LexerExtras { line: 1 });

    while let Some(token) = lexer.next() {
        if let Ok(tok) = token {
            // The newline callback has already moved on to the next line.
            let line = match tok {
                Token::NewLine => lexer.extras.line - 1,
                _ => lexer.extras.line,
            };
            tokens.push((tok, line));
        } else {
            return Err(SyntaxError::InvalidToken { token: lexer.slice().to_string(),
                                                   line:  lexer.extras.line, }.into());
        }
    }

    log::trace!("lexed {} tokens", tokens.len());
    Ok(tokens)
}

fn parse_double(lex: &logos::Lexer<Token>) -> Option<OrderedFloat<f64>> {
    lex.slice().parse().ok().map(OrderedFloat)
}

fn parse_integer(lex: &logos::Lexer<Token>) -> Option<i64> {
    lex.slice().parse().ok()
}

fn parse_string(lex: &logos::Lexer<Token>) -> Option<String> {
    let slice = lex.slice();
    unescape(&slice[1..slice.len() - 1], false)
}

/// Reads a `"""` string up to its closing delimiter.
///
/// The content starts on the line after the opening delimiter and ends on the
/// line before the closing one.
fn parse_multiline_string(lex: &mut logos::Lexer<Token>) -> Option<String> {
    let rest = lex.remainder();
    let end = rest.find(r#"""""#)?;
    let body = &rest[..end];

    lex.bump(end + 3);
    lex.extras.line += body.matches('\n').count();

    let body = body.strip_prefix('\n')?;
    let body = body.strip_suffix('\n').unwrap_or(body);
    unescape(body, true)
}

/// Resolves escape sequences in a string literal body.
///
/// Returns `None` for unknown escapes and for raw control characters, which
/// must be escaped. Multi-line bodies may contain raw line breaks and tabs.
fn unescape(body: &str, multiline: bool) -> Option<String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            if c < ' ' && !(multiline && matches!(c, '\n' | '\t' | '\r')) {
                return None;
            }
            out.push(c);
            continue;
        }

        match chars.next()? {
            '"' => out.push('"'),
            '\\' => out.push('\\'),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'u' => {
                if chars.next()? != '{' {
                    return None;
                }
                let mut code = String::new();
                loop {
                    match chars.next()? {
                        '}' => break,
                        digit if digit.is_ascii_hexdigit() && code.len() < 8 => code.push(digit),
                        _ => return None,
                    }
                }
                let value = u32::from_str_radix(&code, 16).ok()?;
                out.push(char::from_u32(value)?);
            },
            _ => return None,
        }
    }

    Some(out)
}

/// Skips a block comment, honoring nested `/* */` pairs.
fn skip_block_comment(lex: &mut logos::Lexer<Token>) -> FilterResult<(), ()> {
    let rest = lex.remainder();

    let Some(end) = block_comment_end(rest) else {
        lex.bump(rest.len());
        return FilterResult::Error(());
    };

    lex.extras.line += rest[..end].matches('\n').count();
    lex.bump(end);
    FilterResult::Skip
}

fn block_comment_end(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    let mut depth = 1usize;
    let mut i = 0;

    while i + 1 < bytes.len() {
        match (bytes[i], bytes[i + 1]) {
            (b'/', b'*') => {
                depth += 1;
                i += 2;
            },
            (b'*', b'/') => {
                depth -= 1;
                i += 2;
                if depth == 0 {
                    return Some(i);
                }
            },
            _ => i += 1,
        }
    }

    None
}
