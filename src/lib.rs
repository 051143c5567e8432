//! # ifj23c
//!
//! ifj23c compiles IFJ23, a small Swift-like language, into IFJcode23, a
//! three-address and stack based intermediate code. Expressions are parsed
//! by an operator precedence engine that checks types and emits code in a
//! single pass, without building a syntax tree.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
    //missing_docs,
)]
#![allow(clippy::missing_errors_doc)]

use crate::{
    compiler::{codegen::Program, context::Compiler, lexer::tokenize, parser::core::compile_program},
    error::CompileResult,
};

/// Lexing, parsing, checking and code generation.
///
/// This module holds every phase of the compiler. The statement parser is a
/// recursive descent over the token stream that hands each expression to the
/// precedence engine. Both write into a shared [`context::Compiler`], which
/// owns the symbol table, the label counters and the instruction sink.
///
/// # Responsibilities
/// - Tokenizes source text.
/// - Parses statements and expressions and checks their types.
/// - Emits IFJcode23 instructions in source order.
///
/// [`context::Compiler`]: crate::compiler::context::Compiler
pub mod compiler;
/// Provides the error types shared by every phase.
///
/// Errors are split into syntax errors, semantic errors and internal
/// failures. Each carries the line it was raised on and maps to the process
/// exit code the compiler reports.
///
/// # Responsibilities
/// - Defines error enums for the lexer, the parsers and the type checker.
/// - Maps every error to its exit code.
pub mod error;
/// Formatting helpers for instruction operands.
pub mod util;

/// Compiles a whole IFJ23 program.
///
/// On success the returned [`Program`] prints as the complete IFJcode23
/// listing, header included.
///
/// # Examples
/// ```
/// use ifj23c::compile;
///
/// let program = compile("let x = 1 + 2\nwrite(x)\n").unwrap();
/// let listing = program.to_string();
/// assert!(listing.starts_with(".IFJcode23"));
/// assert!(listing.contains("ADDS"));
///
/// // `y` is never declared.
/// let error = compile("let x = y + 1").unwrap_err();
/// assert_eq!(error.exit_code(), 5);
/// ```
pub fn compile(source: &str) -> CompileResult<Program> {
    let tokens = tokenize(source)?;
    let mut ctx = Compiler::with_program();

    compile_program(&mut tokens.iter().peekable(), &mut ctx)?;

    Ok(ctx.into_sink())
}
