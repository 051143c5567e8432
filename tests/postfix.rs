//! Property tests for the order of emitted stack code.
//!
//! Random integer expressions are compiled and the resulting instructions are
//! run on a small stack machine. The result has to match evaluating the
//! expression tree directly.

use ifj23c::{
    compile,
    compiler::codegen::{Instruction, Operand},
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Expr {
    Literal(i64),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
}

impl Expr {
    fn value(&self) -> i64 {
        match self {
            Self::Literal(v) => *v,
            Self::Add(a, b) => a.value().wrapping_add(b.value()),
            Self::Sub(a, b) => a.value().wrapping_sub(b.value()),
            Self::Mul(a, b) => a.value().wrapping_mul(b.value()),
        }
    }

    /// Fully parenthesized source text.
    fn source(&self) -> String {
        match self {
            Self::Literal(v) => v.to_string(),
            Self::Add(a, b) => format!("({} + {})", a.source(), b.source()),
            Self::Sub(a, b) => format!("({} - {})", a.source(), b.source()),
            Self::Mul(a, b) => format!("({} * {})", a.source(), b.source()),
        }
    }

    /// Source text relying on precedence, parenthesized only where needed.
    fn minimal_source(&self) -> String {
        match self {
            Self::Literal(v) => v.to_string(),
            Self::Add(a, b) => format!("{} + {}", a.minimal_source(), b.wrapped(false)),
            Self::Sub(a, b) => format!("{} - {}", a.minimal_source(), b.wrapped(false)),
            Self::Mul(a, b) => format!("{} * {}", a.wrapped(true), b.wrapped(false)),
        }
    }

    /// Parenthesizes a sum or difference as the operand of `*`, and any
    /// compound expression as a right operand.
    fn wrapped(&self, left_of_mul: bool) -> String {
        match self {
            Self::Literal(_) => self.minimal_source(),
            Self::Mul(..) if left_of_mul => self.minimal_source(),
            _ => format!("({})", self.minimal_source()),
        }
    }
}

fn expr() -> impl Strategy<Value = Expr> {
    let leaf = (0i64..1000).prop_map(Expr::Literal);
    leaf.prop_recursive(6, 48, 2, |inner| {
            prop_oneof![(inner.clone(), inner.clone()).prop_map(|(a, b)| Expr::Add(Box::new(a), Box::new(b))),
                        (inner.clone(), inner.clone()).prop_map(|(a, b)| Expr::Sub(Box::new(a), Box::new(b))),
                        (inner.clone(), inner).prop_map(|(a, b)| Expr::Mul(Box::new(a), Box::new(b))),]
        })
}

/// Runs the integer stack instructions of `let x = ...` and returns what is
/// stored into `x`.
fn execute(source: &str) -> Result<i64, TestCaseError> {
    let program = compile(source).map_err(|e| TestCaseError::fail(format!("{e}")))?;
    let mut stack = Vec::new();

    for instruction in program.instructions() {
        match instruction {
            Instruction::PushS(Operand::Int(v)) => stack.push(*v),
            Instruction::AddS | Instruction::SubS | Instruction::MulS => {
                let b = stack.pop().ok_or_else(|| TestCaseError::fail("stack underflow"))?;
                let a = stack.pop().ok_or_else(|| TestCaseError::fail("stack underflow"))?;
                stack.push(match instruction {
                               Instruction::AddS => a.wrapping_add(b),
                               Instruction::SubS => a.wrapping_sub(b),
                               _ => a.wrapping_mul(b),
                           });
            },
            Instruction::PopS(_) => {
                let value = stack.pop().ok_or_else(|| TestCaseError::fail("stack underflow"))?;
                prop_assert!(stack.is_empty(), "values left on the stack");
                return Ok(value);
            },
            Instruction::DefVar(_) => {},
            other => return Err(TestCaseError::fail(format!("unexpected instruction {other}"))),
        }
    }

    Err(TestCaseError::fail("no result stored"))
}

proptest! {
    #[test]
    fn parenthesized_expressions_evaluate_correctly(tree in expr()) {
        let value = execute(&format!("let x = {}\n", tree.source()))?;
        prop_assert_eq!(value, tree.value());
    }

    #[test]
    fn precedence_matches_arithmetic(tree in expr()) {
        let value = execute(&format!("let x = {}\n", tree.minimal_source()))?;
        prop_assert_eq!(value, tree.value());
    }

    #[test]
    fn operand_loads_keep_source_order(values in prop::collection::vec(0i64..100, 1..12)) {
        let source = values.iter().map(ToString::to_string).collect::<Vec<_>>().join(" - ");
        let program = compile(&format!("let x = {source}\n")).map_err(|e| TestCaseError::fail(format!("{e}")))?;

        let loaded: Vec<i64> = program.instructions()
                                      .iter()
                                      .filter_map(|instruction| match instruction {
                                          Instruction::PushS(Operand::Int(v)) => Some(*v),
                                          _ => None,
                                      })
                                      .collect();
        prop_assert_eq!(loaded, values);
    }
}
