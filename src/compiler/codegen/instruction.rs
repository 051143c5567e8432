use std::fmt;

use ordered_float::OrderedFloat;

use crate::util::format::{escape_string, hex_float};

/// Variable storage regions of the target machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frame {
    /// `GF`, alive for the whole program.
    Global,
    /// `LF`, the frame of the running call.
    Local,
    /// `TF`, scratch space for setting up a call.
    Temporary,
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => write!(f, "GF"),
            Self::Local => write!(f, "LF"),
            Self::Temporary => write!(f, "TF"),
        }
    }
}

/// Anything an instruction can read or write.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operand {
    Var {
        frame: Frame,
        name:  String,
    },
    Int(i64),
    Float(OrderedFloat<f64>),
    Str(String),
    Bool(bool),
    Nil,
}

impl Operand {
    /// Shorthand for a variable operand.
    #[must_use]
    pub fn var(frame: Frame, name: impl Into<String>) -> Self {
        Self::Var { frame,
                    name: name.into() }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Var { frame, name } => write!(f, "{frame}@{name}"),
            Self::Int(value) => write!(f, "int@{value}"),
            Self::Float(value) => write!(f, "float@{}", hex_float(value.0)),
            Self::Str(value) => write!(f, "string@{}", escape_string(value)),
            Self::Bool(value) => write!(f, "bool@{value}"),
            Self::Nil => write!(f, "nil@nil"),
        }
    }
}

/// Type argument of `READ`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadType {
    Int,
    Float,
    String,
}

/// One instruction of the target machine.
///
/// Names ending in `S` work on the data stack; the others take explicit
/// operands and, where they produce a value, write it to the first one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    CreateFrame,
    PushFrame,
    PopFrame,
    DefVar(Operand),
    Move(Operand, Operand),
    Call(String),
    Return,

    PushS(Operand),
    PopS(Operand),
    AddS,
    SubS,
    MulS,
    DivS,
    IDivS,
    LtS,
    GtS,
    EqS,
    NotS,
    Int2FloatS,
    Float2IntS,
    Int2CharS,

    Add(Operand, Operand, Operand),
    Lt(Operand, Operand, Operand),
    Gt(Operand, Operand, Operand),
    Eq(Operand, Operand, Operand),
    Or(Operand, Operand, Operand),
    Concat(Operand, Operand, Operand),
    StrLen(Operand, Operand),
    GetChar(Operand, Operand, Operand),
    Stri2Int(Operand, Operand, Operand),

    Read(Operand, ReadType),
    Write(Operand),

    Label(String),
    Jump(String),
    JumpIfEq(String, Operand, Operand),
    JumpIfNeq(String, Operand, Operand),
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateFrame => write!(f, "CREATEFRAME"),
            Self::PushFrame => write!(f, "PUSHFRAME"),
            Self::PopFrame => write!(f, "POPFRAME"),
            Self::DefVar(var) => write!(f, "DEFVAR {var}"),
            Self::Move(dst, src) => write!(f, "MOVE {dst} {src}"),
            Self::Call(label) => write!(f, "CALL {label}"),
            Self::Return => write!(f, "RETURN"),

            Self::PushS(value) => write!(f, "PUSHS {value}"),
            Self::PopS(var) => write!(f, "POPS {var}"),
            Self::AddS => write!(f, "ADDS"),
            Self::SubS => write!(f, "SUBS"),
            Self::MulS => write!(f, "MULS"),
            Self::DivS => write!(f, "DIVS"),
            Self::IDivS => write!(f, "IDIVS"),
            Self::LtS => write!(f, "LTS"),
            Self::GtS => write!(f, "GTS"),
            Self::EqS => write!(f, "EQS"),
            Self::NotS => write!(f, "NOTS"),
            Self::Int2FloatS => write!(f, "INT2FLOATS"),
            Self::Float2IntS => write!(f, "FLOAT2INTS"),
            Self::Int2CharS => write!(f, "INT2CHARS"),

            Self::Add(dst, a, b) => write!(f, "ADD {dst} {a} {b}"),
            Self::Lt(dst, a, b) => write!(f, "LT {dst} {a} {b}"),
            Self::Gt(dst, a, b) => write!(f, "GT {dst} {a} {b}"),
            Self::Eq(dst, a, b) => write!(f, "EQ {dst} {a} {b}"),
            Self::Or(dst, a, b) => write!(f, "OR {dst} {a} {b}"),
            Self::Concat(dst, a, b) => write!(f, "CONCAT {dst} {a} {b}"),
            Self::StrLen(dst, s) => write!(f, "STRLEN {dst} {s}"),
            Self::GetChar(dst, s, i) => write!(f, "GETCHAR {dst} {s} {i}"),
            Self::Stri2Int(dst, s, i) => write!(f, "STRI2INT {dst} {s} {i}"),

            Self::Read(dst, ReadType::Int) => write!(f, "READ {dst} int"),
            Self::Read(dst, ReadType::Float) => write!(f, "READ {dst} float"),
            Self::Read(dst, ReadType::String) => write!(f, "READ {dst} string"),
            Self::Write(value) => write!(f, "WRITE {value}"),

            Self::Label(label) => write!(f, "LABEL {label}"),
            Self::Jump(label) => write!(f, "JUMP {label}"),
            Self::JumpIfEq(label, a, b) => write!(f, "JUMPIFEQ {label} {a} {b}"),
            Self::JumpIfNeq(label, a, b) => write!(f, "JUMPIFNEQ {label} {a} {b}"),
        }
    }
}
