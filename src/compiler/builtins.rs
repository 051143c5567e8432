use crate::compiler::{
    codegen::{CodeSink, Frame, Instruction, Operand, ReadType},
    context::Compiler,
    symtable::{Param, Signature},
    types::ValueType,
};

/// Functions provided by the language and expanded inline at each call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    ReadString,
    ReadInt,
    ReadDouble,
    Write,
    Int2Double,
    Double2Int,
    Length,
    Substring,
    Ord,
    Chr,
}

impl Builtin {
    pub const ALL: [Self; 10] = [Self::ReadString,
                                 Self::ReadInt,
                                 Self::ReadDouble,
                                 Self::Write,
                                 Self::Int2Double,
                                 Self::Double2Int,
                                 Self::Length,
                                 Self::Substring,
                                 Self::Ord,
                                 Self::Chr];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ReadString => "readString",
            Self::ReadInt => "readInt",
            Self::ReadDouble => "readDouble",
            Self::Write => "write",
            Self::Int2Double => "Int2Double",
            Self::Double2Int => "Double2Int",
            Self::Length => "length",
            Self::Substring => "substring",
            Self::Ord => "ord",
            Self::Chr => "chr",
        }
    }

    #[must_use]
    pub fn signature(self) -> Signature {
        let (params, ret) = match self {
            Self::ReadString => (vec![], ValueType::StringNil),
            Self::ReadInt => (vec![], ValueType::IntNil),
            Self::ReadDouble => (vec![], ValueType::DoubleNil),
            Self::Write => (vec![], ValueType::Void),
            Self::Int2Double => (vec![unlabeled("term", ValueType::Int)], ValueType::Double),
            Self::Double2Int => (vec![unlabeled("term", ValueType::Double)], ValueType::Int),
            Self::Length => (vec![unlabeled("s", ValueType::String)], ValueType::Int),
            Self::Substring => (vec![labeled("of", "s", ValueType::String),
                                     labeled("startingAt", "i", ValueType::Int),
                                     labeled("endingBefore", "j", ValueType::Int)],
                                ValueType::StringNil),
            Self::Ord => (vec![unlabeled("c", ValueType::String)], ValueType::Int),
            Self::Chr => (vec![unlabeled("i", ValueType::Int)], ValueType::String),
        };

        Signature { params,
                    ret,
                    variadic: self == Self::Write,
                    builtin: Some(self) }
    }

    /// Emits the body of a call with already checked arguments. Any result is
    /// left on the data stack.
    pub fn emit<S: CodeSink>(self, ctx: &mut Compiler<S>, args: &[Operand]) {
        log::debug!("expand built-in {}", self.name());

        match (self, args) {
            (Self::ReadString, _) => read(ctx, ReadType::String),
            (Self::ReadInt, _) => read(ctx, ReadType::Int),
            (Self::ReadDouble, _) => read(ctx, ReadType::Float),
            (Self::Write, _) => {
                for arg in args {
                    ctx.emit(Instruction::Write(arg.clone()));
                }
            },
            (Self::Int2Double, [value]) => {
                ctx.emit(Instruction::PushS(value.clone()));
                ctx.emit(Instruction::Int2FloatS);
            },
            (Self::Double2Int, [value]) => {
                ctx.emit(Instruction::PushS(value.clone()));
                ctx.emit(Instruction::Float2IntS);
            },
            (Self::Length, [string]) => {
                let result = frame_with_result(ctx);
                ctx.emit(Instruction::StrLen(result.clone(), string.clone()));
                ctx.emit(Instruction::PushS(result));
            },
            (Self::Chr, [code]) => {
                ctx.emit(Instruction::PushS(code.clone()));
                ctx.emit(Instruction::Int2CharS);
            },
            (Self::Ord, [string]) => ord(ctx, string),
            (Self::Substring, [string, start, end]) => substring(ctx, string, start, end),
            _ => log::warn!("built-in {} called with {} arguments", self.name(), args.len()),
        }
    }
}

fn unlabeled(name: &str, ty: ValueType) -> Param {
    Param { label: None,
            name: name.to_string(),
            ty }
}

fn labeled(label: &str, name: &str, ty: ValueType) -> Param {
    Param { label: Some(label.to_string()),
            name: name.to_string(),
            ty }
}

fn temporary(name: &str) -> Operand {
    Operand::var(Frame::Temporary, name)
}

/// Fresh temporary frame holding a `%result` variable.
fn frame_with_result<S: CodeSink>(ctx: &mut Compiler<S>) -> Operand {
    let result = temporary("%result");
    ctx.emit(Instruction::CreateFrame);
    ctx.emit(Instruction::DefVar(result.clone()));
    result
}

fn read<S: CodeSink>(ctx: &mut Compiler<S>, ty: ReadType) {
    let result = frame_with_result(ctx);
    ctx.emit(Instruction::Read(result.clone(), ty));
    ctx.emit(Instruction::PushS(result));
}

/// Code point of the first character, 0 for the empty string.
fn ord<S: CodeSink>(ctx: &mut Compiler<S>, string: &Operand) {
    let empty = format!("ord${}$empty", ctx.next_builtin());
    let result = frame_with_result(ctx);
    let length = temporary("%length");

    ctx.emit(Instruction::DefVar(length.clone()));
    ctx.emit(Instruction::Move(result.clone(), Operand::Int(0)));
    ctx.emit(Instruction::StrLen(length.clone(), string.clone()));
    ctx.emit(Instruction::JumpIfEq(empty.clone(), length, Operand::Int(0)));
    ctx.emit(Instruction::Stri2Int(result.clone(), string.clone(), Operand::Int(0)));
    ctx.emit(Instruction::Label(empty));
    ctx.emit(Instruction::PushS(result));
}

/// Characters `start..end` of the string, or `nil` when the range is out of
/// bounds or reversed.
fn substring<S: CodeSink>(ctx: &mut Compiler<S>, string: &Operand, start: &Operand, end: &Operand) {
    let id = ctx.next_builtin();
    let on_nil = format!("substring${id}$nil");
    let looping = format!("substring${id}$loop");
    let done = format!("substring${id}$done");
    let exit = format!("substring${id}$exit");

    let result = frame_with_result(ctx);
    let [s, i, j, length, ch, test] = ["%s", "%i", "%j", "%length", "%char", "%test"].map(temporary);

    for var in [&s, &i, &j, &length, &ch, &test] {
        ctx.emit(Instruction::DefVar(var.clone()));
    }
    ctx.emit(Instruction::Move(s.clone(), string.clone()));
    ctx.emit(Instruction::Move(i.clone(), start.clone()));
    ctx.emit(Instruction::Move(j.clone(), end.clone()));
    ctx.emit(Instruction::StrLen(length.clone(), s.clone()));

    let nil_when = |ctx: &mut Compiler<S>, check: Instruction, expected: bool| {
        ctx.emit(check);
        ctx.emit(Instruction::JumpIfEq(on_nil.clone(), test.clone(), Operand::Bool(expected)));
    };
    nil_when(ctx, Instruction::Lt(test.clone(), i.clone(), Operand::Int(0)), true);
    nil_when(ctx, Instruction::Lt(test.clone(), j.clone(), Operand::Int(0)), true);
    nil_when(ctx, Instruction::Gt(test.clone(), i.clone(), j.clone()), true);
    nil_when(ctx, Instruction::Lt(test.clone(), i.clone(), length.clone()), false);
    nil_when(ctx, Instruction::Gt(test.clone(), j.clone(), length.clone()), true);

    ctx.emit(Instruction::Move(result.clone(), Operand::Str(String::new())));
    ctx.emit(Instruction::Label(looping.clone()));
    ctx.emit(Instruction::JumpIfEq(done.clone(), i.clone(), j.clone()));
    ctx.emit(Instruction::GetChar(ch.clone(), s, i.clone()));
    ctx.emit(Instruction::Concat(result.clone(), result.clone(), ch));
    ctx.emit(Instruction::Add(i.clone(), i, Operand::Int(1)));
    ctx.emit(Instruction::Jump(looping));
    ctx.emit(Instruction::Label(done));
    ctx.emit(Instruction::PushS(result));
    ctx.emit(Instruction::Jump(exit.clone()));
    ctx.emit(Instruction::Label(on_nil));
    ctx.emit(Instruction::PushS(Operand::Nil));
    ctx.emit(Instruction::Label(exit));
}
