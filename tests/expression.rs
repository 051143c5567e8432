use ifj23c::{
    compiler::{
        codegen::{CodeSink, Frame, Instruction, Operand},
        context::Compiler,
        expression::{
            ExpressionContext,
            compile_expression,
            condition::{Condition, ConditionKind},
            precedence::{Action, Symbol, classify, relation},
            rules::{BinaryOp, Promotion, Rule, resolve},
            stack::{OperandStack, StackItem},
        },
        lexer::{Token, tokenize},
        symtable::Variable,
        types::ValueType,
    },
    error::{CompileError, SemanticError, SyntaxError},
};

/// Records instructions and counts insertions.
#[derive(Default)]
struct Recorder {
    instructions: Vec<Instruction>,
    inserts:      usize,
}

impl CodeSink for Recorder {
    fn emit(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    fn position(&self) -> usize {
        self.instructions.len()
    }

    fn insert(&mut self, index: usize, instruction: Instruction) {
        self.inserts += 1;
        self.instructions.insert(index, instruction);
    }
}

fn declare(ctx: &mut Compiler<Recorder>, name: &str, ty: ValueType) {
    let storage = Operand::var(Frame::Global, format!("{name}$0"));
    let variable = Variable { ty,
                              initialized: true,
                              constant: false,
                              storage };
    ctx.symbols.declare(name, variable, 1).unwrap();
}

fn run(source: &str,
       ctx: &mut Compiler<Recorder>,
       context: &ExpressionContext)
       -> Result<ValueType, CompileError> {
    let tokens = tokenize(source).unwrap();
    let mut iter = tokens.iter().peekable();
    let result = compile_expression(&mut iter, ctx, context);
    if result.is_ok() {
        assert!(iter.next().is_none_or(|(token, _)| classify(Some(token)) == Symbol::End),
                "expression stopped early in {source:?}");
    }
    result
}

fn rendered(ctx: &Compiler<Recorder>) -> Vec<String> {
    ctx.sink.instructions.iter().map(ToString::to_string).collect()
}

fn untyped(name: &str) -> ExpressionContext {
    ExpressionContext::Initializer { name:     name.to_string(),
                                     declared: None, }
}

#[test]
fn table_follows_operator_precedence() {
    assert_eq!(relation(Symbol::Add, Symbol::Mul), Action::Shift);
    assert_eq!(relation(Symbol::Mul, Symbol::Add), Action::Reduce);
    assert_eq!(relation(Symbol::Add, Symbol::Sub), Action::Reduce);
    assert_eq!(relation(Symbol::Less, Symbol::Add), Action::Shift);
    assert_eq!(relation(Symbol::Add, Symbol::Less), Action::Reduce);
    assert_eq!(relation(Symbol::Coalesce, Symbol::Coalesce), Action::Shift);
    assert_eq!(relation(Symbol::Eq, Symbol::Coalesce), Action::Reduce);
    assert_eq!(relation(Symbol::End, Symbol::Operand), Action::Shift);
    assert_eq!(relation(Symbol::Operand, Symbol::Unwrap), Action::Reduce);
}

#[test]
fn table_rejects_malformed_pairs() {
    assert_eq!(relation(Symbol::Less, Symbol::Greater), Action::Error);
    assert_eq!(relation(Symbol::Operand, Symbol::Operand), Action::Error);
    assert_eq!(relation(Symbol::Operand, Symbol::LParen), Action::Error);
    assert_eq!(relation(Symbol::RParen, Symbol::LParen), Action::Error);
    assert_eq!(relation(Symbol::LParen, Symbol::End), Action::Error);
    assert_eq!(relation(Symbol::End, Symbol::RParen), Action::Error);
    assert_eq!(relation(Symbol::End, Symbol::End), Action::Error);
    assert_eq!(relation(Symbol::Result, Symbol::Add), Action::Error);
}

#[test]
fn tokens_outside_expressions_end_them() {
    for token in [Token::LBrace, Token::NewLine, Token::Comma, Token::Equals, Token::Let] {
        assert_eq!(classify(Some(&token)), Symbol::End, "{token}");
    }
    assert_eq!(classify(Some(&Token::Identifier("x".to_string()))), Symbol::Operand);
    assert_eq!(classify(Some(&Token::Bang)), Symbol::Unwrap);
}

#[test]
fn underscore_is_its_own_token() {
    let tokens = tokenize("func f(_ n: Int)\n").unwrap();
    assert_eq!(tokens[3], (Token::Underscore, 1));
    assert_eq!(tokens[4], (Token::Identifier("n".to_string()), 1));

    let tokens = tokenize("_x").unwrap();
    assert_eq!(tokens, [(Token::Identifier("_x".to_string()), 1)]);
}

#[test]
fn line_breaks_keep_the_line_they_end() {
    let tokens = tokenize("a\n\nb").unwrap();
    let lines: Vec<usize> = tokens.iter().map(|(_, line)| *line).collect();
    assert_eq!(lines, [1, 1, 2, 3]);
}

#[test]
fn boundary_goes_below_results() {
    let plus = (Token::Plus, 1);
    let mut stack = OperandStack::new();

    stack.push(StackItem::result(ValueType::Int, None));
    stack.push_boundary();
    stack.push(StackItem::terminal(Symbol::Add, ValueType::Undefined, &plus));

    assert_eq!(stack.top_terminal(), Symbol::Add);
    let handle = stack.handle();
    assert_eq!(handle.len(), 2);
    assert_eq!(handle[0].symbol, Symbol::Result);
    assert_eq!(handle[1].symbol, Symbol::Add);
}

#[test]
fn reduce_replaces_the_handle_and_its_boundary() {
    let three = (Token::Integer(3), 1);
    let mut stack = OperandStack::new();

    stack.push_boundary();
    stack.push(StackItem::terminal(Symbol::Operand, ValueType::Int, &three));
    assert!(stack.has_boundary());
    assert_eq!(stack.finished(), None);

    stack.reduce(StackItem::result(ValueType::Int, Some(&three)));
    assert!(!stack.has_boundary());
    assert_eq!(stack.len(), 2);
    assert!(!stack.is_empty());
    assert_eq!(stack.finished().map(|item| item.ty), Some(ValueType::Int));
}

#[test]
fn rules_type_binary_handles() {
    let one = (Token::Integer(1), 1);
    let half = (Token::Double(0.5.into()), 1);
    let star = (Token::Star, 1);

    let left = StackItem::result(ValueType::Int, Some(&one));
    let right = StackItem::result(ValueType::Double, Some(&half));
    let op = StackItem::terminal(Symbol::Mul, ValueType::Undefined, &star);

    let reduction = resolve(&[left, op, right], 1).unwrap();
    assert_eq!(reduction.result.ty, ValueType::Double);
    assert_eq!(reduction.promotion, Promotion::Left);
    assert!(matches!(reduction.rule, Rule::Binary { op: BinaryOp::Mul, .. }));

    let variable = StackItem::result(ValueType::Int, None);
    assert!(matches!(resolve(&[variable, op, right], 1),
                     Err(CompileError::Semantic(SemanticError::TypeMismatch { .. }))));
}

#[test]
fn rules_reject_unknown_handles() {
    let star = (Token::Star, 4);
    let op = StackItem::terminal(Symbol::Mul, ValueType::Undefined, &star);
    let value = StackItem::result(ValueType::Int, None);

    assert!(matches!(resolve(&[op, value], 4),
                     Err(CompileError::Syntax(SyntaxError::NoMatchingRule { line: 4 }))));
    assert!(matches!(resolve(&[], 4),
                     Err(CompileError::Syntax(SyntaxError::NoMatchingRule { .. }))));
}

#[test]
fn operands_are_loaded_in_postfix_order() {
    let mut ctx = Compiler::new(Recorder::default());
    declare(&mut ctx, "a", ValueType::Int);
    declare(&mut ctx, "b", ValueType::Int);

    let ty = run("a * (b - 2) + 1", &mut ctx, &untyped("x")).unwrap();
    assert_eq!(ty, ValueType::Int);
    assert_eq!(rendered(&ctx),
               ["PUSHS GF@a$0",
                "PUSHS GF@b$0",
                "PUSHS int@2",
                "SUBS",
                "MULS",
                "PUSHS int@1",
                "ADDS"]);
}

#[test]
fn expression_stops_before_the_block() {
    let tokens = tokenize("1 < 2 {").unwrap();
    let mut iter = tokens.iter().peekable();
    let mut ctx = Compiler::new(Recorder::default());
    let condition = Condition::new(ConditionKind::While, 0);

    compile_expression(&mut iter, &mut ctx, &ExpressionContext::Condition(condition)).unwrap();
    assert_eq!(iter.next().map(|(token, _)| token), Some(&Token::LBrace));
}

#[test]
fn while_condition_declares_temporaries_once() {
    let mut ctx = Compiler::new(Recorder::default());
    declare(&mut ctx, "i", ValueType::Int);
    let condition = Condition::new(ConditionKind::While, 3);

    ctx.enter_loop();
    run("i > 0", &mut ctx, &ExpressionContext::Condition(condition)).unwrap();
    ctx.exit_loop();

    let lines = rendered(&ctx);
    assert_eq!(ctx.sink.inserts, 3);
    assert_eq!(lines[..4],
               ["DEFVAR GF@while$3$lhs",
                "DEFVAR GF@while$3$rhs",
                "DEFVAR GF@while$3$result",
                "LABEL while$3$check"]);
    assert_eq!(lines[lines.len() - 2..], ["JUMP while$3$end", "LABEL while$3$body"]);
}

#[test]
fn only_the_first_comparison_becomes_a_jump() {
    let mut ctx = Compiler::new(Recorder::default());
    declare(&mut ctx, "n", ValueType::IntNil);
    let condition = Condition::new(ConditionKind::If, 0);

    run("(n ?? 0) == 1", &mut ctx, &ExpressionContext::Condition(condition)).unwrap();
    let lines = rendered(&ctx);
    assert_eq!(lines.iter().filter(|line| line.starts_with("JUMPIFEQ if$0$true")).count(), 1);
    assert_eq!(lines.iter().filter(|line| *line == "EQS").count(), 0);
}

#[test]
fn context_checks_apply_to_the_final_type() {
    let mut ctx = Compiler::new(Recorder::default());
    declare(&mut ctx, "s", ValueType::StringNil);

    let assignment = ExpressionContext::Assignment { name:   "t".to_string(),
                                                     target: ValueType::String, };
    assert!(matches!(run("s", &mut ctx, &assignment),
                     Err(CompileError::Semantic(SemanticError::TypeMismatch { .. }))));
    assert_eq!(run("s ?? \"\"", &mut ctx, &assignment).unwrap(), ValueType::String);

    assert!(matches!(run("nil", &mut ctx, &untyped("n")),
                     Err(CompileError::Semantic(SemanticError::CannotInferType { .. }))));

    assert!(matches!(run("1", &mut ctx, &ExpressionContext::Return),
                     Err(CompileError::Syntax(SyntaxError::ReturnOutsideFunction { .. }))));
}

#[test]
fn empty_expression_is_an_error() {
    let mut ctx = Compiler::new(Recorder::default());
    assert!(matches!(run("", &mut ctx, &untyped("x")),
                     Err(CompileError::Syntax(SyntaxError::ExpectedExpression { .. }))));
    assert!(matches!(run(")", &mut ctx, &untyped("x")),
                     Err(CompileError::Syntax(SyntaxError::InvalidExpression { .. }))));
}
