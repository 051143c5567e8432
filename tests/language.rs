use ifj23c::compile;

fn assert_success(src: &str) -> Vec<String> {
    match compile(src) {
        Ok(program) => program.lines(),
        Err(e) => panic!("Program failed to compile: {e}\n{src}"),
    }
}

fn assert_failure(src: &str, code: i32) {
    match compile(src) {
        Ok(program) => panic!("Program compiled but was expected to fail with {code}:\n{program}"),
        Err(e) => assert_eq!(e.exit_code(), code, "wrong exit code for:\n{src}\nerror: {e}"),
    }
}

/// Asserts that `expected` appears as a contiguous run of lines.
fn assert_sequence(lines: &[String], expected: &[&str]) {
    let found = lines.windows(expected.len())
                     .any(|window| window.iter().zip(expected).all(|(line, want)| line == want));
    assert!(found,
            "expected sequence not found:\n{}\n--- in ---\n{}",
            expected.join("\n"),
            lines.join("\n"));
}

fn position(lines: &[String], wanted: &str) -> usize {
    lines.iter()
         .position(|line| line == wanted)
         .unwrap_or_else(|| panic!("'{wanted}' not found in:\n{}", lines.join("\n")))
}

fn count(lines: &[String], prefix: &str) -> usize {
    lines.iter().filter(|line| line.starts_with(prefix)).count()
}

#[test]
fn every_program_starts_with_header_and_scratch_variables() {
    let program = compile("").unwrap();
    assert_eq!(program.to_string(),
               ".IFJcode23\nDEFVAR GF@$lhs\nDEFVAR GF@$rhs\nDEFVAR GF@$discard\n");
}

#[test]
fn multiplication_is_emitted_before_addition() {
    let lines = assert_success("let x = 3 + 4 * 2\n");
    assert_sequence(&lines,
                    &["DEFVAR GF@x$0",
                      "PUSHS int@3",
                      "PUSHS int@4",
                      "PUSHS int@2",
                      "MULS",
                      "ADDS",
                      "POPS GF@x$0"]);
}

#[test]
fn parentheses_override_precedence() {
    let lines = assert_success("let x = (3 + 4) * 2\n");
    assert_sequence(&lines, &["PUSHS int@3", "PUSHS int@4", "ADDS", "PUSHS int@2", "MULS"]);

    let lines = assert_success("let y = ((1))\n");
    assert_sequence(&lines, &["PUSHS int@1", "POPS GF@y$0"]);
}

#[test]
fn same_precedence_is_left_associative() {
    let lines = assert_success("let x = 8 - 4 - 2\n");
    assert_sequence(&lines,
                    &["PUSHS int@8", "PUSHS int@4", "SUBS", "PUSHS int@2", "SUBS"]);
}

#[test]
fn arithmetic_type_rules() {
    assert_success("let a = 1 + 2\nlet b = 1.5 * 2.5\nlet c = \"x\" + \"y\"\n");
    assert_success("var i: Int = 3\nvar j: Int = i * i - 1\n");

    assert_failure("let a = 1 + \"x\"\n", 7);
    assert_failure("let a = \"x\" - \"y\"\n", 7);
    assert_failure("let i = 1\nlet d = 2.5\nlet e = i + d\n", 7);
}

#[test]
fn integer_literals_are_promoted_next_to_doubles() {
    let lines = assert_success("let d = 1 + 2.5\n");
    assert_sequence(&lines,
                    &["PUSHS int@1",
                      "PUSHS float@0x1.4p+1",
                      "POPS GF@$rhs",
                      "INT2FLOATS",
                      "PUSHS GF@$rhs",
                      "ADDS"]);

    let lines = assert_success("let d = 2.5 * 2\n");
    assert_sequence(&lines, &["PUSHS int@2", "INT2FLOATS", "MULS"]);

    let lines = assert_success("let d: Double = 4\n");
    assert_sequence(&lines, &["PUSHS int@4", "INT2FLOATS", "POPS GF@d$0"]);
}

#[test]
fn equality_promotes_the_integer_literal_on_either_side() {
    let lines = assert_success("let d = 2.0\nif d == 1 {\n}\n");
    assert_sequence(&lines, &["PUSHS GF@d$0", "PUSHS int@1", "INT2FLOATS"]);
    assert!(position(&lines, "INT2FLOATS") < position(&lines, "POPS GF@if$0$rhs"));
    assert_sequence(&lines, &["JUMPIFEQ if$0$true GF@if$0$lhs GF@if$0$rhs"]);

    let lines = assert_success("let d = 2.0\nlet b = 1 == d\n");
    assert_sequence(&lines,
                    &["PUSHS int@1",
                      "PUSHS GF@d$0",
                      "POPS GF@$rhs",
                      "INT2FLOATS",
                      "PUSHS GF@$rhs",
                      "EQS",
                      "POPS GF@b$0"]);

    assert_failure("let i = 1\nlet d = 2.0\nlet b = i == d\n", 7);
}

#[test]
fn bool_values_are_not_operands() {
    assert_failure("let x = (1 < 2) + 1\n", 7);
    assert_failure("var a: Int? = nil\nlet y = (1 < 2) ?? a\n", 7);
}

#[test]
fn division_follows_operand_kinds() {
    let lines = assert_success("let a = 7 / 2\n");
    assert_eq!(count(&lines, "IDIVS"), 1);
    assert_eq!(count(&lines, "DIVS"), 0);

    let lines = assert_success("let b = 7.0 / 2\n");
    assert_sequence(&lines, &["INT2FLOATS", "DIVS"]);

    let lines = assert_success("let x = 1.5\nlet c = x / 0.5\n");
    assert_eq!(count(&lines, "DIVS"), 1);
}

#[test]
fn strings_are_concatenated_through_scratch_variables() {
    let lines = assert_success("let s = \"a b\" + \"c\"\n");
    assert_sequence(&lines,
                    &["PUSHS string@a\\032b",
                      "PUSHS string@c",
                      "POPS GF@$rhs",
                      "POPS GF@$lhs",
                      "CONCAT GF@$lhs GF@$lhs GF@$rhs",
                      "PUSHS GF@$lhs",
                      "POPS GF@s$0"]);
}

#[test]
fn relational_operators_produce_values_outside_conditions() {
    let lines = assert_success("let a = 1\nlet b = 2\nlet c = a <= b\nlet d = a != b\n");
    assert_sequence(&lines, &["PUSHS GF@a$0", "PUSHS GF@b$0", "GTS", "NOTS", "POPS GF@c$0"]);
    assert_sequence(&lines, &["EQS", "NOTS", "POPS GF@d$0"]);
}

#[test]
fn only_optionals_compare_with_nil() {
    let lines = assert_success("var a: Int?\nif a == nil {\n}\nvar b: Int = 1\nif b != 2 {\n}\n");
    assert_sequence(&lines, &["DEFVAR GF@a$0", "MOVE GF@a$0 nil@nil"]);
    assert_sequence(&lines, &["JUMPIFEQ if$0$true GF@if$0$lhs GF@if$0$rhs"]);
    assert_sequence(&lines, &["JUMPIFNEQ if$1$true GF@if$1$lhs GF@if$1$rhs"]);

    assert_failure("let x = 5\nif x == nil {\n}\n", 7);
    assert_failure("var s: String? = nil\nif s < \"a\" {\n}\n", 7);
}

#[test]
fn less_or_equal_condition_uses_a_single_jump() {
    let lines = assert_success("var x = 1\nif x <= 5 {\n    write(x)\n}\n");
    assert_sequence(&lines,
                    &["PUSHS GF@x$0",
                      "PUSHS int@5",
                      "DEFVAR GF@if$0$lhs",
                      "DEFVAR GF@if$0$rhs",
                      "POPS GF@if$0$rhs",
                      "POPS GF@if$0$lhs",
                      "DEFVAR GF@if$0$lt",
                      "DEFVAR GF@if$0$eq",
                      "DEFVAR GF@if$0$result",
                      "LT GF@if$0$lt GF@if$0$lhs GF@if$0$rhs",
                      "EQ GF@if$0$eq GF@if$0$lhs GF@if$0$rhs",
                      "OR GF@if$0$result GF@if$0$lt GF@if$0$eq",
                      "JUMPIFNEQ if$0$true GF@if$0$result bool@false",
                      "JUMP if$0$false",
                      "LABEL if$0$true",
                      "WRITE GF@x$0",
                      "JUMP if$0$end",
                      "LABEL if$0$false",
                      "LABEL if$0$end"]);
    assert_eq!(count(&lines, "LTS"), 0);
}

#[test]
fn greater_or_equal_condition_combines_gt_and_eq() {
    let lines = assert_success("let a = 3\nlet b = 2\nif a >= b {\n} else {\n}\n");
    assert_eq!(count(&lines, "GT "), 1);
    assert_eq!(count(&lines, "EQ "), 1);
    assert_eq!(count(&lines, "OR "), 1);
    assert_eq!(count(&lines, "JUMPIF"), 1);
    assert_sequence(&lines, &["JUMP if$0$end", "LABEL if$0$false", "LABEL if$0$end"]);
}

#[test]
fn conditions_may_compare_arithmetic() {
    let lines = assert_success("let a = 3\nif (a + 1) * 2 > a - 1 {\n}\n");
    assert_sequence(&lines,
                    &["GT GF@if$0$result GF@if$0$lhs GF@if$0$rhs",
                      "JUMPIFNEQ if$0$true GF@if$0$result bool@false"]);
}

#[test]
fn conditions_must_be_single_comparisons() {
    assert_failure("let a = 1\nif a + 1 {\n}\n", 7);
    assert_failure("let a = 1\nif a < 2 < 3 {\n}\n", 2);
    assert_failure("let a = 1\nwhile a {\n}\n", 7);
}

#[test]
fn nested_blocks_shadow_outer_variables() {
    let src = "let x = 1
if x == 1 {
    let x = 2.5
    if x == 2.5 {
        write(x)
    }
}
write(x)
";
    let lines = assert_success(src);
    assert_sequence(&lines, &["DEFVAR GF@x$1", "PUSHS float@0x1.4p+1", "POPS GF@x$1"]);
    assert_sequence(&lines, &["JUMPIFEQ if$1$true GF@if$1$lhs GF@if$1$rhs"]);
    assert_sequence(&lines, &["LABEL if$1$true", "WRITE GF@x$1"]);
    assert_eq!(lines.iter().rev().find(|line| line.starts_with("WRITE")).unwrap(),
               "WRITE GF@x$0");
}

#[test]
fn while_loops_hoist_declarations() {
    let src = "var i = 0
while i < 3 {
    let j = i + 1
    i = j
}
";
    let lines = assert_success(src);
    let check = position(&lines, "LABEL while$0$check");

    for declaration in ["DEFVAR GF@while$0$lhs", "DEFVAR GF@while$0$rhs", "DEFVAR GF@j$1"] {
        assert!(position(&lines, declaration) < check, "{declaration} inside the loop");
        assert_eq!(count(&lines, declaration), 1);
    }

    assert_sequence(&lines,
                    &["JUMPIFNEQ while$0$body GF@while$0$result bool@false",
                      "JUMP while$0$end",
                      "LABEL while$0$body"]);
    assert_sequence(&lines, &["POPS GF@i$0", "JUMP while$0$check", "LABEL while$0$end"]);
}

#[test]
fn optionals_coalesce_and_unwrap() {
    let lines = assert_success("var a: Int? = nil\nlet b = a ?? 0\nlet c: Int = a! + 1\n");
    assert_sequence(&lines,
                    &["POPS GF@$rhs",
                      "POPS GF@$lhs",
                      "JUMPIFEQ coalesce$0$nil GF@$lhs nil@nil",
                      "PUSHS GF@$lhs",
                      "JUMP coalesce$0$end",
                      "LABEL coalesce$0$nil",
                      "PUSHS GF@$rhs",
                      "LABEL coalesce$0$end",
                      "POPS GF@b$0"]);

    assert_failure("var a: Int? = nil\nlet b = a ?? \"x\"\n", 7);
    assert_failure("let b = nil!\n", 7);
}

#[test]
fn if_let_unwraps_in_the_then_branch() {
    let lines = assert_success("var name: String? = \"a\"\nif let name {\n    let n = length(name)\n}\n");
    assert_sequence(&lines,
                    &["JUMPIFNEQ if$0$true GF@name$0 nil@nil",
                      "JUMP if$0$false",
                      "LABEL if$0$true"]);

    assert_failure("let x = 1\nif let x {\n}\n", 7);
}

#[test]
fn declarations_need_a_type() {
    assert_success("var x: Int\nx = 4\nlet y: Double? = nil\n");
    assert_failure("let x = nil\n", 8);
    assert_failure("var x\n", 8);
    assert_failure("var x: Int = nil\n", 7);
}

#[test]
fn variables_must_be_initialized() {
    assert_failure("let x = y + 1\n", 5);
    assert_failure("var x: Int\nlet y = x\n", 5);
    assert_failure("z = 1\n", 5);
}

#[test]
fn constants_cannot_be_reassigned() {
    assert_failure("let x = 1\nx = 2\n", 9);
    assert_success("let x: Int\nx = 2\n");
}

#[test]
fn redefinition_is_error() {
    assert_failure("var x = 1\nvar x = 2\n", 3);
    assert_failure("func f() {\n}\nfunc f() {\n}\n", 3);
    assert_failure("func write() {\n}\n", 3);
}

#[test]
fn lexical_and_syntax_errors() {
    assert_failure("let x = 1 @ 2\n", 1);
    assert_failure("let s = \"open\n", 1);
    assert_failure("let x = (1 + 2\n", 2);
    assert_failure("let x = 1 +\n", 2);
    assert_failure("let x =\n", 2);
    assert_failure("let x = 1 2\n", 2);
    assert_failure("return 1\n", 2);
}

#[test]
fn errors_at_a_line_break_report_that_line() {
    let error = compile("let a = 1\nlet x = a +\nlet y = 2\n").unwrap_err();
    assert_eq!(error.to_string(), "Error on line 2: Malformed expression.");
}

#[test]
fn user_functions() {
    let src = "let r = add(1, 2)
func add(_ a: Int, _ b: Int) -> Int {
    return a + b
}
";
    let lines = assert_success(src);
    assert_sequence(&lines,
                    &["CREATEFRAME",
                      "DEFVAR TF@%0",
                      "MOVE TF@%0 int@1",
                      "DEFVAR TF@%1",
                      "MOVE TF@%1 int@2",
                      "CALL $add",
                      "POPS GF@r$0"]);
    assert_sequence(&lines,
                    &["JUMP $add$end",
                      "LABEL $add",
                      "PUSHFRAME",
                      "DEFVAR LF@a$1",
                      "MOVE LF@a$1 LF@%0",
                      "DEFVAR LF@b$1",
                      "MOVE LF@b$1 LF@%1",
                      "PUSHS LF@a$1",
                      "PUSHS LF@b$1",
                      "ADDS",
                      "POPFRAME",
                      "RETURN"]);
    assert_sequence(&lines, &["POPFRAME", "RETURN", "LABEL $add$end"]);
}

#[test]
fn labelled_arguments_and_promotion() {
    let src = "func scale(by factor: Double) -> Double {
    return factor * 2.0
}
let d = scale(by: 3)
";
    let lines = assert_success(src);
    assert_sequence(&lines, &["MOVE TF@%0 float@0x1.8p+1", "CALL $scale"]);

    assert_failure("func f(by x: Int) {\n}\nf(1)\n", 4);
    assert_failure("func f(_ x: Int) {\n}\nf(x: 1)\n", 4);
    assert_failure("func f(x x: Int) {\n}\n", 9);
}

#[test]
fn function_errors() {
    assert_failure("func f(_ a: Int) -> Int {\n    return a\n}\nlet x = f(1, 2)\n", 4);
    assert_failure("func f(_ a: Int) -> Int {\n    return a\n}\nlet x = f(\"s\")\n", 4);
    assert_failure("func f() -> Int {\n    return \"a\"\n}\n", 4);
    assert_failure("func f() -> Int {\n}\n", 6);
    assert_failure("func f() -> Int {\n    return\n}\n", 6);
    assert_failure("func f() {\n    return 1\n}\n", 6);
    assert_failure("let x = g()\n", 3);
    assert_failure("let x = write(1)\n", 7);
    assert_failure("func f() {\n    func g() {\n    }\n}\n", 2);
}

#[test]
fn builtin_functions() {
    let lines = assert_success("let s = readString()\nlet i = readInt()\n");
    assert_sequence(&lines,
                    &["CREATEFRAME",
                      "DEFVAR TF@%result",
                      "READ TF@%result string",
                      "PUSHS TF@%result",
                      "POPS GF@s$0"]);
    assert_sequence(&lines, &["READ TF@%result int"]);

    let lines = assert_success("let x = 42\nwrite(\"x = \", x, \"\\n\")\n");
    assert_sequence(&lines,
                    &["WRITE string@x\\032=\\032", "WRITE GF@x$0", "WRITE string@\\010"]);

    let lines = assert_success("let n = length(\"abc\")\nlength(\"a\")\n");
    assert_sequence(&lines, &["STRLEN TF@%result string@abc", "PUSHS TF@%result", "POPS GF@n$0"]);
    assert_sequence(&lines, &["PUSHS TF@%result", "POPS GF@$discard"]);

    let lines = assert_success("let d = Int2Double(3)\nlet c = chr(65)\n");
    assert_sequence(&lines, &["PUSHS int@3", "INT2FLOATS", "POPS GF@d$0"]);
    assert_sequence(&lines, &["PUSHS int@65", "INT2CHARS", "POPS GF@c$0"]);

    let lines = assert_success("let o = ord(\"\")\n");
    assert_sequence(&lines, &["JUMPIFEQ ord$0$empty TF@%length int@0"]);

    let lines =
        assert_success("let t = substring(of: \"abc\", startingAt: 0, endingBefore: 2)\nlet u: String = t ?? \"\"\n");
    assert_sequence(&lines, &["LABEL substring$0$nil", "PUSHS nil@nil", "LABEL substring$0$exit"]);

    assert_failure("let t = substring(of: \"abc\", startingAt: 0, ending: 2)\n", 4);
    assert_failure("let t: String = substring(of: \"abc\", startingAt: 0, endingBefore: 2)\n", 7);
    assert_failure("let n = length(1)\n", 4);
}

#[test]
fn comments_and_multiline_strings() {
    let src = "/* outer /* inner */ still comment */
let s = \"\"\"
two
lines
\"\"\"
// trailing
write(s)
";
    let lines = assert_success(src);
    assert_sequence(&lines, &["PUSHS string@two\\010lines", "POPS GF@s$0"]);
}
