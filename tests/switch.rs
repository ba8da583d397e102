//! `switch`/`case`/`default` lowering to an LLVM `switch` instruction.

#[test]
fn switch_with_default_builds_a_jump_table() {
    let source = "int main() { int x = 0; switch (1) { case 1: x = 1; break; default: x = 2; } return x; }";
    let output = c_llvm::compile(source, "test.c").expect("valid program should compile");

    assert!(output.ir.contains("switch i64 1,"), "missing switch dispatch:\n{}", output.ir);
    assert!(output.ir.contains("i64 1, label %Switch"), "missing case-1 table entry:\n{}", output.ir);
    assert!(output.ir.contains(".Case1:"), "missing case-1 label:\n{}", output.ir);
    assert!(output.ir.contains(".Default:"), "missing default label:\n{}", output.ir);
}

#[test]
fn switch_without_a_default_falls_through_to_end() {
    let source = "int main() { int x = 0; switch (x) { case 1: x = 1; break; } return x; }";
    let output = c_llvm::compile(source, "test.c").expect("valid program should compile");

    assert!(!output.ir.contains(".Default:"), "no default: clause was written:\n{}", output.ir);
    // With no `default:`, the switch's own default target is its end label.
    assert!(
        output.ir.lines().any(|l| l.contains("switch i64") && l.contains(".End [")),
        "missing-default switch should dispatch its default case straight to End:\n{}",
        output.ir
    );
}

#[test]
fn case_label_with_a_non_constant_value_is_rejected() {
    let source = "int main() { int x = 1; switch (x) { case x: break; } return 0; }";
    let failure = c_llvm::compile(source, "test.c").expect_err("non-constant case label should fail");
    assert!(failure.errors.iter().any(|e| matches!(e, c_llvm::CompileError::NonConstantWhereRequired(_, _))));
}

#[test]
fn break_inside_switch_exits_the_switch_not_an_enclosing_loop() {
    let source = "int main() { int x = 0; while (1) { switch (x) { case 0: x = 1; break; } return x; } }";
    let output = c_llvm::compile(source, "test.c").expect("valid program should compile");

    // the `break` must target the switch's own `.End`, not the enclosing `While...End`.
    assert!(
        output
            .ir
            .lines()
            .any(|l| { let l = l.trim(); l.starts_with("br label %Switch") && l.ends_with(".End") }),
        "break inside switch should target the switch's end label:\n{}",
        output.ir
    );
}
