//! `while`, `do`/`while`, and `for` lowering: one set of structured labels per
//! loop, `break`/`continue` resolving to the right target.

fn has_line(ir: &str, prefix: &str, suffix: &str) -> bool {
    ir.lines().any(|line| {
        let line = line.trim();
        line.starts_with(prefix) && line.ends_with(suffix)
    })
}

#[test]
fn a_while_loop_emits_exactly_one_test_body_end_triple() {
    let source = "int main() { int a = 0; while (a < 10) a = a + 1; return a; }";
    let output = c_llvm::compile(source, "test.c").expect("valid program should compile");

    assert_eq!(output.ir.matches(".Test:").count(), 1);
    assert_eq!(output.ir.matches(".Body:").count(), 1);
    assert_eq!(output.ir.matches(".End:").count(), 1);
    assert!(output.ir.contains("br i1 %tmp"), "condition should branch on a computed i1:\n{}", output.ir);
}

#[test]
fn do_while_runs_the_body_before_the_first_test() {
    let source = "int main() { int a = 0; do { a = a + 1; } while (a < 3); return a; }";
    let output = c_llvm::compile(source, "test.c").expect("valid program should compile");

    // The body block must appear (and therefore run) before the test block,
    // unlike a plain `while` loop where the test comes first.
    let body_pos = output.ir.find(".Body:").expect("body label");
    let test_pos = output.ir.find(".Test:").expect("test label");
    assert!(body_pos < test_pos, "do/while must enter the body before the first test:\n{}", output.ir);
}

#[test]
fn a_for_loop_has_a_separate_increment_block_and_continue_targets_it() {
    let source = "int main() { int i; int sum = 0; for (i = 0; i < 5; i = i + 1) { if (i == 2) continue; sum = sum + i; } return sum; }";
    let output = c_llvm::compile(source, "test.c").expect("valid program should compile");

    assert!(output.ir.contains(".Inc:"), "for loop needs its own increment block:\n{}", output.ir);
    // `continue` inside the loop body must branch to the increment block, not the test block.
    assert!(
        has_line(&output.ir, "br label %For", ".Inc"),
        "continue should target the increment block:\n{}",
        output.ir
    );
}

#[test]
fn break_exits_the_innermost_loop() {
    let source = "int main() { int i = 0; while (1) { if (i == 5) break; i = i + 1; } return i; }";
    let output = c_llvm::compile(source, "test.c").expect("valid program should compile");

    assert!(
        has_line(&output.ir, "br label %While", ".End"),
        "break should target the loop's end block:\n{}",
        output.ir
    );
}

#[test]
fn continue_outside_any_loop_is_a_control_flow_error() {
    let source = "int main() { continue; return 0; }";
    let failure = c_llvm::compile(source, "test.c").expect_err("stray continue should fail");
    assert!(failure.errors.iter().any(|e| matches!(e, c_llvm::CompileError::BadControlFlow(_, _))));
}
