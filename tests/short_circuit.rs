//! `&&`/`||` lower to branches, not eager boolean arithmetic, so the right-hand
//! side is only ever evaluated when it can affect the result.

#[test]
fn logical_and_branches_around_the_right_operand() {
    let source = "int f(int x) { return x; } int main() { int a = 1; return a && f(2); }";
    let output = c_llvm::compile(source, "test.c").expect("valid program should compile");

    // The call must sit behind a conditional branch, not run unconditionally.
    let call_pos = output.ir.find("call i64 @f").expect("call to f should still be emitted");
    let br_pos = output.ir.find("br i1").expect("short-circuit branch should be emitted");
    assert!(br_pos < call_pos, "the branch deciding whether to evaluate the right side must come first:\n{}", output.ir);
    assert!(output.ir.contains("phi i64"), "logical result is joined via a phi:\n{}", output.ir);
}

#[test]
fn logical_or_short_circuits_too() {
    let source = "int f(int x) { return x; } int main() { int a = 1; return a || f(2); }";
    let output = c_llvm::compile(source, "test.c").expect("valid program should compile");

    assert!(output.ir.contains("call i64 @f"));
    assert!(output.ir.contains("phi i64"));
}

#[test]
fn logical_not_of_a_constant_folds() {
    let source = "int main() { return !0; }";
    let output = c_llvm::compile(source, "test.c").expect("valid program should compile");

    assert!(output.ir.contains("ret i64 1"));
}
