//! Function definitions, declarations, and calls.

#[test]
fn a_function_call_lowers_to_a_call_instruction() {
    let source = "int f(int x) { return x + 1; } int main() { return f(41); }";
    let output = c_llvm::compile(source, "test.c").expect("valid program should compile");

    assert!(output.ir.contains("define i64 @f("), "missing definition of f:\n{}", output.ir);
    assert!(output.ir.contains("define i64 @main("), "missing definition of main:\n{}", output.ir);
    assert!(output.ir.contains("call i64 @f(i64 41)"), "expected a direct call with the folded argument:\n{}", output.ir);

    // `f`'s body loads its parameter back out of its alloca before adding 1.
    assert!(output.ir.contains("alloca i64"));
    assert!(output.ir.contains("store i64 %x"));
    assert!(output.ir.contains("add i64"));
}

#[test]
fn a_forward_declaration_emits_declare_and_is_satisfied_by_a_later_definition() {
    let source = "int g(int x); int main() { return g(1); } int g(int x) { return x; }";
    let output = c_llvm::compile(source, "test.c").expect("valid program should compile");

    assert!(output.ir.contains("declare i64 @g(i64)"));
    assert!(output.ir.contains("define i64 @g(i64"));
}

#[test]
fn calling_an_undeclared_function_is_an_error() {
    let source = "int main() { return missing(1); }";
    let failure = c_llvm::compile(source, "test.c").expect_err("undeclared function should fail");
    assert!(!failure.errors.is_empty());
    assert!(failure.errors.iter().any(|e| matches!(e, c_llvm::CompileError::UnknownIdentifier(_, _))));
}

#[test]
fn redefining_a_function_is_an_error() {
    let source = "int f() { return 1; } int f() { return 2; }";
    let failure = c_llvm::compile(source, "test.c").expect_err("redefinition should fail");
    assert!(failure.errors.iter().any(|e| matches!(e, c_llvm::CompileError::Redefinition(_, _))));
}

#[test]
fn wrong_argument_count_is_an_arity_error() {
    let source = "int f(int x) { return x; } int main() { return f(1, 2); }";
    let failure = c_llvm::compile(source, "test.c").expect_err("extra argument should fail");
    assert!(failure.errors.iter().any(|e| matches!(e, c_llvm::CompileError::ArityMismatch(_, _))));
}

#[test]
fn a_non_void_function_falling_off_the_end_warns_but_still_compiles() {
    let source = "int f() { int x = 1; }";
    let output = c_llvm::compile(source, "test.c").expect("should still compile with a warning");
    assert_eq!(output.warnings.len(), 1);
    assert!(matches!(output.warnings[0], c_llvm::CompileWarning::MissingReturn(_, _)));
    assert!(output.ir.contains("ret i64 undef"));
}
