//! Diagnostics for malformed programs: each should fail with a specific,
//! well-typed `CompileError` rather than panicking or guessing.

use c_llvm::CompileError;

#[test]
fn conflicting_redeclaration_of_a_global_is_an_error() {
    let source = "int x; float x; int main() { return 0; }";
    let failure = c_llvm::compile(source, "test.c").expect_err("conflicting types should fail");
    assert!(failure.errors.iter().any(|e| matches!(e, CompileError::Redeclaration(_, _))));
}

#[test]
fn assigning_to_a_non_lvalue_is_an_error() {
    let source = "int main() { 1 = 2; return 0; }";
    let failure = c_llvm::compile(source, "test.c").expect_err("assigning to a literal should fail");
    assert!(failure.errors.iter().any(|e| matches!(e, CompileError::LvalueRequired(_, _))));
}

#[test]
fn break_outside_a_loop_or_switch_is_an_error() {
    let source = "int main() { break; return 0; }";
    let failure = c_llvm::compile(source, "test.c").expect_err("stray break should fail");
    assert!(failure.errors.iter().any(|e| matches!(e, CompileError::BadControlFlow(_, _))));
}

#[test]
fn returning_a_value_from_a_void_function_is_an_error() {
    let source = "void f() { return 1; }";
    let failure = c_llvm::compile(source, "test.c").expect_err("void function returning a value should fail");
    assert!(failure.errors.iter().any(|e| matches!(e, CompileError::VoidReturnMismatch(_, _))));
}

#[test]
fn returning_nothing_from_a_non_void_function_is_an_error() {
    let source = "int f() { return; }";
    let failure = c_llvm::compile(source, "test.c").expect_err("bare return from int function should fail");
    assert!(failure.errors.iter().any(|e| matches!(e, CompileError::VoidReturnMismatch(_, _))));
}

#[test]
fn unknown_type_name_is_an_error() {
    let source = "int main() { frobnicate x; return 0; }";
    let failure = c_llvm::compile(source, "test.c");
    // Either an unknown-type or a parse error is acceptable, depending on how
    // the grammar disambiguates a bare identifier used as a type specifier.
    assert!(failure.is_err());
}

#[test]
fn declaring_the_same_local_twice_is_an_error() {
    let source = "int main() { int x; int x; return 0; }";
    let failure = c_llvm::compile(source, "test.c").expect_err("shadowing a local in the same scope should fail");
    assert!(failure.errors.iter().any(|e| matches!(e, CompileError::Redeclaration(_, _))));
}

#[test]
fn array_of_functions_is_an_invalid_declarator() {
    let source = "int f[3]();";
    let failure = c_llvm::compile(source, "test.c").expect_err("array of functions should fail");
    assert!(failure.errors.iter().any(|e| matches!(e, CompileError::InvalidDeclarator(_, _))));
}

#[test]
fn incomplete_array_type_is_an_error() {
    let source = "int arr[]; int main() { return 0; }";
    let failure = c_llvm::compile(source, "test.c").expect_err("array without a length should fail");
    assert!(failure.errors.iter().any(|e| matches!(e, CompileError::IncompleteType(_, _))));
}

#[test]
fn redeclaring_a_local_in_a_nested_scope_is_allowed() {
    let source = "int main() { int x = 1; { int x = 2; x = x + 1; } return x; }";
    let output = c_llvm::compile(source, "test.c").expect("shadowing in an inner scope is legal C");
    assert!(output.ir.contains("ret i64"));
}
