//! Address-of, dereference, and pointer arithmetic.

#[test]
fn address_of_and_dereference_round_trip() {
    let source = "int main() { int x = 5; int *p = &x; return *p; }";
    let output = c_llvm::compile(source, "test.c").expect("valid program should compile");

    assert!(output.ir.contains("alloca i64"));
    // `&x` needs no instruction of its own: it is just `x`'s alloca register.
    assert!(output.ir.contains("store i64 %var") || output.ir.contains("store i64 5"));
    assert!(output.ir.contains("load i64,"), "dereferencing p should load the pointee:\n{}", output.ir);
}

#[test]
fn pointer_arithmetic_scales_by_the_pointee_size() {
    let source = "int main() { int a[4]; int *p = a; p = p + 1; return *p; }";
    let output = c_llvm::compile(source, "test.c").expect("valid program should compile");

    assert!(output.ir.contains("getelementptr i64, i64 *"), "pointer + int should lower to a scaled GEP:\n{}", output.ir);
}

#[test]
fn taking_the_address_of_a_non_lvalue_is_an_error() {
    let source = "int main() { return &1; }";
    let failure = c_llvm::compile(source, "test.c").expect_err("address of a literal should fail");
    assert!(failure.errors.iter().any(|e| matches!(e, c_llvm::CompileError::LvalueRequired(_, _))));
}

#[test]
fn dereferencing_a_non_pointer_is_a_type_error() {
    let source = "int main() { int x = 1; return *x; }";
    let failure = c_llvm::compile(source, "test.c").expect_err("dereferencing an int should fail");
    assert!(failure.errors.iter().any(|e| matches!(e, c_llvm::CompileError::TypeMismatch(_, _))));
}
