//! Array declaration/indexing/decay and string-literal globals.

#[test]
fn array_element_assignment_and_dereference() {
    let source = "int main() { int a[3]; a[0] = 7; return *a; }";
    let output = c_llvm::compile(source, "test.c").expect("valid program should compile");

    assert!(output.ir.contains("alloca [3 x i64]"), "array storage missing:\n{}", output.ir);
    assert!(output.ir.contains("getelementptr [3 x i64]"), "array-to-pointer decay missing:\n{}", output.ir);
    assert!(output.ir.contains("store i64 7,"), "element store missing:\n{}", output.ir);
    assert!(output.ir.contains("ret i64 %tmp"), "dereference-and-return should read back a loaded value:\n{}", output.ir);
}

#[test]
fn string_literal_becomes_a_global_byte_array_and_decays_to_a_pointer() {
    let source = r#"int main() { char *s = "hi"; return s[1]; }"#;
    let output = c_llvm::compile(source, "test.c").expect("valid program should compile");

    assert!(output.ir.contains("= global [3 x i8] c\""), "expected a null-terminated 3-byte global:\n{}", output.ir);
    assert!(output.ir.contains("getelementptr i8, i8 *"), "indexing a char pointer should use a byte GEP:\n{}", output.ir);
    // `s[1]` is a `char`, widened to the `int` return type.
    assert!(output.ir.contains("sext i8"), "char-to-int widening missing on return:\n{}", output.ir);
}

#[test]
fn negative_array_length_is_rejected() {
    let source = "int main() { int a[-1]; return 0; }";
    let failure = c_llvm::compile(source, "test.c").expect_err("negative array length should fail");
    assert!(failure.errors.iter().any(|e| matches!(e, c_llvm::CompileError::NonConstantWhereRequired(_, _))));
}
