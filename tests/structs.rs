//! Struct declaration, member access, and the `->`/`.` duality.

#[test]
fn struct_definition_emits_a_type_alias_and_members_round_trip() {
    let source = "struct Point { int x; int y; }; int main() { struct Point p; p.x = 1; p.y = 2; return p.x + p.y; }";
    let output = c_llvm::compile(source, "test.c").expect("valid program should compile");

    assert!(output.ir.contains("%struct.Point = type { i64, i64 }"), "missing struct alias:\n{}", output.ir);
    assert!(output.ir.contains("alloca %struct.Point"), "missing struct storage:\n{}", output.ir);
    // Member stores/loads go through a field GEP, not a flat offset.
    assert!(output.ir.contains("getelementptr %struct.Point"), "missing member GEP:\n{}", output.ir);
    assert!(output.ir.contains("i32 0, i32 1"), "second member should be field index 1:\n{}", output.ir);
}

#[test]
fn pointer_to_struct_uses_arrow_the_same_way() {
    let source = "struct Point { int x; int y; }; int f(struct Point *p) { return p->x; } int main() { struct Point p; return f(&p); }";
    let output = c_llvm::compile(source, "test.c").expect("valid program should compile");

    assert!(output.ir.contains("getelementptr %struct.Point"));
    assert!(output.ir.contains("i32 0, i32 0"));
}

#[test]
fn unknown_member_is_an_error() {
    let source = "struct Point { int x; }; int main() { struct Point p; return p.z; }";
    let failure = c_llvm::compile(source, "test.c").expect_err("unknown member should fail");
    assert!(failure.errors.iter().any(|e| matches!(e, c_llvm::CompileError::UnknownIdentifier(_, _))));
}

#[test]
fn redefining_a_struct_tag_is_an_error() {
    let source = "struct Point { int x; }; struct Point { int y; };";
    let failure = c_llvm::compile(source, "test.c").expect_err("struct redefinition should fail");
    assert!(failure.errors.iter().any(|e| matches!(e, c_llvm::CompileError::Redefinition(_, _))));
}
