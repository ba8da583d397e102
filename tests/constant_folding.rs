//! Pure-constant expressions fold at compile time: no arithmetic instruction
//! should ever reach the emitted IR for them.

#[test]
fn arithmetic_precedence_folds_to_a_single_literal() {
    let source = "int main() { return 2 + 3 * 4; }";
    let output = c_llvm::compile(source, "test.c").expect("valid program should compile");

    assert!(output.ir.contains("ret i64 14"), "expected folded return, got:\n{}", output.ir);
    assert!(!output.ir.contains("add"), "addition should have been folded away:\n{}", output.ir);
    assert!(!output.ir.contains("mul"), "multiplication should have been folded away:\n{}", output.ir);
}

#[test]
fn comparison_of_two_constants_folds() {
    let source = "int main() { return 3 < 5; }";
    let output = c_llvm::compile(source, "test.c").expect("valid program should compile");

    assert!(output.ir.contains("ret i64 1"));
    assert!(!output.ir.contains("icmp"));
}

#[test]
fn unary_negation_of_a_constant_folds() {
    let source = "int main() { return -(2 + 2); }";
    let output = c_llvm::compile(source, "test.c").expect("valid program should compile");

    assert!(output.ir.contains("ret i64 -4"));
    assert!(!output.ir.contains("mul"));
}
