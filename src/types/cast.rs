//! Implicit and explicit conversions between scalar types.
//!
//! Grounded in `original_source/c_llvm/ast/expressions.py`'s `cast_if_necessary` (integer
//! operand promoted to float before a mixed-type binary op) and `cast_to_bool` (the
//! `icmp`/`fcmp ... ne 0` + `zext` pattern used by `!`, `&&`/`||`, and `if`/`while` conditions).
//! `CompilerState` is deliberately not named here: callers supply a `fresh_temp` closure so the
//! type library stays independent of the symbol-table module.

use super::{TypeId, TypeKind};
use crate::value::ExprResult;

/// Casts `result` to `target`, emitting whatever conversion instruction is needed.
///
/// Returns `(ir_text, new_result)`. `ir_text` is empty when no instruction was needed
/// (same type, or a constant that folds without emitting code).
pub fn cast_value(
    result: &ExprResult,
    target: &TypeId,
    fresh_temp: &mut dyn FnMut() -> String,
) -> (String, ExprResult) {
    if result.ty == *target {
        return (String::new(), result.clone());
    }

    if result.is_constant {
        if let Some(folded) = fold_constant_cast(result, target) {
            return (String::new(), folded);
        }
    }

    match (result.ty.kind(), target.kind()) {
        (TypeKind::Bool, TypeKind::Integer(_)) => {
            cast_to_int_or_float(result, target, fresh_temp, "zext", "i1")
        }
        (TypeKind::Bool, TypeKind::Floating) => {
            cast_to_int_or_float(result, target, fresh_temp, "uitofp", "i1")
        }
        (TypeKind::Integer(_), TypeKind::Floating) => {
            let register = fresh_temp();
            let ir = format!(
                "{register} = sitofp {} {} to {}",
                result.ty.llvm_type(),
                result.operand(),
                target.llvm_type()
            );
            (ir, ExprResult::rvalue(register, target.clone(), false))
        }
        (TypeKind::Floating, TypeKind::Integer(_)) => {
            let register = fresh_temp();
            let ir = format!(
                "{register} = fptosi {} {} to {}",
                result.ty.llvm_type(),
                result.operand(),
                target.llvm_type()
            );
            (ir, ExprResult::rvalue(register, target.clone(), false))
        }
        (TypeKind::Integer(_), TypeKind::Integer(_)) => {
            cast_int_to_int(result, target, fresh_temp)
        }
        (_, TypeKind::Bool) => cast_to_bool(result, target, fresh_temp),
        (TypeKind::Pointer(_), TypeKind::Pointer(_)) => {
            let register = fresh_temp();
            let ir = format!(
                "{register} = bitcast {} {} to {}",
                result.ty.llvm_type(),
                result.operand(),
                target.llvm_type()
            );
            (ir, ExprResult::rvalue(register, target.clone(), false))
        }
        _ => {
            // No defined conversion; hand the value through unchanged rather than panic,
            // the caller (codegen) is responsible for rejecting this earlier as a type error.
            (String::new(), result.clone())
        }
    }
}

fn cast_to_int_or_float(
    result: &ExprResult,
    target: &TypeId,
    fresh_temp: &mut dyn FnMut() -> String,
    op: &str,
    from_llvm: &str,
) -> (String, ExprResult) {
    let register = fresh_temp();
    let ir = format!(
        "{register} = {op} {from_llvm} {} to {}",
        result.operand(),
        target.llvm_type()
    );
    (ir, ExprResult::rvalue(register, target.clone(), false))
}

fn cast_int_to_int(
    result: &ExprResult,
    target: &TypeId,
    fresh_temp: &mut dyn FnMut() -> String,
) -> (String, ExprResult) {
    let from_size = result.ty.size_of();
    let to_size = target.size_of();
    let register = fresh_temp();
    let op = if to_size > from_size {
        "sext"
    } else if to_size < from_size {
        "trunc"
    } else {
        return (String::new(), ExprResult::rvalue(result.operand(), target.clone(), false));
    };
    let ir = format!(
        "{register} = {op} {} {} to {}",
        result.ty.llvm_type(),
        result.operand(),
        target.llvm_type()
    );
    (ir, ExprResult::rvalue(register, target.clone(), false))
}

/// `!`, `&&`/`||`, and condition expressions all reduce a scalar to an `i1` via this pattern,
/// then `cast_value` back up to whatever integer type the caller needs.
pub fn cast_to_bool(
    result: &ExprResult,
    bool_ty: &TypeId,
    fresh_temp: &mut dyn FnMut() -> String,
) -> (String, ExprResult) {
    let register = fresh_temp();
    let (cmp, zero) = if result.ty.is_float() {
        ("fcmp one", "0.0")
    } else {
        ("icmp ne", "0")
    };
    let ir = format!(
        "{register} = {cmp} {} {}, {zero}",
        result.ty.llvm_type(),
        result.operand()
    );
    (ir, ExprResult::rvalue(register, bool_ty.clone(), false))
}

fn fold_constant_cast(result: &ExprResult, target: &TypeId) -> Option<ExprResult> {
    let literal = result.operand();
    match (result.ty.kind(), target.kind()) {
        (TypeKind::Floating, TypeKind::Integer(_)) | (TypeKind::Floating, TypeKind::Bool) => {
            let value: f64 = literal.parse().ok()?;
            Some(ExprResult::rvalue((value as i64).to_string(), target.clone(), true))
        }
        (TypeKind::Integer(_), TypeKind::Floating) | (TypeKind::Bool, TypeKind::Floating) => {
            let value: i64 = literal.parse().ok()?;
            Some(ExprResult::rvalue(format!("{value:.1}"), target.clone(), true))
        }
        (_, TypeKind::Bool) => {
            let is_zero = literal == "0" || literal == "0.0";
            Some(ExprResult::rvalue(if is_zero { "0" } else { "1" }, target.clone(), true))
        }
        _ => None,
    }
}
