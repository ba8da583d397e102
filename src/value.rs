//! The value every expression-lowering operation produces.

use crate::types::TypeId;

/// What lowering an expression hands back to its caller.
///
/// An lvalue carries both the loaded rvalue (`value`) and the address it was loaded from
/// (`lvalue_pointer`); consumers that need the address (`&x`, assignment, member access)
/// use the latter, everyone else just uses `value`.
#[derive(Debug, Clone)]
pub struct ExprResult {
    /// Textual SSA value or literal, e.g. `"%tmp.3"` or `"5"`. `None` for a bare function
    /// designator, whose only useful part is its address.
    pub value: Option<String>,
    pub ty: TypeId,
    /// Whether `value` is usable as a constant initializer (a literal, not a load).
    pub is_constant: bool,
    /// Present when the expression is an lvalue: the address the value was (or would be)
    /// loaded from / stored to.
    pub lvalue_pointer: Option<String>,
}

impl ExprResult {
    pub fn rvalue(value: impl ToString, ty: TypeId, is_constant: bool) -> Self {
        ExprResult {
            value: Some(value.to_string()),
            ty,
            is_constant,
            lvalue_pointer: None,
        }
    }

    pub fn lvalue(value: impl ToString, ty: TypeId, pointer: impl ToString) -> Self {
        ExprResult {
            value: Some(value.to_string()),
            ty,
            is_constant: false,
            lvalue_pointer: Some(pointer.to_string()),
        }
    }

    /// A function designator: only its address (`lvalue_pointer`) is meaningful.
    pub fn function(ty: TypeId, pointer: impl ToString) -> Self {
        ExprResult {
            value: None,
            ty,
            is_constant: false,
            lvalue_pointer: Some(pointer.to_string()),
        }
    }

    pub fn is_lvalue(&self) -> bool {
        self.lvalue_pointer.is_some()
    }

    /// The operand text as it appears in IR, e.g. for `add i64 X, Y`.
    pub fn operand(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }
}
