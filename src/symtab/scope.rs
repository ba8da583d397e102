//! The scope stack: an innermost-last `Vec<Frame>`, with a one-shot "pending scope"
//! that lets a function declarator pre-seed parameters into the body's frame.
//!
//! Grounded in `original_source/c_llvm/traversal_state.py`'s `ScopedSymbolTable` (a stack of
//! dicts, lookup walks from the top) and `CompilerState.set_pending_scope`/`enter_block`.

use std::collections::HashMap;

use crate::types::TypeId;

/// A declared name: its type, the register/pointer it lives at, and whether it is a
/// global (so codegen knows to emit `@name` instead of `%name`).
#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub ty: TypeId,
    pub register: String,
    pub is_global: bool,
    pub is_defined: bool,
}

type Frame = HashMap<String, Variable>;

#[derive(Default)]
pub struct ScopeStack {
    frames: Vec<Frame>,
    /// Seeded by `set_pending_scope`, consumed by the next `enter_block`.
    pending: Frame,
}

impl ScopeStack {
    pub fn new() -> Self {
        ScopeStack {
            frames: vec![Frame::new()],
            pending: Frame::new(),
        }
    }

    /// Declares `var` in the current (innermost) frame. Returns `false` if a variable
    /// of that name already exists in this exact frame (a redeclaration).
    pub fn declare(&mut self, var: Variable) -> bool {
        let frame = self.frames.last_mut().expect("global frame always present");
        if frame.contains_key(&var.name) {
            return false;
        }
        frame.insert(var.name.clone(), var);
        true
    }

    /// Looks up `name`, walking from the innermost frame outward.
    pub fn lookup(&self, name: &str) -> Option<&Variable> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    /// Flips a previously-declared (forward) variable to defined, e.g. once a
    /// `extern`-less tentative global or a function prototype gets its body/initializer.
    pub fn mark_defined(&mut self, name: &str) {
        for frame in self.frames.iter_mut().rev() {
            if let Some(var) = frame.get_mut(name) {
                var.is_defined = true;
                return;
            }
        }
    }

    /// Queues bindings (typically function parameters) to appear as already-present
    /// in the *next* frame opened by `enter_block`.
    pub fn set_pending_scope(&mut self, vars: Vec<Variable>) {
        for var in vars {
            self.pending.insert(var.name.clone(), var);
        }
    }

    pub fn enter_block(&mut self) {
        let seed = std::mem::take(&mut self.pending);
        self.frames.push(seed);
    }

    pub fn leave_block(&mut self) {
        // The global frame (index 0) is never popped.
        if self.frames.len() > 1 {
            self.frames.pop();
        }
        self.pending.clear();
    }

    /// True at the outermost frame, i.e. not inside any function body.
    pub fn is_global(&self) -> bool {
        self.frames.len() == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeArena;

    fn var(name: &str, ty: &crate::types::TypeId) -> Variable {
        Variable {
            name: name.to_string(),
            ty: ty.clone(),
            register: format!("%{name}"),
            is_global: false,
            is_defined: true,
        }
    }

    #[test]
    fn a_well_formed_translation_unit_returns_to_exactly_the_global_frame() {
        let mut scopes = ScopeStack::new();
        assert!(scopes.is_global());
        scopes.enter_block();
        scopes.enter_block();
        assert!(!scopes.is_global());
        scopes.leave_block();
        scopes.leave_block();
        assert!(scopes.is_global());
        // Leaving past the global frame is a no-op, not an underflow.
        scopes.leave_block();
        assert!(scopes.is_global());
    }

    #[test]
    fn declaring_the_same_name_twice_in_one_frame_is_rejected() {
        let arena = TypeArena::new();
        let int_ty = arena.get("int").unwrap();
        let mut scopes = ScopeStack::new();
        assert!(scopes.declare(var("x", &int_ty)));
        assert!(!scopes.declare(var("x", &int_ty)));
    }

    #[test]
    fn an_inner_frame_may_shadow_an_outer_declaration() {
        let arena = TypeArena::new();
        let int_ty = arena.get("int").unwrap();
        let mut scopes = ScopeStack::new();
        scopes.declare(var("x", &int_ty));
        scopes.enter_block();
        assert!(scopes.declare(var("x", &int_ty)));
        assert_eq!(scopes.lookup("x").unwrap().register, "%x");
        scopes.leave_block();
        assert_eq!(scopes.lookup("x").unwrap().register, "%x");
    }

    #[test]
    fn pending_scope_is_consumed_exactly_once_by_the_next_enter_block() {
        let arena = TypeArena::new();
        let int_ty = arena.get("int").unwrap();
        let mut scopes = ScopeStack::new();
        scopes.set_pending_scope(vec![var("param", &int_ty)]);

        scopes.enter_block();
        assert!(scopes.lookup("param").is_some(), "pending vars must seed the next opened frame");
        scopes.leave_block();

        scopes.enter_block();
        assert!(
            scopes.lookup("param").is_none(),
            "the pending seed must not leak into a later, unrelated block"
        );
        scopes.leave_block();
    }
}
