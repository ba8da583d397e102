//! Per-compilation mutable state: symbol table, counters, control-flow context, and
//! accumulated diagnostics. The single object threaded through every lowering function.
//!
//! Grounded in `original_source/c_llvm/traversal_state.py`'s `CompilerState`.

mod scope;

pub use scope::{ScopeStack, Variable};

use crate::{
    error::{CompileError, CompileWarning},
    span::Span,
    types::{TypeArena, TypeId},
};

/// `(break_label, continue_label)` for the innermost enclosing loop (or `switch`, for `break`).
#[derive(Debug, Clone)]
pub struct LoopContext {
    pub break_label: String,
    pub continue_label: String,
}

/// Tracks one open `switch`: its numeric id (for `SwitchN.CaseK` labels), whether a
/// `default:` has been seen, and the `(constant, label)` pairs collected so far.
#[derive(Debug, Clone)]
pub struct SwitchContext {
    pub id: u64,
    pub default_seen: bool,
    pub cases: Vec<(String, String)>,
}

/// One open `loop`/`switch` construct, in the order it was entered. `break` targets
/// whichever of these is innermost; `continue` and `case`/`default` each look past
/// the other kind to find the nearest frame that matters to them.
#[derive(Debug, Clone)]
enum ControlFrame {
    Loop(LoopContext),
    Switch(SwitchContext),
}

pub struct CompilerState {
    pub types: TypeArena,
    pub scopes: ScopeStack,
    next_free_id: u64,
    pub errors: Vec<CompileError>,
    pub warnings: Vec<CompileWarning>,
    /// Return type of the function currently being lowered. `None` at global scope.
    pub return_type: Option<TypeId>,
    control_stack: Vec<ControlFrame>,
    /// Struct aliases and string-literal globals, emitted ahead of the function bodies.
    pub global_declarations: Vec<String>,
}

impl Default for CompilerState {
    fn default() -> Self {
        CompilerState {
            types: TypeArena::new(),
            scopes: ScopeStack::new(),
            next_free_id: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
            return_type: None,
            control_stack: Vec::new(),
            global_declarations: Vec::new(),
        }
    }
}

impl CompilerState {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_free_id;
        self.next_free_id += 1;
        id
    }

    pub fn fresh_temp(&mut self) -> String {
        format!("%tmp.{}", self.next_id())
    }

    pub fn fresh_var(&mut self, name: &str) -> String {
        format!("%var.{}.{}", name, self.next_id())
    }

    pub fn fresh_label(&mut self) -> String {
        format!("label{}", self.next_id())
    }

    /// Monotonic id used to build structured labels like `If3.True`/`For7.End`.
    pub fn fresh_id(&mut self) -> u64 {
        self.next_id()
    }

    pub fn is_global(&self) -> bool {
        self.scopes.is_global()
    }

    pub fn error(&mut self, err: CompileError) {
        self.errors.push(err);
    }

    pub fn warn(&mut self, warning: CompileWarning) {
        self.warnings.push(warning);
    }

    pub fn unknown_identifier(&mut self, name: &str, span: &Span) {
        self.error(CompileError::UnknownIdentifier(
            format!("use of undeclared identifier '{name}'"),
            span.clone(),
        ));
    }

    // -- control flow -----------------------------------------------------

    pub fn push_loop(&mut self, break_label: impl ToString, continue_label: impl ToString) {
        self.control_stack.push(ControlFrame::Loop(LoopContext {
            break_label: break_label.to_string(),
            continue_label: continue_label.to_string(),
        }));
    }

    pub fn pop_loop(&mut self) {
        debug_assert!(matches!(self.control_stack.last(), Some(ControlFrame::Loop(_))));
        self.control_stack.pop();
    }

    pub fn current_loop(&self) -> Option<&LoopContext> {
        self.control_stack.iter().rev().find_map(|frame| match frame {
            ControlFrame::Loop(l) => Some(l),
            ControlFrame::Switch(_) => None,
        })
    }

    /// `break` targets whichever of the innermost `loop`/`switch` was entered last, so a
    /// `break` inside a loop nested in a `switch` case reaches the loop's end label, not
    /// the switch's, and vice versa.
    pub fn break_target(&self) -> Option<String> {
        match self.control_stack.last()? {
            ControlFrame::Loop(l) => Some(l.break_label.clone()),
            ControlFrame::Switch(s) => Some(s.break_label()),
        }
    }

    /// Skips past any open `switch` frames to the nearest enclosing loop: there is no
    /// such thing as "continuing a switch".
    pub fn continue_target(&self) -> Option<String> {
        self.current_loop().map(|l| l.continue_label.clone())
    }

    pub fn enter_switch(&mut self, id: u64) {
        self.control_stack.push(ControlFrame::Switch(SwitchContext {
            id,
            default_seen: false,
            cases: Vec::new(),
        }));
    }

    pub fn leave_switch(&mut self) -> Option<SwitchContext> {
        debug_assert!(matches!(self.control_stack.last(), Some(ControlFrame::Switch(_))));
        match self.control_stack.pop() {
            Some(ControlFrame::Switch(s)) => Some(s),
            Some(other) => {
                self.control_stack.push(other);
                None
            }
            None => None,
        }
    }

    /// Finds the nearest enclosing `switch`, looking past any loop frames nested inside
    /// it (a `case`/`default` label may sit inside a loop body within the same `switch`,
    /// as in Duff's device).
    pub fn current_switch_mut(&mut self) -> Option<&mut SwitchContext> {
        self.control_stack.iter_mut().rev().find_map(|frame| match frame {
            ControlFrame::Switch(s) => Some(s),
            ControlFrame::Loop(_) => None,
        })
    }

    pub fn in_switch(&self) -> bool {
        self.control_stack.iter().any(|frame| matches!(frame, ControlFrame::Switch(_)))
    }
}

impl SwitchContext {
    /// `switch`'s break label is its own `SwitchN.End`, independent of any enclosing loop.
    pub fn end_label(&self) -> String {
        format!("Switch{}.End", self.id)
    }

    pub fn break_label(&self) -> String {
        self.end_label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn break_targets_a_switch_nested_inside_a_loop() {
        let mut state = CompilerState::new();
        state.push_loop("Loop.End", "Loop.Test");
        assert_eq!(state.break_target().as_deref(), Some("Loop.End"));

        state.enter_switch(0);
        assert_eq!(state.break_target().as_deref(), Some("Switch0.End"));

        state.leave_switch();
        assert_eq!(state.break_target().as_deref(), Some("Loop.End"));
    }

    #[test]
    fn break_targets_a_loop_nested_inside_a_switch_case() {
        let mut state = CompilerState::new();
        state.enter_switch(0);
        assert_eq!(state.break_target().as_deref(), Some("Switch0.End"));

        state.push_loop("For1.End", "For1.Inc");
        assert_eq!(state.break_target().as_deref(), Some("For1.End"));

        state.pop_loop();
        assert_eq!(state.break_target().as_deref(), Some("Switch0.End"));
    }

    #[test]
    fn continue_only_ever_targets_the_loop_stack_never_a_switch() {
        let mut state = CompilerState::new();
        state.push_loop("Loop.End", "Loop.Test");
        state.enter_switch(0);
        assert_eq!(state.continue_target().as_deref(), Some("Loop.Test"));
        state.leave_switch();
        state.pop_loop();
        assert_eq!(state.continue_target(), None);
    }

    #[test]
    fn current_switch_mut_sees_past_a_loop_nested_in_the_same_case() {
        let mut state = CompilerState::new();
        state.enter_switch(0);
        state.push_loop("While1.End", "While1.Test");
        assert_eq!(state.current_switch_mut().map(|s| s.id), Some(0));
        assert!(state.in_switch());
        state.pop_loop();
        state.leave_switch();
        assert!(!state.in_switch());
    }

    #[test]
    fn fresh_temp_registers_and_ids_are_unique_within_a_compilation() {
        let mut state = CompilerState::new();
        let a = state.fresh_temp();
        let b = state.fresh_temp();
        assert_ne!(a, b);
        assert_ne!(state.fresh_id(), state.fresh_id());
    }
}
