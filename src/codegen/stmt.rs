//! Statement lowering and control-flow structuring.
//!
//! Grounded in `original_source/c_llvm/ast/statements.py`'s statement hierarchy (filtered
//! down to `CompoundStatementNode` in the retrieved source, so the control-flow label
//! scheme and break/continue-stack discipline here follow `traversal_state.py`'s
//! `break_labels`/`continue_labels` plus SPEC_FULL.md §4.5/§9 rather than a line-for-line
//! port).

use crate::{
    ast::statement::{ForInit, Statement},
    codegen::{
        decl::lower_local_declaration,
        expr::{join_ir, lower_expression, to_bool},
    },
    error::CompileError,
    types::cast_value,
};

use super::expr::cast;
use crate::symtab::CompilerState;

/// Structural "does every path through this statement end in a terminator"
/// check, used both for the `MissingReturn` warning and to decide whether a
/// branch needs its own trailing `br` to the join label. Loops and `switch`
/// are treated conservatively as "may fall through" — none of them guarantee
/// their body executes, or (for `switch`) that every case terminates.
pub fn always_terminates(stmt: &Statement) -> bool {
    match stmt {
        Statement::Return(_, _) => true,
        Statement::Compound(stmts, _) => stmts.last().is_some_and(always_terminates),
        Statement::If(_, then_branch, Some(else_branch), _) => {
            always_terminates(then_branch) && always_terminates(else_branch)
        }
        _ => false,
    }
}

pub fn lower_statement(stmt: &Statement, state: &mut CompilerState) -> String {
    match stmt {
        Statement::Compound(stmts, _) => lower_compound(stmts, state),
        Statement::If(cond, then_branch, else_branch, _) => {
            lower_if(cond, then_branch, else_branch.as_deref(), state)
        }
        Statement::While(cond, body, _) => lower_while(cond, body, state),
        Statement::DoWhile(body, cond, _) => lower_do_while(body, cond, state),
        Statement::For(init, cond, step, body, _) => lower_for(init, cond.as_ref(), step.as_ref(), body, state),
        Statement::Switch(scrutinee, body, span) => lower_switch(scrutinee, body, span, state),
        Statement::Case(value, body, span) => lower_case(value, body.as_deref(), span, state),
        Statement::Default(body, _) => lower_default(body.as_deref(), state),
        Statement::Break(span) => lower_break(span, state),
        Statement::Continue(span) => lower_continue(span, state),
        Statement::Return(value, span) => lower_return(value.as_ref(), span, state),
        Statement::Declaration(decl) => lower_local_declaration(decl, state),
        Statement::Expression(expr, _) => match expr {
            Some(expr) => lower_expression(expr, state).0,
            None => String::new(),
        },
    }
}

fn lower_compound(stmts: &[Statement], state: &mut CompilerState) -> String {
    state.scopes.enter_block();
    let mut code = String::new();
    for stmt in stmts {
        let stmt_code = lower_statement(stmt, state);
        code = join_ir(&code, &stmt_code);
    }
    state.scopes.leave_block();
    code
}

fn lower_if(
    cond: &crate::ast::expression::Expression,
    then_branch: &Statement,
    else_branch: Option<&Statement>,
    state: &mut CompilerState,
) -> String {
    let (cond_code, cond_result) = lower_expression(cond, state);
    let (bool_code, bool_result) = to_bool(&cond_result, state);

    let id = state.fresh_id();
    let true_label = format!("If{id}.True");
    let false_label = format!("If{id}.False");
    let end_label = format!("If{id}.End");

    let mut code = join_ir(&join_ir(&cond_code, &bool_code), &format!(
        "br i1 {}, label %{true_label}, label %{false_label}",
        bool_result.operand()
    ));

    code = join_ir(&code, &format!("{true_label}:"));
    let then_code = lower_statement(then_branch, state);
    code = join_ir(&code, &then_code);
    if !always_terminates(then_branch) {
        code = join_ir(&code, &format!("br label %{end_label}"));
    }

    code = join_ir(&code, &format!("{false_label}:"));
    match else_branch {
        Some(else_branch) => {
            let else_code = lower_statement(else_branch, state);
            code = join_ir(&code, &else_code);
            if !always_terminates(else_branch) {
                code = join_ir(&code, &format!("br label %{end_label}"));
            }
        }
        None => code = join_ir(&code, &format!("br label %{end_label}")),
    }

    join_ir(&code, &format!("{end_label}:"))
}

fn lower_while(cond: &crate::ast::expression::Expression, body: &Statement, state: &mut CompilerState) -> String {
    let id = state.fresh_id();
    let test_label = format!("While{id}.Test");
    let body_label = format!("While{id}.Body");
    let end_label = format!("While{id}.End");

    let mut code = format!("br label %{test_label}");
    code = join_ir(&code, &format!("{test_label}:"));
    let (cond_code, cond_result) = lower_expression(cond, state);
    let (bool_code, bool_result) = to_bool(&cond_result, state);
    code = join_ir(&code, &join_ir(&cond_code, &bool_code));
    code = join_ir(
        &code,
        &format!("br i1 {}, label %{body_label}, label %{end_label}", bool_result.operand()),
    );

    code = join_ir(&code, &format!("{body_label}:"));
    state.push_loop(&end_label, &test_label);
    let body_code = lower_statement(body, state);
    state.pop_loop();
    code = join_ir(&code, &body_code);
    if !always_terminates(body) {
        code = join_ir(&code, &format!("br label %{test_label}"));
    }

    join_ir(&code, &format!("{end_label}:"))
}

fn lower_do_while(body: &Statement, cond: &crate::ast::expression::Expression, state: &mut CompilerState) -> String {
    let id = state.fresh_id();
    let body_label = format!("While{id}.Body");
    let test_label = format!("While{id}.Test");
    let end_label = format!("While{id}.End");

    let mut code = format!("br label %{body_label}");
    code = join_ir(&code, &format!("{body_label}:"));
    state.push_loop(&end_label, &test_label);
    let body_code = lower_statement(body, state);
    state.pop_loop();
    code = join_ir(&code, &body_code);
    if !always_terminates(body) {
        code = join_ir(&code, &format!("br label %{test_label}"));
    }

    code = join_ir(&code, &format!("{test_label}:"));
    let (cond_code, cond_result) = lower_expression(cond, state);
    let (bool_code, bool_result) = to_bool(&cond_result, state);
    code = join_ir(&code, &join_ir(&cond_code, &bool_code));
    code = join_ir(
        &code,
        &format!("br i1 {}, label %{body_label}, label %{end_label}", bool_result.operand()),
    );

    join_ir(&code, &format!("{end_label}:"))
}

/// `continue` targets `Inc` (not `Test`) so the increment still runs before the
/// condition is re-checked, same as it would for a hand-written `while` desugaring.
fn lower_for(
    init: &ForInit,
    cond: Option<&crate::ast::expression::Expression>,
    step: Option<&crate::ast::expression::Expression>,
    body: &Statement,
    state: &mut CompilerState,
) -> String {
    state.scopes.enter_block();

    let init_code = match init {
        ForInit::Decl(decl) => lower_local_declaration(decl, state),
        ForInit::Expr(Some(expr)) => lower_expression(expr, state).0,
        ForInit::Expr(None) => String::new(),
    };

    let id = state.fresh_id();
    let test_label = format!("For{id}.Test");
    let body_label = format!("For{id}.Body");
    let inc_label = format!("For{id}.Inc");
    let end_label = format!("For{id}.End");

    let mut code = join_ir(&init_code, &format!("br label %{test_label}"));
    code = join_ir(&code, &format!("{test_label}:"));
    match cond {
        Some(cond) => {
            let (cond_code, cond_result) = lower_expression(cond, state);
            let (bool_code, bool_result) = to_bool(&cond_result, state);
            code = join_ir(&code, &join_ir(&cond_code, &bool_code));
            code = join_ir(
                &code,
                &format!("br i1 {}, label %{body_label}, label %{end_label}", bool_result.operand()),
            );
        }
        // An omitted condition behaves as always-true.
        None => code = join_ir(&code, &format!("br label %{body_label}")),
    }

    code = join_ir(&code, &format!("{body_label}:"));
    state.push_loop(&end_label, &inc_label);
    let body_code = lower_statement(body, state);
    state.pop_loop();
    code = join_ir(&code, &body_code);
    if !always_terminates(body) {
        code = join_ir(&code, &format!("br label %{inc_label}"));
    }

    code = join_ir(&code, &format!("{inc_label}:"));
    if let Some(step) = step {
        let (step_code, _) = lower_expression(step, state);
        code = join_ir(&code, &step_code);
    }
    code = join_ir(&code, &format!("br label %{test_label}"));

    code = join_ir(&code, &format!("{end_label}:"));
    state.scopes.leave_block();
    code
}

fn lower_switch(
    scrutinee: &crate::ast::expression::Expression,
    body: &Statement,
    span: &crate::span::Span,
    state: &mut CompilerState,
) -> String {
    let (scrutinee_code, scrutinee_result) = lower_expression(scrutinee, state);
    if !scrutinee_result.ty.is_integer() {
        state.error(CompileError::TypeMismatch(
            "switch selector must be an integer".to_string(),
            span.clone(),
        ));
    }
    let int_ty = state.types.get("int").expect("int is a builtin");
    let (cast_code, selector) = cast(&scrutinee_result, &int_ty, state);

    let id = state.fresh_id();
    let end_label = format!("Switch{id}.End");

    state.enter_switch(id);
    let body_code = lower_statement(body, state);
    let switch_ctx = state.leave_switch().expect("just entered");

    let default_label = if switch_ctx.default_seen {
        format!("Switch{id}.Default")
    } else {
        end_label.clone()
    };

    let table = switch_ctx
        .cases
        .iter()
        .map(|(value, label)| format!("i64 {value}, label %{label}"))
        .collect::<Vec<_>>()
        .join(" ");

    let switch_ir = format!(
        "switch i64 {}, label %{default_label} [ {table} ]",
        selector.operand()
    );

    let code = join_ir(&join_ir(&scrutinee_code, &cast_code), &switch_ir);
    let code = join_ir(&code, &body_code);
    join_ir(&code, &format!("{end_label}:"))
}

fn lower_case(
    value: &crate::ast::expression::Expression,
    body: Option<&Statement>,
    span: &crate::span::Span,
    state: &mut CompilerState,
) -> String {
    if !state.in_switch() {
        state.error(CompileError::BadControlFlow("'case' outside a switch".to_string(), span.clone()));
        return body.map(|b| lower_statement(b, state)).unwrap_or_default();
    }

    let (_, result) = lower_expression(value, state);
    if !result.is_constant || !result.ty.is_integer() {
        state.error(CompileError::NonConstantWhereRequired(
            "'case' label must be a constant integer expression".to_string(),
            span.clone(),
        ));
        return body.map(|b| lower_statement(b, state)).unwrap_or_default();
    }

    let switch = state.current_switch_mut().expect("checked above");
    let id = switch.id;
    let case_value = result.operand().to_string();
    let label = format!("Switch{id}.Case{case_value}");
    switch.cases.push((case_value, label.clone()));

    let mut code = format!("{label}:");
    if let Some(body) = body {
        code = join_ir(&code, &lower_statement(body, state));
    }
    code
}

fn lower_default(body: Option<&Statement>, state: &mut CompilerState) -> String {
    let Some(switch) = state.current_switch_mut() else {
        return body.map(|b| lower_statement(b, state)).unwrap_or_default();
    };
    switch.default_seen = true;
    let label = format!("Switch{}.Default", switch.id);

    let mut code = format!("{label}:");
    if let Some(body) = body {
        code = join_ir(&code, &lower_statement(body, state));
    }
    code
}

fn lower_break(span: &crate::span::Span, state: &mut CompilerState) -> String {
    match state.break_target() {
        Some(label) => format!("br label %{label}"),
        None => {
            state.error(CompileError::BadControlFlow(
                "'break' outside a loop or switch".to_string(),
                span.clone(),
            ));
            String::new()
        }
    }
}

fn lower_continue(span: &crate::span::Span, state: &mut CompilerState) -> String {
    match state.continue_target() {
        Some(label) => format!("br label %{label}"),
        None => {
            state.error(CompileError::BadControlFlow("'continue' outside a loop".to_string(), span.clone()));
            String::new()
        }
    }
}

fn lower_return(
    value: Option<&crate::ast::expression::Expression>,
    span: &crate::span::Span,
    state: &mut CompilerState,
) -> String {
    let ret_ty = state
        .return_type
        .clone()
        .expect("return statement only lowered inside a function body");

    match (value, ret_ty.is_void()) {
        (Some(_), true) => {
            state.error(CompileError::VoidReturnMismatch(
                "void function should not return a value".to_string(),
                span.clone(),
            ));
            "ret void".to_string()
        }
        (None, true) => "ret void".to_string(),
        (None, false) => {
            state.error(CompileError::VoidReturnMismatch(
                "non-void function should return a value".to_string(),
                span.clone(),
            ));
            format!("ret {} {}", ret_ty.llvm_type(), ret_ty.default_value())
        }
        (Some(expr), false) => {
            let (expr_code, result) = lower_expression(expr, state);
            let (cast_code, result) = cast_value(&result, &ret_ty, &mut || state.fresh_temp());
            let code = join_ir(&expr_code, &cast_code);
            join_ir(&code, &format!("ret {} {}", ret_ty.llvm_type(), result.operand()))
        }
    }
}
