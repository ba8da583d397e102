//! Declaration and function-definition lowering, and the whole-program walk.
//!
//! Grounded in `original_source/c_llvm/ast/declarations.py`'s `DeclarationNode`/
//! `FunctionDefinitionNode.generate_code` (global vs. local storage choice, the
//! `declare`/`define` split, and the parameter-alloca prologue) and
//! `traversal_state.py`'s pending-scope mechanism.

use crate::{
    ast::{
        declaration::{Declaration, FunctionDefinition, InitDeclarator, Program, TopLevelItem},
        declarator::{Declarator, ParamList},
        specifier::StorageClass,
    },
    codegen::{
        expr::{cast, join_ir, lower_expression},
        stmt::{always_terminates, lower_statement},
    },
    error::{CompileError, CompileWarning},
    resolve::{resolve_declarator, resolve_params, resolve_specifiers},
    span::Span,
    symtab::{CompilerState, Variable},
    types::TypeId,
};

pub fn lower_program(program: &Program, state: &mut CompilerState) -> String {
    let mut code = String::new();
    for item in &program.items {
        let item_code = match item {
            TopLevelItem::FunctionDefinition(def) => lower_function_definition(def, state),
            TopLevelItem::Declaration(decl) => lower_global_declaration(decl, state),
        };
        if !item_code.is_empty() {
            code = join_ir(&code, &item_code);
            code.push('\n');
        }
    }
    code
}

// -- declarations (global and local) -------------------------------------------

pub fn lower_global_declaration(decl: &Declaration, state: &mut CompilerState) -> String {
    let base_ty = resolve_specifiers(&decl.specifiers, state);
    let mut code = String::new();
    for init in &decl.declarators {
        let item_code = lower_global_declarator(base_ty.clone(), init, decl.specifiers.storage, &decl.span, state);
        if !item_code.is_empty() {
            code = join_ir(&code, &item_code);
        }
    }
    code
}

pub fn lower_local_declaration(decl: &Declaration, state: &mut CompilerState) -> String {
    let base_ty = resolve_specifiers(&decl.specifiers, state);
    let mut code = String::new();
    for init in &decl.declarators {
        let item_code = lower_local_declarator(base_ty.clone(), init, state);
        if !item_code.is_empty() {
            code = join_ir(&code, &item_code);
        }
    }
    code
}

fn lower_global_declarator(
    base_ty: TypeId,
    init: &InitDeclarator,
    storage: Option<StorageClass>,
    span: &Span,
    state: &mut CompilerState,
) -> String {
    let ty = resolve_declarator(base_ty, &init.declarator, state);
    let ident = init.declarator.identifier();
    let name = ident.name.clone();

    if ty.is_function() {
        return lower_function_declaration(ty, &name, &ident.span, state);
    }

    let register = format!("@{name}");

    if let Some(existing) = state.scopes.lookup(&name).cloned() {
        if existing.ty != ty {
            state.error(CompileError::Redeclaration(
                format!("conflicting types for '{name}'"),
                ident.span.clone(),
            ));
            return String::new();
        }
        if existing.is_defined && init.initializer.is_some() {
            state.error(CompileError::Redefinition(
                format!("redefinition of '{name}'"),
                ident.span.clone(),
            ));
            return String::new();
        }
    } else {
        state.scopes.declare(Variable {
            name: name.clone(),
            ty: ty.clone(),
            register: register.clone(),
            is_global: true,
            is_defined: false,
        });
    }

    // `extern` without an initializer names a symbol defined elsewhere: no allocation here.
    if storage == Some(StorageClass::Extern) && init.initializer.is_none() {
        return format!("{register} = external global {}", ty.llvm_type());
    }

    let initializer = match &init.initializer {
        Some(expr) => {
            let (_, result) = lower_expression(expr, state);
            if !result.is_constant {
                state.error(CompileError::NonConstantWhereRequired(
                    "global initializer must be a constant expression".to_string(),
                    span.clone(),
                ));
                ty.default_value()
            } else {
                result.operand().to_string()
            }
        }
        None => ty.default_value(),
    };
    state.scopes.mark_defined(&name);

    format!("{register} = global {} {initializer}", ty.llvm_type())
}

fn lower_function_declaration(ty: TypeId, name: &str, span: &Span, state: &mut CompilerState) -> String {
    if let Some(existing) = state.scopes.lookup(name).cloned() {
        if existing.ty != ty {
            state.error(CompileError::Redeclaration(
                format!("conflicting types for '{name}'"),
                span.clone(),
            ));
        }
        // Already declared with a matching signature: nothing further to emit.
        return String::new();
    }

    state.scopes.declare(Variable {
        name: name.to_string(),
        ty: ty.clone(),
        register: format!("@{name}"),
        is_global: true,
        is_defined: false,
    });

    let (ret_ty, params, variadic) = ty.function_signature().expect("ty is a function type");
    let mut parts: Vec<String> = params.iter().map(|p| p.llvm_type()).collect();
    if variadic {
        parts.push("...".to_string());
    }
    format!("declare {} @{name}({})", ret_ty.llvm_type(), parts.join(", "))
}

fn lower_local_declarator(base_ty: TypeId, init: &InitDeclarator, state: &mut CompilerState) -> String {
    let ty = resolve_declarator(base_ty, &init.declarator, state);
    let ident = init.declarator.identifier();
    let name = ident.name.clone();

    if ty.is_function() {
        state.error(CompileError::InvalidDeclarator(
            format!("function '{name}' may not be declared at block scope"),
            ident.span.clone(),
        ));
        return String::new();
    }

    let register = state.fresh_var(&name);
    let ptr_ty = state.types.intern_pointer(ty.clone());

    if !state.scopes.declare(Variable {
        name: name.clone(),
        ty: ty.clone(),
        register: register.clone(),
        is_global: false,
        is_defined: true,
    }) {
        state.error(CompileError::Redeclaration(
            format!("redeclaration of '{name}'"),
            ident.span.clone(),
        ));
        return String::new();
    }

    let mut code = format!("{register} = alloca {}", ty.llvm_type());
    if let Some(expr) = &init.initializer {
        let (expr_code, value) = lower_expression(expr, state);
        let (cast_code, value) = cast(&value, &ty, state);
        code = join_ir(&code, &expr_code);
        code = join_ir(&code, &cast_code);
        code = join_ir(
            &code,
            &format!("store {} {}, {} {register}", ty.llvm_type(), value.operand(), ptr_ty.llvm_type()),
        );
    }
    code
}

// -- function definitions -------------------------------------------------------

/// Finds the `Function` declarator node that names a definition's parameters,
/// descending through any return-pointer wrapping (`int *f(int x) { ... }`).
fn find_param_list(declarator: &Declarator) -> Option<&ParamList> {
    match declarator {
        Declarator::Function(_, params, _) => Some(params),
        Declarator::Pointer(inner, _) => find_param_list(inner),
        _ => None,
    }
}

fn lower_function_definition(def: &FunctionDefinition, state: &mut CompilerState) -> String {
    let base_ty = resolve_specifiers(&def.specifiers, state);
    let fn_ty = resolve_declarator(base_ty, &def.declarator, state);
    let ident = def.declarator.identifier();
    let name = ident.name.clone();

    let Some((ret_ty, _, _)) = fn_ty.function_signature() else {
        state.error(CompileError::InvalidDeclarator(
            format!("'{name}' is defined as a function but its declarator is not one"),
            ident.span.clone(),
        ));
        return String::new();
    };

    let Some(param_list) = find_param_list(&def.declarator) else {
        state.error(CompileError::InvalidDeclarator(
            format!("could not resolve parameter list for '{name}'"),
            ident.span.clone(),
        ));
        return String::new();
    };
    let (resolved_params, variadic) = resolve_params(param_list, state);

    if let Some(existing) = state.scopes.lookup(&name).cloned() {
        if existing.ty != fn_ty {
            state.error(CompileError::Redeclaration(
                format!("conflicting types for '{name}'"),
                ident.span.clone(),
            ));
        }
        if existing.is_defined {
            state.error(CompileError::Redefinition(
                format!("redefinition of '{name}'"),
                ident.span.clone(),
            ));
            return String::new();
        }
        state.scopes.mark_defined(&name);
    } else {
        state.scopes.declare(Variable {
            name: name.clone(),
            ty: fn_ty.clone(),
            register: format!("@{name}"),
            is_global: true,
            is_defined: true,
        });
    }

    let mut sig_parts = Vec::with_capacity(resolved_params.len());
    let mut prologue = String::new();
    let mut entry_vars = Vec::with_capacity(resolved_params.len());
    for param in &resolved_params {
        let arg_register = format!("%{}", param.name);
        sig_parts.push(format!("{} {arg_register}", param.ty.llvm_type()));

        let local_register = state.fresh_var(&param.name);
        let ptr_ty = state.types.intern_pointer(param.ty.clone());
        prologue = join_ir(&prologue, &format!("{local_register} = alloca {}", param.ty.llvm_type()));
        prologue = join_ir(
            &prologue,
            &format!("store {} {arg_register}, {} {local_register}", param.ty.llvm_type(), ptr_ty.llvm_type()),
        );

        entry_vars.push(Variable {
            name: param.name.clone(),
            ty: param.ty.clone(),
            register: local_register,
            is_global: false,
            is_defined: true,
        });
    }
    if variadic {
        sig_parts.push("...".to_string());
    }

    let previous_return_type = state.return_type.replace(ret_ty.clone());
    state.scopes.set_pending_scope(entry_vars);
    state.scopes.enter_block();
    let body_code = lower_statement(&def.body, state);
    state.scopes.leave_block();
    state.return_type = previous_return_type;

    if !ret_ty.is_void() && !always_terminates(&def.body) {
        state.warn(CompileWarning::MissingReturn(
            format!("control reaches end of non-void function '{name}'"),
            def.span.clone(),
        ));
    }

    let mut body = join_ir(&prologue, &body_code);
    if !always_terminates(&def.body) {
        let terminator = if ret_ty.is_void() {
            "ret void".to_string()
        } else {
            format!("ret {} undef", ret_ty.llvm_type())
        };
        body = join_ir(&body, &terminator);
    }

    let indented: String = body.lines().map(|line| format!("  {line}\n")).collect();

    format!(
        "define {} @{name}({}) {{\n{indented}}}",
        ret_ty.llvm_type(),
        sig_parts.join(", "),
    )
}
