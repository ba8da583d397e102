//! Turns parsed specifiers/declarators into interned `TypeId`s.
//!
//! Grounded in `original_source/c_llvm/ast/declarations.py`'s `TypeSpecifierNode.get_type`
//! and the `DeclaratorNode` quartet (`IdentifierDeclaratorNode`/`PointerDeclaratorNode`/
//! `ArrayDeclaratorNode`/`FunctionDeclaratorNode`). The declarator tree built by
//! `crate::ast::declarator` already nests so that a declarator's own wrap (pointer) is
//! threaded into the *base type* before recursing, while a suffix's wrap (array/function)
//! wraps the *recursively resolved* inner type — see `resolve_declarator` below and
//! DESIGN.md for why those two need different evaluation order.

use std::collections::HashSet;

use crate::{
    ast::{
        declarator::{Declarator, ParamList},
        expression::Expression,
        ident::Ident,
        specifier::{DeclarationSpecifiers, StructSpecifier, TypeSpecifier},
    },
    codegen::expr::lower_expression,
    error::CompileError,
    span::Span,
    symtab::CompilerState,
    types::TypeId,
};

/// A function parameter after its declarator has been resolved against its specifiers.
#[derive(Debug, Clone)]
pub struct ResolvedParam {
    pub name: String,
    pub ty: TypeId,
    pub span: Span,
}

pub fn resolve_specifiers(specifiers: &DeclarationSpecifiers, state: &mut CompilerState) -> TypeId {
    match &specifiers.type_specifier {
        TypeSpecifier::Void => state.types.get("void").expect("void is a builtin"),
        TypeSpecifier::Char => state.types.get("char").expect("char is a builtin"),
        TypeSpecifier::Int => state.types.get("int").expect("int is a builtin"),
        TypeSpecifier::Float => state.types.get("float").expect("float is a builtin"),
        TypeSpecifier::Double => state.types.get("double").expect("double is a builtin"),
        TypeSpecifier::Bool => state.types.get("_Bool").expect("_Bool is a builtin"),
        TypeSpecifier::Struct(spec) => resolve_struct(spec, state),
        TypeSpecifier::Named(ident) => resolve_named(ident, state),
    }
}

fn resolve_named(ident: &Ident, state: &mut CompilerState) -> TypeId {
    match state.types.get(&ident.name) {
        Some(ty) => ty,
        None => {
            state.error(CompileError::UnknownType(
                format!("unknown type name '{}'", ident.name),
                ident.span.clone(),
            ));
            state.types.get("void").expect("void is a builtin")
        }
    }
}

pub fn resolve_struct(spec: &StructSpecifier, state: &mut CompilerState) -> TypeId {
    let handle = state.types.intern_struct(&spec.tag.name);

    let Some(members) = &spec.members else {
        return handle;
    };

    let mut resolved = Vec::with_capacity(members.len());
    for member in members {
        let base_ty = resolve_specifiers(&member.specifiers, state);
        let member_ty = resolve_declarator(base_ty, &member.declarator, state);
        let name = member.declarator.identifier().name.clone();
        resolved.push((name, member_ty));
    }

    if !state.types.complete_struct(&handle, resolved) {
        state.error(CompileError::Redefinition(
            format!("redefinition of 'struct {}'", spec.tag.name),
            spec.span.clone(),
        ));
        return handle;
    }

    let body = handle.struct_body().expect("just completed");
    state
        .global_declarations
        .push(format!("{} = type {body}", handle.llvm_type()));
    handle
}

/// Resolves `declarator` against `base_ty`, the type named by the declaration's
/// specifiers. `base_ty` is threaded downward as an accumulator: a `Pointer` node
/// updates the accumulator *before* recursing (a leading `*` binds to whatever the
/// rest of the declarator ultimately names), while `Array`/`Function` nodes wrap the
/// accumulator returned *by* the recursive call (a suffix binds to the identifier
/// before any enclosing pointer sees it). This is what gives `int *a[3]` "array of
/// pointer to int" rather than "pointer to array of int" without a dedicated stack.
pub fn resolve_declarator(base_ty: TypeId, declarator: &Declarator, state: &mut CompilerState) -> TypeId {
    match declarator {
        Declarator::Identifier(_) => base_ty,
        Declarator::Pointer(inner, _) => {
            let pointer_ty = state.types.intern_pointer(base_ty);
            resolve_declarator(pointer_ty, inner, state)
        }
        Declarator::Array(inner, length_expr, span) => {
            let element_ty = resolve_declarator(base_ty, inner, state);
            if element_ty.is_function() {
                state.error(CompileError::InvalidDeclarator(
                    "arrays of functions are not supported".to_string(),
                    span.clone(),
                ));
                return element_ty;
            }
            let Some(length_expr) = length_expr else {
                state.error(CompileError::IncompleteType(
                    "incomplete array types are not supported here".to_string(),
                    span.clone(),
                ));
                return state.types.intern_array(element_ty, 1);
            };
            let length = resolve_array_length(length_expr, span, state);
            state.types.intern_array(element_ty, length)
        }
        Declarator::Function(inner, params, span) => {
            let (resolved_params, variadic) = resolve_params(params, state);
            let ret_ty = resolve_declarator(base_ty, inner, state);
            if ret_ty.is_function() {
                state.error(CompileError::InvalidDeclarator(
                    "functions returning functions are not supported".to_string(),
                    span.clone(),
                ));
            } else if ret_ty.is_array() {
                state.error(CompileError::InvalidDeclarator(
                    "functions returning arrays are not supported".to_string(),
                    span.clone(),
                ));
            }
            let param_types = resolved_params.iter().map(|p| p.ty.clone()).collect();
            state.types.intern_function(ret_ty, param_types, variadic)
        }
    }
}

fn resolve_array_length(expr: &Expression, span: &Span, state: &mut CompilerState) -> u64 {
    let (_, result) = lower_expression(expr, state);
    if !result.is_constant {
        state.error(CompileError::NonConstantWhereRequired(
            "array length must be a constant expression".to_string(),
            span.clone(),
        ));
        return 1;
    }
    match result.operand().parse::<i64>() {
        Ok(value) if value > 0 => value as u64,
        _ => {
            state.error(CompileError::NonConstantWhereRequired(
                "array length must be a positive integer constant".to_string(),
                span.clone(),
            ));
            1
        }
    }
}

/// Resolves a parameter list: rejects `void`-typed parameters, promotes function-typed
/// parameters to a pointer (the same decay a plain reference to a function undergoes),
/// and flags duplicate parameter names, per `FunctionDeclaratorNode.get_type`/
/// `get_argument_names` in the original.
pub fn resolve_params(params: &ParamList, state: &mut CompilerState) -> (Vec<ResolvedParam>, bool) {
    let mut seen = HashSet::new();
    let mut resolved = Vec::with_capacity(params.params.len());

    for param in &params.params {
        let base_ty = resolve_specifiers(&param.specifiers, state);
        let mut ty = resolve_declarator(base_ty, &param.declarator, state);
        let ident = param.declarator.identifier();

        if ty.is_void() {
            state.error(CompileError::InvalidDeclarator(
                "parameter may not have type 'void'".to_string(),
                ident.span.clone(),
            ));
        }
        if ty.is_function() {
            ty = state.types.intern_pointer(ty);
        }
        if !seen.insert(ident.name.clone()) {
            state.error(CompileError::Redeclaration(
                format!("duplicate parameter name '{}'", ident.name),
                ident.span.clone(),
            ));
        }

        resolved.push(ResolvedParam {
            name: ident.name.clone(),
            ty,
            span: ident.span.clone(),
        });
    }

    (resolved, params.variadic)
}
