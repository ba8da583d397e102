//! Expression lowering. Grounded in `original_source/c_llvm/ast/expressions.py`'s node
//! hierarchy — each `lower_*` function here corresponds to one `*ExpressionNode.generate_code`
//! there, reworked so the result travels back as an explicit `ExprResult` return value
//! (see `crate::value` and SPEC_FULL.md Design Notes) instead of through a state-held
//! "last result" slot.

use crate::{
    ast::{
        expression::{AssignOp, BinOp, Expression, LogicalOp, TypeName, UnaryOp},
        ident::Ident,
    },
    error::CompileError,
    span::Span,
    symtab::CompilerState,
    types::{cast_to_bool, cast_value, TypeId},
    value::ExprResult,
};

pub(crate) fn join_ir(a: &str, b: &str) -> String {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => String::new(),
        (true, false) => b.to_string(),
        (false, true) => a.to_string(),
        (false, false) => format!("{a}\n{b}"),
    }
}

pub(crate) fn cast(result: &ExprResult, target: &TypeId, state: &mut CompilerState) -> (String, ExprResult) {
    cast_value(result, target, &mut || state.fresh_temp())
}

pub(crate) fn to_bool(result: &ExprResult, state: &mut CompilerState) -> (String, ExprResult) {
    let bool_ty = state.types.get("_Bool").expect("_Bool is a builtin");
    cast_to_bool(result, &bool_ty, &mut || state.fresh_temp())
}

fn unify(left: &ExprResult, right: &ExprResult, state: &mut CompilerState) -> (String, ExprResult, ExprResult) {
    let common = state.types.common_type(&left.ty, &right.ty);
    let mut ir = String::new();
    let left_casted = if left.ty != common {
        let (code, casted) = cast(left, &common, state);
        ir = join_ir(&ir, &code);
        casted
    } else {
        left.clone()
    };
    let right_casted = if right.ty != common {
        let (code, casted) = cast(right, &common, state);
        ir = join_ir(&ir, &code);
        casted
    } else {
        right.clone()
    };
    (ir, left_casted, right_casted)
}

fn format_float_literal(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

pub fn lower_expression(expr: &Expression, state: &mut CompilerState) -> (String, ExprResult) {
    match expr {
        Expression::Comma(parts, _) => lower_comma(parts, state),
        Expression::Assign(op, lhs, rhs, span) => lower_assign(*op, lhs, rhs, span, state),
        Expression::Logical(op, left, right, _) => lower_logical(*op, left, right, state),
        Expression::Binary(op, left, right, span) => lower_binary(*op, left, right, span, state),
        Expression::Cast(type_name, operand, _) => lower_cast(type_name, operand, state),
        Expression::Unary(op, operand, span) => lower_unary(*op, operand, span, state),
        Expression::Call(callee, args, span) => lower_call(callee, args, span, state),
        Expression::Index(base, index, span) => lower_index(base, index, span, state),
        Expression::Member(base, member, arrow, span) => lower_member(base, member, *arrow, span, state),
        Expression::Ident(ident) => lower_ident(ident, state),
        Expression::IntLiteral(text, _) => lower_int_literal(text, state),
        Expression::FloatLiteral(text, _) => lower_float_literal(text, state),
        Expression::CharLiteral(text, _) => lower_char_literal(text, state),
        Expression::StringLiteral(text, _) => lower_string_literal(text, state),
    }
}

// -- literals -----------------------------------------------------------------

fn lower_int_literal(text: &str, state: &mut CompilerState) -> (String, ExprResult) {
    let digits: String = text.chars().take_while(|c| c.is_ascii_digit()).collect();
    let value: i64 = digits.parse().unwrap_or(0);
    let int_ty = state.types.get("int").expect("int is a builtin");
    (String::new(), ExprResult::rvalue(value.to_string(), int_ty, true))
}

fn lower_float_literal(text: &str, state: &mut CompilerState) -> (String, ExprResult) {
    let trimmed = text.trim_end_matches(['f', 'F']);
    let value: f64 = trimmed.parse().unwrap_or(0.0);
    let float_ty = state.types.get("float").expect("float is a builtin");
    (String::new(), ExprResult::rvalue(format_float_literal(value), float_ty, true))
}

fn escape_char(c: char) -> u8 {
    match c {
        '\'' => b'\'',
        '"' => b'"',
        '\\' => b'\\',
        '?' => b'?',
        'a' => 0x07,
        'b' => 0x08,
        'f' => 0x0C,
        'n' => b'\n',
        'r' => b'\r',
        't' => b'\t',
        'v' => 0x0B,
        other => other as u8,
    }
}

fn decode_char_body(chars: &mut std::iter::Peekable<std::str::Chars>) -> u8 {
    let first = chars.next().expect("char literal body has at least one char");
    if first != '\\' {
        return first as u8;
    }
    let escape = chars.next().expect("escape sequence has a following char");
    if escape == 'x' {
        let mut hex = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_ascii_hexdigit() {
                hex.push(c);
                chars.next();
            } else {
                break;
            }
        }
        u8::from_str_radix(&hex, 16).unwrap_or(0)
    } else if escape.is_ascii_digit() {
        let mut octal = String::from(escape);
        while let Some(&c) = chars.peek() {
            if ('0'..='7').contains(&c) {
                octal.push(c);
                chars.next();
            } else {
                break;
            }
        }
        u8::from_str_radix(&octal, 8).unwrap_or(0)
    } else {
        escape_char(escape)
    }
}

fn lower_char_literal(text: &str, state: &mut CompilerState) -> (String, ExprResult) {
    let body = &text[1..text.len() - 1];
    let mut chars = body.chars().peekable();
    let value = decode_char_body(&mut chars) as i64;
    let char_ty = state.types.get("char").expect("char is a builtin");
    (String::new(), ExprResult::rvalue(value.to_string(), char_ty, true))
}

fn lower_string_literal(text: &str, state: &mut CompilerState) -> (String, ExprResult) {
    let body = &text[1..text.len() - 1];
    let mut chars = body.chars().peekable();
    let mut bytes = Vec::new();
    while chars.peek().is_some() {
        bytes.push(decode_char_body(&mut chars));
    }
    bytes.push(0);

    let length = bytes.len() as u64;
    let content: String = bytes.iter().map(|b| format!("\\{b:02X}")).collect();

    let char_ty = state.types.get("char").expect("char is a builtin");
    let array_ty = state.types.intern_array(char_ty.clone(), length);
    let array_ptr_ty = state.types.intern_pointer(array_ty.clone());

    let global_name = format!("@string.{}", state.fresh_id());
    state.global_declarations.push(format!(
        "{global_name} = global {} c\"{content}\"",
        array_ty.llvm_type()
    ));

    decay_array_from(&array_ty, &array_ptr_ty, &global_name, state)
}

// -- variable reference ---------------------------------------------------------

fn decay_array(array_ty: &TypeId, pointer_operand: &str, state: &mut CompilerState) -> (String, ExprResult) {
    let array_ptr_ty = state.types.intern_pointer(array_ty.clone());
    decay_array_from(array_ty, &array_ptr_ty, pointer_operand, state)
}

fn decay_array_from(
    array_ty: &TypeId,
    array_ptr_ty: &TypeId,
    pointer_operand: &str,
    state: &mut CompilerState,
) -> (String, ExprResult) {
    let target = array_ty.target_type().expect("decay_array called on a non-array");
    let elem_ptr_ty = state.types.intern_pointer(target);
    let register = state.fresh_temp();
    let ir = format!(
        "{register} = getelementptr {}, {} {pointer_operand}, i64 0, i64 0",
        array_ty.llvm_type(),
        array_ptr_ty.llvm_type()
    );
    (ir, ExprResult::rvalue(register, elem_ptr_ty, false))
}

fn lower_ident(ident: &Ident, state: &mut CompilerState) -> (String, ExprResult) {
    let var = state.scopes.lookup(&ident.name).cloned();
    let Some(var) = var else {
        state.unknown_identifier(&ident.name, &ident.span);
        let int_ty = state.types.get("int").expect("int is a builtin");
        return (String::new(), ExprResult::rvalue("0", int_ty, true));
    };

    if var.ty.is_function() {
        return (String::new(), ExprResult::function(var.ty.clone(), var.register.clone()));
    }
    if var.ty.is_array() {
        return decay_array(&var.ty, &var.register, state);
    }

    let register = state.fresh_temp();
    let ptr_ty = state.types.intern_pointer(var.ty.clone());
    let ir = format!("{register} = load {}, {} {}", var.ty.llvm_type(), ptr_ty.llvm_type(), var.register);
    (ir, ExprResult::lvalue(register, var.ty.clone(), var.register.clone()))
}

// -- unary --------------------------------------------------------------------

fn lower_unary(op: UnaryOp, operand: &Expression, span: &Span, state: &mut CompilerState) -> (String, ExprResult) {
    let (code, value) = lower_expression(operand, state);
    match op {
        UnaryOp::Plus => {
            if !value.ty.is_arithmetic() {
                state.error(CompileError::TypeMismatch(
                    "operand of unary '+' must be arithmetic".to_string(),
                    span.clone(),
                ));
            }
            (code, value)
        }
        UnaryOp::Neg => {
            if !value.ty.is_arithmetic() {
                state.error(CompileError::TypeMismatch(
                    "operand of unary '-' must be arithmetic".to_string(),
                    span.clone(),
                ));
                return (code, value);
            }
            if value.is_constant {
                let folded = if value.ty.is_float() {
                    let v: f64 = value.operand().parse().unwrap_or(0.0);
                    ExprResult::rvalue(format_float_literal(-v), value.ty.clone(), true)
                } else {
                    let v: i64 = value.operand().parse().unwrap_or(0);
                    ExprResult::rvalue((-v).to_string(), value.ty.clone(), true)
                };
                return (code, folded);
            }
            let (op_name, neg_one) = if value.ty.is_float() { ("fmul", "-1.0") } else { ("mul", "-1") };
            let register = state.fresh_temp();
            let ir = format!("{register} = {op_name} {} {}, {neg_one}", value.ty.llvm_type(), value.operand());
            (join_ir(&code, &ir), ExprResult::rvalue(register, value.ty.clone(), false))
        }
        UnaryOp::BitNot => {
            if !value.ty.is_integer() {
                state.error(CompileError::TypeMismatch(
                    "operand of '~' must be integer".to_string(),
                    span.clone(),
                ));
                return (code, value);
            }
            if value.is_constant {
                let v: i64 = value.operand().parse().unwrap_or(0);
                return (code, ExprResult::rvalue((!v).to_string(), value.ty.clone(), true));
            }
            let register = state.fresh_temp();
            let ir = format!("{register} = xor {} {}, -1", value.ty.llvm_type(), value.operand());
            (join_ir(&code, &ir), ExprResult::rvalue(register, value.ty.clone(), false))
        }
        UnaryOp::Not => {
            if !value.ty.is_scalar() {
                state.error(CompileError::TypeMismatch(
                    "operand of '!' must be scalar".to_string(),
                    span.clone(),
                ));
                return (code, value);
            }
            let int_ty = state.types.get("int").expect("int is a builtin");
            if value.is_constant {
                let is_zero = value.operand() == "0" || value.operand() == "0.0";
                return (code, ExprResult::rvalue(if is_zero { "1" } else { "0" }, int_ty, true));
            }
            let (bool_code, bool_value) = to_bool(&value, state);
            let register = state.fresh_temp();
            let zext_ir = format!("{register} = zext i1 {} to {}", bool_value.operand(), int_ty.llvm_type());
            (join_ir(&code, &join_ir(&bool_code, &zext_ir)), ExprResult::rvalue(register, int_ty, false))
        }
        UnaryOp::Addr => match &value.lvalue_pointer {
            Some(pointer) => {
                let ptr_ty = state.types.intern_pointer(value.ty.clone());
                (code, ExprResult::rvalue(pointer.clone(), ptr_ty, false))
            }
            None => {
                state.error(CompileError::LvalueRequired(
                    "address of a non-lvalue requested".to_string(),
                    span.clone(),
                ));
                (code, value)
            }
        },
        UnaryOp::Deref => {
            if !value.ty.is_pointer() {
                state.error(CompileError::TypeMismatch(
                    "dereferencing a non-pointer value".to_string(),
                    span.clone(),
                ));
                return (code, value);
            }
            let target = value.ty.target_type().expect("pointer type has a target");
            if target.is_array() {
                let (decay_ir, result) = decay_array(&target, value.operand(), state);
                return (join_ir(&code, &decay_ir), result);
            }
            let register = state.fresh_temp();
            let ir = format!("{register} = load {}, {} {}", target.llvm_type(), value.ty.llvm_type(), value.operand());
            (
                join_ir(&code, &ir),
                ExprResult::lvalue(register, target, value.operand().to_string()),
            )
        }
    }
}

// -- binary arithmetic / comparisons -------------------------------------------

fn op_symbol(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Rem => "%",
        BinOp::Shl => "<<",
        BinOp::Shr => ">>",
        BinOp::BitAnd => "&",
        BinOp::BitOr => "|",
        BinOp::BitXor => "^",
        BinOp::Lt => "<",
        BinOp::Gt => ">",
        BinOp::Le => "<=",
        BinOp::Ge => ">=",
        BinOp::Eq => "==",
        BinOp::Ne => "!=",
    }
}

fn arithmetic_opcode(op: BinOp, is_float: bool) -> &'static str {
    match (op, is_float) {
        (BinOp::Add, true) => "fadd",
        (BinOp::Add, false) => "add",
        (BinOp::Sub, true) => "fsub",
        (BinOp::Sub, false) => "sub",
        (BinOp::Mul, true) => "fmul",
        (BinOp::Mul, false) => "mul",
        (BinOp::Div, true) => "fdiv",
        (BinOp::Div, false) => "sdiv",
        (BinOp::Rem, _) => "srem",
        (BinOp::Shl, _) => "shl",
        (BinOp::Shr, _) => "lshr",
        (BinOp::BitAnd, _) => "and",
        (BinOp::BitOr, _) => "or",
        (BinOp::BitXor, _) => "xor",
        _ => unreachable!("not an arithmetic opcode: {op:?}"),
    }
}

fn compare_predicates(op: BinOp) -> (&'static str, &'static str) {
    match op {
        BinOp::Lt => ("slt", "olt"),
        BinOp::Gt => ("sgt", "ogt"),
        BinOp::Le => ("sle", "ole"),
        BinOp::Ge => ("sge", "oge"),
        BinOp::Eq => ("eq", "oeq"),
        BinOp::Ne => ("ne", "one"),
        _ => unreachable!("not a comparison operator: {op:?}"),
    }
}

fn compare_constants(op: BinOp, l: f64, r: f64) -> bool {
    match op {
        BinOp::Lt => l < r,
        BinOp::Gt => l > r,
        BinOp::Le => l <= r,
        BinOp::Ge => l >= r,
        BinOp::Eq => l == r,
        BinOp::Ne => l != r,
        _ => unreachable!("not a comparison operator: {op:?}"),
    }
}

fn fold_constant_arithmetic(op: BinOp, left: &ExprResult, right: &ExprResult, state: &mut CompilerState) -> Option<ExprResult> {
    let common = state.types.common_type(&left.ty, &right.ty);
    if common.is_float() {
        let l: f64 = left.operand().parse().ok()?;
        let r: f64 = right.operand().parse().ok()?;
        let value = match op {
            BinOp::Add => l + r,
            BinOp::Sub => l - r,
            BinOp::Mul => l * r,
            BinOp::Div => l / r,
            _ => return None,
        };
        Some(ExprResult::rvalue(format_float_literal(value), common, true))
    } else {
        let l: i64 = left.operand().parse().ok()?;
        let r: i64 = right.operand().parse().ok()?;
        let value = match op {
            BinOp::Add => l.wrapping_add(r),
            BinOp::Sub => l.wrapping_sub(r),
            BinOp::Mul => l.wrapping_mul(r),
            BinOp::Div if r != 0 => l / r,
            BinOp::Rem if r != 0 => l % r,
            BinOp::Shl => l.wrapping_shl(r as u32),
            BinOp::Shr => l.wrapping_shr(r as u32),
            BinOp::BitAnd => l & r,
            BinOp::BitOr => l | r,
            BinOp::BitXor => l ^ r,
            _ => return None,
        };
        Some(ExprResult::rvalue(value.to_string(), common, true))
    }
}

fn lower_binary(op: BinOp, left: &Expression, right: &Expression, span: &Span, state: &mut CompilerState) -> (String, ExprResult) {
    let (left_code, left_result) = lower_expression(left, state);
    let (right_code, right_result) = lower_expression(right, state);
    let code = join_ir(&left_code, &right_code);

    match op {
        BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge | BinOp::Eq | BinOp::Ne => {
            lower_compare(op, left_result, right_result, span, state, code)
        }
        _ => lower_arithmetic(op, left_result, right_result, span, state, code),
    }
}

fn lower_compare(
    op: BinOp,
    left: ExprResult,
    right: ExprResult,
    span: &Span,
    state: &mut CompilerState,
    code: String,
) -> (String, ExprResult) {
    let int_ty = state.types.get("int").expect("int is a builtin");
    if left.is_constant && right.is_constant {
        if let (Ok(l), Ok(r)) = (left.operand().parse::<f64>(), right.operand().parse::<f64>()) {
            let result = compare_constants(op, l, r);
            return (code, ExprResult::rvalue(if result { "1" } else { "0" }, int_ty, true));
        }
    }
    if !left.ty.is_scalar() || !right.ty.is_scalar() {
        state.error(CompileError::TypeMismatch(
            format!("'{}' operands must be scalar", op_symbol(op)),
            span.clone(),
        ));
        return (code, ExprResult::rvalue("0", int_ty, true));
    }

    let (cast_code, left, right) = unify(&left, &right, state);
    let code = join_ir(&code, &cast_code);

    let (signed_pred, ordered_pred) = compare_predicates(op);
    let cmp_register = state.fresh_temp();
    let cmp_ir = if left.ty.is_float() {
        format!("{cmp_register} = fcmp {ordered_pred} {} {}, {}", left.ty.llvm_type(), left.operand(), right.operand())
    } else {
        format!("{cmp_register} = icmp {signed_pred} {} {}, {}", left.ty.llvm_type(), left.operand(), right.operand())
    };

    let result_register = state.fresh_temp();
    let zext_ir = format!("{result_register} = zext i1 {cmp_register} to {}", int_ty.llvm_type());

    (join_ir(&code, &join_ir(&cmp_ir, &zext_ir)), ExprResult::rvalue(result_register, int_ty, false))
}

fn lower_arithmetic(
    op: BinOp,
    left: ExprResult,
    right: ExprResult,
    span: &Span,
    state: &mut CompilerState,
    code: String,
) -> (String, ExprResult) {
    if matches!(op, BinOp::Add | BinOp::Sub) && (left.ty.is_pointer() || right.ty.is_pointer()) {
        return lower_pointer_arithmetic(op, left, right, span, state, code);
    }

    if left.is_constant && right.is_constant {
        if let Some(folded) = fold_constant_arithmetic(op, &left, &right, state) {
            return (code, folded);
        }
    }

    let requires_integer = matches!(
        op,
        BinOp::Rem | BinOp::Shl | BinOp::Shr | BinOp::BitAnd | BinOp::BitOr | BinOp::BitXor
    );
    if requires_integer {
        if !left.ty.is_integer() || !right.ty.is_integer() {
            state.error(CompileError::TypeMismatch(
                format!("'{}' operands must be integer", op_symbol(op)),
                span.clone(),
            ));
            return (code, left);
        }
    } else if !left.ty.is_arithmetic() || !right.ty.is_arithmetic() {
        state.error(CompileError::TypeMismatch(
            format!("'{}' operands must be arithmetic", op_symbol(op)),
            span.clone(),
        ));
        return (code, left);
    }

    let shift = matches!(op, BinOp::Shl | BinOp::Shr);
    let (cast_code, left, right) = if shift { (String::new(), left, right) } else { unify(&left, &right, state) };
    let code = join_ir(&code, &cast_code);

    let opcode = arithmetic_opcode(op, left.ty.is_float());
    let register = state.fresh_temp();
    let ir = format!("{register} = {opcode} {} {}, {}", left.ty.llvm_type(), left.operand(), right.operand());
    (join_ir(&code, &ir), ExprResult::rvalue(register, left.ty.clone(), false))
}

fn lower_pointer_arithmetic(
    op: BinOp,
    left: ExprResult,
    right: ExprResult,
    span: &Span,
    state: &mut CompilerState,
    code: String,
) -> (String, ExprResult) {
    match op {
        BinOp::Add => {
            let (pointer, offset) = if left.ty.is_pointer() { (left, right) } else { (right, left) };
            if !offset.ty.is_integer() {
                state.error(CompileError::TypeMismatch(
                    "pointer addition requires an integer operand".to_string(),
                    span.clone(),
                ));
                return (code, pointer);
            }
            let target = pointer.ty.target_type().expect("pointer type has a target");
            let register = state.fresh_temp();
            let ir = format!(
                "{register} = getelementptr {}, {} {}, {} {}",
                target.llvm_type(),
                pointer.ty.llvm_type(),
                pointer.operand(),
                offset.ty.llvm_type(),
                offset.operand(),
            );
            (join_ir(&code, &ir), ExprResult::rvalue(register, pointer.ty.clone(), false))
        }
        BinOp::Sub if right.ty.is_pointer() => {
            if left.ty != right.ty {
                state.error(CompileError::TypeMismatch(
                    "subtracting pointers to different types".to_string(),
                    span.clone(),
                ));
                return (code, left);
            }
            let target = left.ty.target_type().expect("pointer type has a target");
            let elem_size = target.size_of().max(1);
            let int_ty = state.types.get("int").expect("int is a builtin");
            let left_int = state.fresh_temp();
            let right_int = state.fresh_temp();
            let diff = state.fresh_temp();
            let register = state.fresh_temp();
            let ir = format!(
                "{left_int} = ptrtoint {} {} to {itype}\n\
                 {right_int} = ptrtoint {} {} to {itype}\n\
                 {diff} = sub {itype} {left_int}, {right_int}\n\
                 {register} = sdiv {itype} {diff}, {elem_size}",
                left.ty.llvm_type(),
                left.operand(),
                right.ty.llvm_type(),
                right.operand(),
                itype = int_ty.llvm_type(),
            );
            (join_ir(&code, &ir), ExprResult::rvalue(register, int_ty, false))
        }
        BinOp::Sub if left.ty.is_pointer() && right.ty.is_integer() => {
            let target = left.ty.target_type().expect("pointer type has a target");
            let negated = state.fresh_temp();
            let register = state.fresh_temp();
            let ir = format!(
                "{negated} = sub {} 0, {}\n{register} = getelementptr {}, {} {}, {} {negated}",
                right.ty.llvm_type(),
                right.operand(),
                target.llvm_type(),
                left.ty.llvm_type(),
                left.operand(),
                right.ty.llvm_type(),
            );
            (join_ir(&code, &ir), ExprResult::rvalue(register, left.ty.clone(), false))
        }
        _ => {
            state.error(CompileError::TypeMismatch(
                "invalid operands to pointer arithmetic".to_string(),
                span.clone(),
            ));
            (code, left)
        }
    }
}

// -- logical &&/|| --------------------------------------------------------------

fn lower_logical(op: LogicalOp, left: &Expression, right: &Expression, state: &mut CompilerState) -> (String, ExprResult) {
    let (left_code, left_result) = lower_expression(left, state);
    let (left_bool_ir, left_bool) = to_bool(&left_result, state);

    let right_label = state.fresh_label();
    let is_true_label = state.fresh_label();
    let is_false_label = state.fresh_label();
    let end_label = state.fresh_label();

    let (left_true, left_false, right_true, right_false) = match op {
        LogicalOp::Or => (&is_true_label, &right_label, &is_true_label, &is_false_label),
        LogicalOp::And => (&right_label, &is_false_label, &is_true_label, &is_false_label),
    };

    let (right_code, right_result) = lower_expression(right, state);
    let (right_bool_ir, right_bool) = to_bool(&right_result, state);

    let int_ty = state.types.get("int").expect("int is a builtin");
    let result_register = state.fresh_temp();

    let ir = format!(
        "{left_code}\n{left_bool_ir}\n\
         br i1 {}, label %{left_true}, label %{left_false}\n\
         {right_label}:\n{right_code}\n{right_bool_ir}\n\
         br i1 {}, label %{right_true}, label %{right_false}\n\
         {is_true_label}:\nbr label %{end_label}\n\
         {is_false_label}:\nbr label %{end_label}\n\
         {end_label}:\n\
         {result_register} = phi {} [0, %{is_false_label}], [1, %{is_true_label}]",
        left_bool.operand(),
        right_bool.operand(),
        int_ty.llvm_type(),
    );

    (ir, ExprResult::rvalue(result_register, int_ty, false))
}

// -- comma, cast ----------------------------------------------------------------

fn lower_comma(parts: &[Expression], state: &mut CompilerState) -> (String, ExprResult) {
    let mut code = String::new();
    let mut last = None;
    for part in parts {
        let (part_code, result) = lower_expression(part, state);
        code = join_ir(&code, &part_code);
        last = Some(result);
    }
    (code, last.expect("comma expression has at least one operand"))
}

fn resolve_type_name(type_name: &TypeName, state: &mut CompilerState) -> TypeId {
    let mut ty = crate::resolve::resolve_specifiers(&type_name.specifiers, state);
    for _ in 0..type_name.pointer_depth {
        ty = state.types.intern_pointer(ty);
    }
    ty
}

fn lower_cast(type_name: &TypeName, operand: &Expression, state: &mut CompilerState) -> (String, ExprResult) {
    let target = resolve_type_name(type_name, state);
    let (operand_code, value) = lower_expression(operand, state);
    let (cast_code, result) = cast(&value, &target, state);
    (join_ir(&operand_code, &cast_code), result)
}

// -- postfix: call, index, member -----------------------------------------------

fn lower_call(callee: &Expression, args: &[Expression], span: &Span, state: &mut CompilerState) -> (String, ExprResult) {
    let (callee_code, callee_result) = lower_expression(callee, state);
    if !callee_result.ty.is_function() {
        state.error(CompileError::TypeMismatch(
            "called object is not a function".to_string(),
            span.clone(),
        ));
        return (callee_code, callee_result);
    }
    let (ret_ty, param_types, variadic) = callee_result.ty.function_signature().expect("function type");
    let param_types = param_types.to_vec();

    let mut arg_code = String::new();
    let mut arg_results = Vec::with_capacity(args.len());
    for arg in args {
        let (code, result) = lower_expression(arg, state);
        arg_code = join_ir(&arg_code, &code);
        arg_results.push(result);
    }

    if arg_results.len() < param_types.len() {
        state.error(CompileError::ArityMismatch("not enough arguments given".to_string(), span.clone()));
        return (join_ir(&callee_code, &arg_code), ExprResult::rvalue("0", ret_ty, true));
    }
    if arg_results.len() > param_types.len() && !variadic {
        state.error(CompileError::ArityMismatch("too many arguments given".to_string(), span.clone()));
        return (join_ir(&callee_code, &arg_code), ExprResult::rvalue("0", ret_ty, true));
    }

    let mut cast_code = String::new();
    let mut final_args = Vec::with_capacity(arg_results.len());
    for (i, result) in arg_results.into_iter().enumerate() {
        match param_types.get(i) {
            Some(expected) => {
                let (code, casted) = cast(&result, expected, state);
                cast_code = join_ir(&cast_code, &code);
                final_args.push(casted);
            }
            None => final_args.push(result),
        }
    }

    let args_str = final_args
        .iter()
        .map(|r| format!("{} {}", r.ty.llvm_type(), r.operand()))
        .collect::<Vec<_>>()
        .join(", ");
    let callee_operand = callee_result.lvalue_pointer.clone().unwrap_or_default();
    let code = join_ir(&join_ir(&callee_code, &arg_code), &cast_code);

    if ret_ty.is_void() {
        let call_ir = format!("call {} {callee_operand}({args_str})", ret_ty.llvm_type());
        (
            join_ir(&code, &call_ir),
            ExprResult {
                value: None,
                ty: ret_ty,
                is_constant: false,
                lvalue_pointer: None,
            },
        )
    } else {
        let register = state.fresh_temp();
        let call_ir = format!("{register} = call {} {callee_operand}({args_str})", ret_ty.llvm_type());
        (join_ir(&code, &call_ir), ExprResult::rvalue(register, ret_ty, false))
    }
}

fn lower_index(base: &Expression, index: &Expression, span: &Span, state: &mut CompilerState) -> (String, ExprResult) {
    let (base_code, base_result) = lower_expression(base, state);
    let (index_code, index_result) = lower_expression(index, state);
    let code = join_ir(&base_code, &index_code);

    if !base_result.ty.is_pointer() {
        state.error(CompileError::TypeMismatch(
            "subscripted value is not a pointer".to_string(),
            span.clone(),
        ));
        return (code, base_result);
    }
    if !index_result.ty.is_integer() {
        state.error(CompileError::TypeMismatch(
            "array subscript is not an integer".to_string(),
            span.clone(),
        ));
        return (code, base_result);
    }

    let target = base_result.ty.target_type().expect("pointer has a target");
    let register = state.fresh_temp();
    let gep_ir = format!(
        "{register} = getelementptr {}, {} {}, {} {}",
        target.llvm_type(),
        base_result.ty.llvm_type(),
        base_result.operand(),
        index_result.ty.llvm_type(),
        index_result.operand(),
    );
    let code = join_ir(&code, &gep_ir);

    if target.is_array() {
        let (decay_ir, result) = decay_array(&target, &register, state);
        (join_ir(&code, &decay_ir), result)
    } else {
        let load_register = state.fresh_temp();
        let target_ptr_ty = state.types.intern_pointer(target.clone());
        let load_ir = format!("{load_register} = load {}, {} {register}", target.llvm_type(), target_ptr_ty.llvm_type());
        (join_ir(&code, &load_ir), ExprResult::lvalue(load_register, target, register))
    }
}

fn lower_member(base: &Expression, member: &Ident, arrow: bool, span: &Span, state: &mut CompilerState) -> (String, ExprResult) {
    let (base_code, base_result) = lower_expression(base, state);

    let struct_result = if arrow {
        if !base_result.ty.is_pointer() {
            state.error(CompileError::TypeMismatch(
                "'->' requires a pointer to struct".to_string(),
                span.clone(),
            ));
            return (base_code, base_result);
        }
        let target = base_result.ty.target_type().expect("pointer has a target");
        let pointer = base_result.operand().to_string();
        ExprResult::lvalue(pointer.clone(), target, pointer)
    } else {
        base_result
    };

    if !struct_result.ty.is_struct() {
        state.error(CompileError::TypeMismatch(
            "member access on a non-struct value".to_string(),
            span.clone(),
        ));
        return (base_code, struct_result);
    }

    let Some((index, member_ty)) = struct_result.ty.get_member(&member.name) else {
        state.error(CompileError::UnknownIdentifier(
            format!("no member named '{}'", member.name),
            span.clone(),
        ));
        return (base_code, struct_result);
    };

    match &struct_result.lvalue_pointer {
        Some(pointer) => {
            let struct_ptr_ty = state.types.intern_pointer(struct_result.ty.clone());
            let member_ptr = state.fresh_temp();
            let gep_ir = format!(
                "{member_ptr} = getelementptr {}, {} {pointer}, i32 0, i32 {index}",
                struct_result.ty.llvm_type(),
                struct_ptr_ty.llvm_type(),
            );
            let member_ptr_ty = state.types.intern_pointer(member_ty.clone());
            let result_register = state.fresh_temp();
            let load_ir = format!("{result_register} = load {}, {} {member_ptr}", member_ty.llvm_type(), member_ptr_ty.llvm_type());
            let code = join_ir(&base_code, &join_ir(&gep_ir, &load_ir));
            (code, ExprResult::lvalue(result_register, member_ty, member_ptr))
        }
        None => {
            let result_register = state.fresh_temp();
            let extract_ir = format!(
                "{result_register} = extractvalue {} {}, {index}",
                struct_result.ty.llvm_type(),
                struct_result.operand()
            );
            (join_ir(&base_code, &extract_ir), ExprResult::rvalue(result_register, member_ty, false))
        }
    }
}

// -- assignment -----------------------------------------------------------------

fn lower_assign(op: AssignOp, lhs: &Expression, rhs: &Expression, span: &Span, state: &mut CompilerState) -> (String, ExprResult) {
    let (lhs_code, lhs_result) = lower_expression(lhs, state);
    let (rhs_code, rhs_result) = lower_expression(rhs, state);
    let code = join_ir(&lhs_code, &rhs_code);

    let Some(pointer) = lhs_result.lvalue_pointer.clone() else {
        state.error(CompileError::LvalueRequired("assignment requires an lvalue".to_string(), span.clone()));
        return (code, rhs_result);
    };

    let (op_code, rhs_result) = match op.as_binop() {
        Some(binop) => lower_arithmetic(binop, lhs_result.clone(), rhs_result, span, state, String::new()),
        None => (String::new(), rhs_result),
    };

    let (cast_code, rhs_result) = if lhs_result.ty.is_pointer() {
        (String::new(), rhs_result)
    } else {
        cast(&rhs_result, &lhs_result.ty, state)
    };

    // The destination was `alloca`'d at `lhs_result.ty`'s type, so the store's type
    // annotations must come from it, not from `rhs_result.ty` — pointer assignment
    // between differing pointee types skips `cast` above but still stores through a
    // `pointer` register typed as a pointer-to-`lhs_result.ty`.
    let pointer_ty = state.types.intern_pointer(lhs_result.ty.clone());
    let store_ir = format!(
        "store {} {}, {} {pointer}",
        lhs_result.ty.llvm_type(),
        rhs_result.operand(),
        pointer_ty.llvm_type(),
    );

    let code = join_ir(&join_ir(&join_ir(&code, &op_code), &cast_code), &store_ir);
    (
        code,
        ExprResult::rvalue(rhs_result.operand().to_string(), lhs_result.ty.clone(), rhs_result.is_constant),
    )
}
