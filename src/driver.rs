//! Top-level entry point: source text in, LLVM textual IR (or diagnostics) out.
//!
//! Grounded in `src/bin/why/main.rs`'s parse-then-typecheck-then-emit driver shape
//! and `src/compiler/mod.rs`'s section-assembly pattern, adapted to build one
//! in-memory string instead of writing straight through a `File`.

use log::info;

use crate::{
    ast::{declaration::Program, parser},
    codegen,
    error::{CompileFailure, CompileWarning},
    symtab::CompilerState,
};

/// Everything produced by a successful compilation.
pub struct CompileOutput {
    pub ir: String,
    pub warnings: Vec<CompileWarning>,
}

/// Compiles one translation unit held in `source` (whose path is `file`, used only
/// for diagnostics) down to LLVM textual IR.
pub fn compile(source: &str, file: &str) -> Result<CompileOutput, CompileFailure> {
    let mut state = CompilerState::new();

    let pairs = match parser::parse_program(source, file) {
        Ok(pairs) => pairs,
        Err(err) => return Err(CompileFailure { errors: vec![err] }),
    };

    let program = Program::from_pairs(pairs, file);
    info!("parsed {} top-level item(s) from {file}", program.items.len());

    let body = codegen::lower_program(&program, &mut state);

    if !state.errors.is_empty() {
        return Err(CompileFailure { errors: state.errors });
    }

    let mut ir = String::new();
    for decl in &state.global_declarations {
        ir.push_str(decl);
        ir.push('\n');
    }
    if !state.global_declarations.is_empty() {
        ir.push('\n');
    }
    ir.push_str(&body);

    Ok(CompileOutput {
        ir,
        warnings: state.warnings,
    })
}
