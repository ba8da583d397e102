//! Diagnostics produced while lowering a translation unit.
//!
//! Errors are accumulated rather than raised eagerly (see `symtab::CompilerState::errors`)
//! so that a single run can report as many problems as possible.

use std::fmt::Display;

use crate::span::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    Parse(String, Span),
    UnknownType(String, Span),
    InvalidDeclarator(String, Span),
    IncompleteType(String, Span),
    Redeclaration(String, Span),
    Redefinition(String, Span),
    NonConstantWhereRequired(String, Span),
    LvalueRequired(String, Span),
    TypeMismatch(String, Span),
    ArityMismatch(String, Span),
    BadControlFlow(String, Span),
    VoidReturnMismatch(String, Span),
    UnknownIdentifier(String, Span),
}

impl CompileError {
    fn span(&self) -> &Span {
        match self {
            CompileError::Parse(_, s)
            | CompileError::UnknownType(_, s)
            | CompileError::InvalidDeclarator(_, s)
            | CompileError::IncompleteType(_, s)
            | CompileError::Redeclaration(_, s)
            | CompileError::Redefinition(_, s)
            | CompileError::NonConstantWhereRequired(_, s)
            | CompileError::LvalueRequired(_, s)
            | CompileError::TypeMismatch(_, s)
            | CompileError::ArityMismatch(_, s)
            | CompileError::BadControlFlow(_, s)
            | CompileError::VoidReturnMismatch(_, s)
            | CompileError::UnknownIdentifier(_, s) => s,
        }
    }

    fn message(&self) -> &str {
        match self {
            CompileError::Parse(m, _)
            | CompileError::UnknownType(m, _)
            | CompileError::InvalidDeclarator(m, _)
            | CompileError::IncompleteType(m, _)
            | CompileError::Redeclaration(m, _)
            | CompileError::Redefinition(m, _)
            | CompileError::NonConstantWhereRequired(m, _)
            | CompileError::LvalueRequired(m, _)
            | CompileError::TypeMismatch(m, _)
            | CompileError::ArityMismatch(m, _)
            | CompileError::BadControlFlow(m, _)
            | CompileError::VoidReturnMismatch(m, _)
            | CompileError::UnknownIdentifier(m, _) => m,
        }
    }
}

impl Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let span = self.span();
        write!(f, "{}:{}: {}", span.line, span.column, self.message())
    }
}

impl std::error::Error for CompileError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileWarning {
    MissingReturn(String, Span),
}

impl Display for CompileWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileWarning::MissingReturn(msg, span) => {
                write!(f, "{}:{}: {}", span.line, span.column, msg)
            }
        }
    }
}

/// Outcome of compiling a whole translation unit.
pub struct CompileFailure {
    pub errors: Vec<CompileError>,
}

impl Display for CompileFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for err in &self.errors {
            writeln!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CompileFailure {}
