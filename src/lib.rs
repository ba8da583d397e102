//! Front end and LLVM textual IR emitter for a subset of C.

pub mod ast;
pub mod codegen;
pub mod driver;
pub mod error;
pub mod resolve;
pub mod span;
pub mod symtab;
pub mod types;
pub mod value;

pub use driver::{compile, CompileOutput};
pub use error::{CompileError, CompileFailure, CompileWarning};
pub use span::Span;
