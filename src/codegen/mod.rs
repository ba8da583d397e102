//! IR emission. `expr` lowers expressions to `ExprResult` plus IR text, `stmt` lowers
//! statements (and manages basic-block structure), `decl` lowers declarations and
//! function definitions and drives the whole-program walk.

pub mod decl;
pub mod expr;
pub mod stmt;

pub use decl::lower_program;
