//! Parse-tree types. Each submodule owns one `Pair<Rule>` -> typed node conversion;
//! none of them touch `CompilerState` or emit IR — that's `crate::resolve` and
//! `crate::codegen`.

pub mod declaration;
pub mod declarator;
pub mod expression;
pub mod ident;
pub mod parser;
pub mod specifier;
pub mod statement;

pub use ident::Ident;
pub use parser::Rule;
