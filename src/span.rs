//! Source positions, carried by every AST node so diagnostics can point back
//! at the input file.

use std::fmt::Display;

/// A `(file, line, column)` triple, as produced by `pest::iterators::Pair::line_col`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Span {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(file: impl ToString, line: usize, column: usize) -> Self {
        Span {
            file: file.to_string(),
            line,
            column,
        }
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}
