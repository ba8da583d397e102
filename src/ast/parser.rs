use pest::Parser;
use pest_derive::Parser;

use crate::{error::CompileError, span::Span};

#[derive(Parser)]
#[grammar = "c_subset.pest"]
pub struct CParser;

/// Parses a whole translation unit, converting a `pest` failure into a `CompileError::Parse`
/// so the CLI can print it alongside semantic errors in the same `line:column: message` form.
pub fn parse_program<'a>(
    source: &'a str,
    file: &str,
) -> Result<pest::iterators::Pairs<'a, Rule>, CompileError> {
    CParser::parse(Rule::program, source).map_err(|err| {
        let (line, column) = match err.line_col {
            pest::error::LineColLocation::Pos((l, c)) => (l, c),
            pest::error::LineColLocation::Span((l, c), _) => (l, c),
        };
        CompileError::Parse(err.to_string(), Span::new(file, line, column))
    })
}
