use pest::iterators::Pair;

use crate::span::Span;

use super::Rule;

#[derive(Debug, Clone)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn from_pair(pair: Pair<Rule>, file: &str) -> Ident {
        assert_eq!(pair.as_rule(), Rule::ident);
        let (line, column) = pair.line_col();
        Ident {
            name: pair.as_str().to_owned(),
            span: Span::new(file, line, column),
        }
    }
}
