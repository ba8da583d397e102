//! The declarator grammar, in source order. Resolution (inverting that order into an
//! actual type) happens in `crate::resolve` — this module only shapes the parse tree.
//!
//! Grounded in `original_source/c_llvm/ast/declarations.py`'s `PointerDeclaratorNode`/
//! `FunctionDeclaratorNode`/`ArrayDeclaratorNode`/`IdentifierDeclaratorNode` quartet:
//! each node wraps its `inner_declarator`'s resolved type, so the tree shape built here
//! must already nest in resolution order (pointer adjacent to the identifier, suffixes
//! wrapping outward from last-written to first-written). A parenthesized declarator
//! group is unwrapped transparently rather than modeled as a fifth node kind — the
//! original's declarator resolver only ever names these four (see DESIGN.md).

use pest::iterators::Pair;

use crate::span::Span;

use super::{ident::Ident, specifier::DeclarationSpecifiers, Rule};

#[derive(Debug, Clone)]
pub enum Declarator {
    Identifier(Ident),
    Pointer(Box<Declarator>, Span),
    Array(Box<Declarator>, Option<Box<super::expression::Expression>>, Span),
    Function(Box<Declarator>, ParamList, Span),
}

#[derive(Debug, Clone)]
pub struct ParamDeclaration {
    pub specifiers: DeclarationSpecifiers,
    pub declarator: Declarator,
}

/// `(void)` and `()` both fold to zero parameters (see `ParamList::from_pair`).
#[derive(Debug, Clone)]
pub struct ParamList {
    pub params: Vec<ParamDeclaration>,
    pub variadic: bool,
}

impl Declarator {
    pub fn span(&self) -> &Span {
        match self {
            Declarator::Identifier(id) => &id.span,
            Declarator::Pointer(_, s) | Declarator::Array(_, _, s) | Declarator::Function(_, s) => s,
        }
    }

    /// Drills down to the bound identifier, the way the original's `get_identifier`
    /// recurses through every wrapper to the leaf.
    pub fn identifier(&self) -> &Ident {
        match self {
            Declarator::Identifier(id) => id,
            Declarator::Pointer(inner, _) => inner.identifier(),
            Declarator::Array(inner, _, _) => inner.identifier(),
            Declarator::Function(inner, _) => inner.identifier(),
        }
    }

    pub fn from_pair(pair: Pair<Rule>, file: &str) -> Declarator {
        assert_eq!(pair.as_rule(), Rule::declarator);
        let (line, column) = pair.line_col();
        let span = Span::new(file, line, column);

        let mut inner = pair.into_inner();
        let mut next = inner.next().expect("declarator has a directDeclarator");

        let mut pointer_count = 0;
        if next.as_rule() == Rule::pointer {
            pointer_count = next.as_str().matches('*').count();
            next = inner.next().expect("directDeclarator after pointer");
        }
        debug_assert_eq!(next.as_rule(), Rule::directDeclarator);

        let mut direct = next.into_inner();
        let base_pair = direct.next().expect("directDeclaratorBase");
        let mut node = Self::base_from_pair(base_pair, file);

        let suffixes: Vec<Pair<Rule>> = direct.collect();
        for suffix in suffixes.into_iter().rev() {
            node = Self::wrap_suffix(node, suffix, file);
        }

        for _ in 0..pointer_count {
            node = Declarator::Pointer(Box::new(node), span.clone());
        }

        node
    }

    fn base_from_pair(pair: Pair<Rule>, file: &str) -> Declarator {
        assert_eq!(pair.as_rule(), Rule::directDeclaratorBase);
        let inner = pair.into_inner().next().expect("directDeclaratorBase has one child");
        match inner.as_rule() {
            Rule::ident => Declarator::Identifier(Ident::from_pair(inner, file)),
            Rule::declarator => Declarator::from_pair(inner, file),
            other => unreachable!("unexpected directDeclaratorBase child {other:?}"),
        }
    }

    fn wrap_suffix(node: Declarator, suffix: Pair<Rule>, file: &str) -> Declarator {
        assert_eq!(suffix.as_rule(), Rule::declaratorSuffix);
        let (line, column) = suffix.line_col();
        let span = Span::new(file, line, column);
        let inner = suffix.into_inner().next().expect("declaratorSuffix has one child");
        match inner.as_rule() {
            Rule::arraySuffix => {
                let length = inner
                    .into_inner()
                    .next()
                    .map(|expr_pair| Box::new(super::expression::Expression::from_pair(expr_pair, file)));
                Declarator::Array(Box::new(node), length, span)
            }
            Rule::functionSuffix => {
                let params = ParamList::from_pair(inner, file);
                Declarator::Function(Box::new(node), params, span)
            }
            other => unreachable!("unexpected declaratorSuffix child {other:?}"),
        }
    }
}

impl ParamList {
    fn from_pair(function_suffix: Pair<Rule>, file: &str) -> ParamList {
        assert_eq!(function_suffix.as_rule(), Rule::functionSuffix);
        let empty = ParamList {
            params: Vec::new(),
            variadic: false,
        };
        let Some(list_pair) = function_suffix.into_inner().next() else {
            return empty;
        };
        assert_eq!(list_pair.as_rule(), Rule::parameterList);

        // The bare "void" alternative carries no children (it's an uncaptured literal).
        if list_pair.as_str().trim() == "void" && list_pair.clone().into_inner().next().is_none() {
            return empty;
        }

        let mut params = Vec::new();
        let mut variadic = false;
        for child in list_pair.into_inner() {
            match child.as_rule() {
                Rule::parameterDeclaration => params.push(ParamDeclaration::from_pair(child, file)),
                Rule::ellipsis => variadic = true,
                other => unreachable!("unexpected parameterList child {other:?}"),
            }
        }
        ParamList { params, variadic }
    }
}

impl ParamDeclaration {
    fn from_pair(pair: Pair<Rule>, file: &str) -> ParamDeclaration {
        assert_eq!(pair.as_rule(), Rule::parameterDeclaration);
        let mut inner = pair.into_inner();
        let specifiers = DeclarationSpecifiers::from_pair(inner.next().expect("param specifiers"), file);
        let declarator = Declarator::from_pair(inner.next().expect("param declarator"), file);
        ParamDeclaration {
            specifiers,
            declarator,
        }
    }
}
