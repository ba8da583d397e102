//! Declarations and top-level items. Grounded in `original_source/c_llvm/ast/declarations.py`'s
//! `DeclarationNode`/`FunctionDefinitionNode`/`StructDefinitionNode` split — this module only
//! shapes the tree; `crate::resolve` turns declarators into `TypeId`s and `crate::codegen::decl`
//! emits the IR.

use pest::iterators::Pair;

use crate::span::Span;

use super::{
    declarator::Declarator, expression::Expression, specifier::DeclarationSpecifiers,
    statement::Statement, Rule,
};

#[derive(Debug, Clone)]
pub struct InitDeclarator {
    pub declarator: Declarator,
    pub initializer: Option<Expression>,
}

#[derive(Debug, Clone)]
pub struct Declaration {
    pub specifiers: DeclarationSpecifiers,
    pub declarators: Vec<InitDeclarator>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FunctionDefinition {
    pub specifiers: DeclarationSpecifiers,
    pub declarator: Declarator,
    pub body: Statement,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum TopLevelItem {
    FunctionDefinition(FunctionDefinition),
    Declaration(Declaration),
}

#[derive(Debug, Clone)]
pub struct Program {
    pub items: Vec<TopLevelItem>,
}

impl Declaration {
    pub fn from_pair(pair: Pair<Rule>, file: &str) -> Declaration {
        assert_eq!(pair.as_rule(), Rule::declaration);
        let (line, column) = pair.line_col();
        let span = Span::new(file, line, column);

        let mut inner = pair.into_inner();
        let specifiers = DeclarationSpecifiers::from_pair(inner.next().expect("declaration specifiers"), file);

        let declarators = match inner.next() {
            None => Vec::new(),
            Some(list) => {
                assert_eq!(list.as_rule(), Rule::initDeclaratorList);
                list.into_inner().map(|p| InitDeclarator::from_pair(p, file)).collect()
            }
        };

        Declaration {
            specifiers,
            declarators,
            span,
        }
    }
}

impl InitDeclarator {
    fn from_pair(pair: Pair<Rule>, file: &str) -> InitDeclarator {
        assert_eq!(pair.as_rule(), Rule::initDeclarator);
        let mut inner = pair.into_inner();
        let declarator = Declarator::from_pair(inner.next().expect("initDeclarator declarator"), file);
        let initializer = inner.next().map(|init| {
            let expr_pair = init.into_inner().next().expect("initializer wraps assignmentExpr");
            Expression::from_pair(expr_pair, file)
        });
        InitDeclarator { declarator, initializer }
    }
}

impl FunctionDefinition {
    fn from_pair(pair: Pair<Rule>, file: &str) -> FunctionDefinition {
        assert_eq!(pair.as_rule(), Rule::functionDefinition);
        let (line, column) = pair.line_col();
        let span = Span::new(file, line, column);

        let mut inner = pair.into_inner();
        let specifiers = DeclarationSpecifiers::from_pair(inner.next().expect("function specifiers"), file);
        let declarator = Declarator::from_pair(inner.next().expect("function declarator"), file);
        let body_pair = inner.next().expect("function body");
        let body_span = {
            let (l, c) = body_pair.line_col();
            Span::new(file, l, c)
        };
        let body_stmts = body_pair.into_inner().map(|p| Statement::from_pair(p, file)).collect();
        let body = Statement::Compound(body_stmts, body_span);

        FunctionDefinition {
            specifiers,
            declarator,
            body,
            span,
        }
    }
}

impl TopLevelItem {
    fn from_pair(pair: Pair<Rule>, file: &str) -> TopLevelItem {
        assert_eq!(pair.as_rule(), Rule::topLevelItem);
        let inner = pair.into_inner().next().expect("topLevelItem has one child");
        match inner.as_rule() {
            Rule::functionDefinition => TopLevelItem::FunctionDefinition(FunctionDefinition::from_pair(inner, file)),
            Rule::declaration => TopLevelItem::Declaration(Declaration::from_pair(inner, file)),
            other => unreachable!("unexpected topLevelItem child {other:?}"),
        }
    }
}

impl Program {
    /// `pairs` is the result of `parser::parse_program`: a single `program` pair.
    pub fn from_pairs(mut pairs: pest::iterators::Pairs<Rule>, file: &str) -> Program {
        let program_pair = pairs.next().expect("parse_program yields the program pair");
        assert_eq!(program_pair.as_rule(), Rule::program);

        let mut items = Vec::new();
        for pair in program_pair.into_inner() {
            match pair.as_rule() {
                Rule::topLevelItem => items.push(TopLevelItem::from_pair(pair, file)),
                Rule::EOI => {}
                other => unreachable!("unexpected top-level pair {other:?}"),
            }
        }
        Program { items }
    }
}
