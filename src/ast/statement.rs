//! Statement trees. One-to-one with `statement` in `c_subset.pest`; control-flow
//! lowering (labels, branch IR) happens in `crate::codegen::stmt`.

use pest::iterators::Pair;

use crate::span::Span;

use super::{declaration::Declaration, expression::Expression, Rule};

#[derive(Debug, Clone)]
pub enum Statement {
    Compound(Vec<Statement>, Span),
    If(Expression, Box<Statement>, Option<Box<Statement>>, Span),
    While(Expression, Box<Statement>, Span),
    DoWhile(Box<Statement>, Expression, Span),
    For(ForInit, Option<Expression>, Option<Expression>, Box<Statement>, Span),
    Switch(Expression, Box<Statement>, Span),
    Case(Expression, Option<Box<Statement>>, Span),
    Default(Option<Box<Statement>>, Span),
    Break(Span),
    Continue(Span),
    Return(Option<Expression>, Span),
    Declaration(Declaration),
    Expression(Option<Expression>, Span),
}

#[derive(Debug, Clone)]
pub enum ForInit {
    Decl(Declaration),
    Expr(Option<Expression>),
}

impl Statement {
    pub fn span(&self) -> &Span {
        match self {
            Statement::Compound(_, s)
            | Statement::If(_, _, _, s)
            | Statement::While(_, _, s)
            | Statement::DoWhile(_, _, s)
            | Statement::For(_, _, _, _, s)
            | Statement::Switch(_, _, s)
            | Statement::Case(_, _, s)
            | Statement::Default(_, s)
            | Statement::Break(s)
            | Statement::Continue(s)
            | Statement::Return(_, s)
            | Statement::Expression(_, s) => s,
            Statement::Declaration(decl) => &decl.span,
        }
    }

    pub fn from_pair(pair: Pair<Rule>, file: &str) -> Statement {
        assert_eq!(pair.as_rule(), Rule::statement);
        let inner = pair.into_inner().next().expect("statement has one child");
        let (line, column) = inner.line_col();
        let span = Span::new(file, line, column);
        match inner.as_rule() {
            Rule::compoundStatement => {
                let stmts = inner.into_inner().map(|p| Statement::from_pair(p, file)).collect();
                Statement::Compound(stmts, span)
            }
            Rule::ifStatement => {
                let mut parts = inner.into_inner();
                let cond = Expression::from_pair(parts.next().expect("if condition"), file);
                let then_branch = Box::new(Statement::from_pair(parts.next().expect("if body"), file));
                let else_branch = parts.next().map(|p| Box::new(Statement::from_pair(p, file)));
                Statement::If(cond, then_branch, else_branch, span)
            }
            Rule::whileStatement => {
                let mut parts = inner.into_inner();
                let cond = Expression::from_pair(parts.next().expect("while condition"), file);
                let body = Box::new(Statement::from_pair(parts.next().expect("while body"), file));
                Statement::While(cond, body, span)
            }
            Rule::doWhileStatement => {
                let mut parts = inner.into_inner();
                let body = Box::new(Statement::from_pair(parts.next().expect("do body"), file));
                let cond = Expression::from_pair(parts.next().expect("do-while condition"), file);
                Statement::DoWhile(body, cond, span)
            }
            Rule::forStatement => {
                let mut parts = inner.into_inner();
                let init = ForInit::from_pair(parts.next().expect("for init"), file);
                let cond = parts
                    .next()
                    .expect("for cond")
                    .into_inner()
                    .next()
                    .map(|p| Expression::from_pair(p, file));
                let step = parts
                    .next()
                    .expect("for step")
                    .into_inner()
                    .next()
                    .map(|p| Expression::from_pair(p, file));
                let body = Box::new(Statement::from_pair(parts.next().expect("for body"), file));
                Statement::For(init, cond, step, body, span)
            }
            Rule::switchStatement => {
                let mut parts = inner.into_inner();
                let scrutinee = Expression::from_pair(parts.next().expect("switch scrutinee"), file);
                let body = Box::new(Statement::from_pair(parts.next().expect("switch body"), file));
                Statement::Switch(scrutinee, body, span)
            }
            Rule::caseStatement => {
                let mut parts = inner.into_inner();
                let value = Expression::from_pair(parts.next().expect("case value"), file);
                let body = parts.next().map(|p| Box::new(Statement::from_pair(p, file)));
                Statement::Case(value, body, span)
            }
            Rule::defaultStatement => {
                let body = inner.into_inner().next().map(|p| Box::new(Statement::from_pair(p, file)));
                Statement::Default(body, span)
            }
            Rule::breakStatement => Statement::Break(span),
            Rule::continueStatement => Statement::Continue(span),
            Rule::returnStatement => {
                let value = inner.into_inner().next().map(|p| Expression::from_pair(p, file));
                Statement::Return(value, span)
            }
            Rule::declarationStatement => {
                let decl_pair = inner.into_inner().next().expect("declarationStatement wraps declaration");
                Statement::Declaration(Declaration::from_pair(decl_pair, file))
            }
            Rule::expressionStatement => {
                let expr = inner.into_inner().next().map(|p| Expression::from_pair(p, file));
                Statement::Expression(expr, span)
            }
            other => unreachable!("unexpected statement child {other:?}"),
        }
    }
}

impl ForInit {
    fn from_pair(pair: Pair<Rule>, file: &str) -> ForInit {
        assert_eq!(pair.as_rule(), Rule::forInit);
        match pair.into_inner().next() {
            None => ForInit::Expr(None),
            Some(child) => match child.as_rule() {
                Rule::declaration => ForInit::Decl(Declaration::from_pair(child, file)),
                Rule::expr => ForInit::Expr(Some(Expression::from_pair(child, file))),
                other => unreachable!("unexpected forInit child {other:?}"),
            },
        }
    }
}
