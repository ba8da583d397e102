//! Expression trees, shaped directly from the precedence ladder in `c_subset.pest`.
//! Lowering (constant folding, casts, IR emission) lives in `crate::codegen::expr` —
//! this module only folds each precedence level's repetition into a left-associative
//! chain of binary nodes, grounded in `original_source/c_llvm/ast/expressions.py`'s
//! node hierarchy (`BinaryArithmeticExpressionNode`, `CompareExpressionNode`, etc.).

use pest::iterators::Pair;

use crate::span::Span;

use super::{specifier::DeclarationSpecifiers, Ident, Rule};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    BitAnd,
    BitOr,
    BitXor,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
    BitNot,
    Not,
    Addr,
    Deref,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    BitAnd,
    BitOr,
    BitXor,
}

impl AssignOp {
    /// The binary operator a compound assignment shares its arithmetic with, per
    /// `AssignmentExpressionNode.compound_operations` in the original.
    pub fn as_binop(self) -> Option<BinOp> {
        match self {
            AssignOp::Assign => None,
            AssignOp::Add => Some(BinOp::Add),
            AssignOp::Sub => Some(BinOp::Sub),
            AssignOp::Mul => Some(BinOp::Mul),
            AssignOp::Div => Some(BinOp::Div),
            AssignOp::Rem => Some(BinOp::Rem),
            AssignOp::Shl => Some(BinOp::Shl),
            AssignOp::Shr => Some(BinOp::Shr),
            AssignOp::BitAnd => Some(BinOp::BitAnd),
            AssignOp::BitOr => Some(BinOp::BitOr),
            AssignOp::BitXor => Some(BinOp::BitXor),
        }
    }
}

/// A cast target: `(specifiers abstractDeclarator?)`, where the abstract declarator
/// (if present) is pointer-only — this dialect's casts never target arrays/functions.
#[derive(Debug, Clone)]
pub struct TypeName {
    pub specifiers: DeclarationSpecifiers,
    pub pointer_depth: u32,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Expression {
    Comma(Vec<Expression>, Span),
    Assign(AssignOp, Box<Expression>, Box<Expression>, Span),
    Logical(LogicalOp, Box<Expression>, Box<Expression>, Span),
    Binary(BinOp, Box<Expression>, Box<Expression>, Span),
    Cast(TypeName, Box<Expression>, Span),
    Unary(UnaryOp, Box<Expression>, Span),
    Call(Box<Expression>, Vec<Expression>, Span),
    Index(Box<Expression>, Box<Expression>, Span),
    Member(Box<Expression>, Ident, bool, Span),
    Ident(Ident),
    IntLiteral(String, Span),
    FloatLiteral(String, Span),
    CharLiteral(String, Span),
    StringLiteral(String, Span),
}

impl Expression {
    pub fn span(&self) -> &Span {
        match self {
            Expression::Comma(_, s)
            | Expression::Assign(_, _, _, s)
            | Expression::Logical(_, _, _, s)
            | Expression::Binary(_, _, _, s)
            | Expression::Cast(_, _, s)
            | Expression::Unary(_, _, s)
            | Expression::Call(_, _, s)
            | Expression::Index(_, _, s)
            | Expression::Member(_, _, _, s)
            | Expression::IntLiteral(_, s)
            | Expression::FloatLiteral(_, s)
            | Expression::CharLiteral(_, s)
            | Expression::StringLiteral(_, s) => s,
            Expression::Ident(id) => &id.span,
        }
    }

    pub fn from_pair(pair: Pair<Rule>, file: &str) -> Expression {
        match pair.as_rule() {
            Rule::expr => Self::from_comma(pair, file),
            Rule::constantExpr => Self::from_pair(pair.into_inner().next().unwrap(), file),
            Rule::assignmentExpr => Self::from_assignment(pair, file),
            Rule::conditionalExpr => Self::from_pair(pair.into_inner().next().unwrap(), file),
            Rule::logicalOrExpr => Self::from_left_assoc_logical(pair, file, LogicalOp::Or),
            Rule::logicalAndExpr => Self::from_left_assoc_logical(pair, file, LogicalOp::And),
            Rule::bitOrExpr => Self::from_left_assoc(pair, file, BinOp::BitOr),
            Rule::bitXorExpr => Self::from_left_assoc(pair, file, BinOp::BitXor),
            Rule::bitAndExpr => Self::from_left_assoc(pair, file, BinOp::BitAnd),
            Rule::equalityExpr => Self::from_left_assoc_tagged(pair, file),
            Rule::relationalExpr => Self::from_left_assoc_tagged(pair, file),
            Rule::shiftExpr => Self::from_left_assoc_tagged(pair, file),
            Rule::additiveExpr => Self::from_left_assoc_tagged(pair, file),
            Rule::multiplicativeExpr => Self::from_left_assoc_tagged(pair, file),
            Rule::castExpr => Self::from_cast(pair, file),
            Rule::unaryExpr => Self::from_unary(pair, file),
            Rule::postfixExpr => Self::from_postfix(pair, file),
            Rule::primaryExpr => Self::from_primary(pair, file),
            other => unreachable!("unexpected expression rule {other:?}"),
        }
    }

    fn from_comma(pair: Pair<Rule>, file: &str) -> Expression {
        let (line, column) = pair.line_col();
        let span = Span::new(file, line, column);
        let mut parts: Vec<Expression> = pair.into_inner().map(|p| Self::from_pair(p, file)).collect();
        if parts.len() == 1 {
            parts.remove(0)
        } else {
            Expression::Comma(parts, span)
        }
    }

    fn from_assignment(pair: Pair<Rule>, file: &str) -> Expression {
        let (line, column) = pair.line_col();
        let span = Span::new(file, line, column);
        let mut inner = pair.into_inner();
        let lhs = Self::from_pair(inner.next().unwrap(), file);
        match inner.next() {
            None => lhs,
            Some(op_pair) => {
                let op = match op_pair.as_str() {
                    "=" => AssignOp::Assign,
                    "+=" => AssignOp::Add,
                    "-=" => AssignOp::Sub,
                    "*=" => AssignOp::Mul,
                    "/=" => AssignOp::Div,
                    "%=" => AssignOp::Rem,
                    "<<=" => AssignOp::Shl,
                    ">>=" => AssignOp::Shr,
                    "&=" => AssignOp::BitAnd,
                    "^=" => AssignOp::BitXor,
                    "|=" => AssignOp::BitOr,
                    other => unreachable!("unknown assignment operator {other}"),
                };
                let rhs = Self::from_pair(inner.next().expect("assignment rhs"), file);
                Expression::Assign(op, Box::new(lhs), Box::new(rhs), span)
            }
        }
    }

    /// Folds `head (op tail)*` into a left-associative chain, for levels whose
    /// repeated operator is implicit (bitwise or/xor/and all use one fixed operator).
    fn from_left_assoc(pair: Pair<Rule>, file: &str, op: BinOp) -> Expression {
        let (line, column) = pair.line_col();
        let span = Span::new(file, line, column);
        let mut inner = pair.into_inner();
        let mut acc = Self::from_pair(inner.next().unwrap(), file);
        for next in inner {
            let rhs = Self::from_pair(next, file);
            acc = Expression::Binary(op, Box::new(acc), Box::new(rhs), span.clone());
        }
        acc
    }

    fn from_left_assoc_logical(pair: Pair<Rule>, file: &str, op: LogicalOp) -> Expression {
        let (line, column) = pair.line_col();
        let span = Span::new(file, line, column);
        let mut inner = pair.into_inner();
        let mut acc = Self::from_pair(inner.next().unwrap(), file);
        for next in inner {
            let rhs = Self::from_pair(next, file);
            acc = Expression::Logical(op, Box::new(acc), Box::new(rhs), span.clone());
        }
        acc
    }

    /// Folds `head (opToken tail)*` where the operator token is an explicit rule
    /// (equality/relational/shift/additive/multiplicative all carry their own op rule).
    fn from_left_assoc_tagged(pair: Pair<Rule>, file: &str) -> Expression {
        let (line, column) = pair.line_col();
        let span = Span::new(file, line, column);
        let mut inner = pair.into_inner();
        let mut acc = Self::from_pair(inner.next().unwrap(), file);
        loop {
            let Some(op_pair) = inner.next() else { break };
            let op = binop_from_str(op_pair.as_str());
            let rhs_pair = inner.next().expect("binary rhs operand");
            let rhs = Self::from_pair(rhs_pair, file);
            acc = Expression::Binary(op, Box::new(acc), Box::new(rhs), span.clone());
        }
        acc
    }

    fn from_cast(pair: Pair<Rule>, file: &str) -> Expression {
        let (line, column) = pair.line_col();
        let span = Span::new(file, line, column);
        let mut inner = pair.into_inner().peekable();
        let first = inner.peek().expect("castExpr has a child").clone();
        if first.as_rule() == Rule::typeName {
            let type_name_pair = inner.next().unwrap();
            let operand_pair = inner.next().expect("cast operand");
            let type_name = TypeName::from_pair(type_name_pair, file);
            let operand = Self::from_pair(operand_pair, file);
            Expression::Cast(type_name, Box::new(operand), span)
        } else {
            Self::from_pair(inner.next().unwrap(), file)
        }
    }

    fn from_unary(pair: Pair<Rule>, file: &str) -> Expression {
        let (line, column) = pair.line_col();
        let span = Span::new(file, line, column);
        let mut inner = pair.into_inner();
        let first = inner.next().expect("unaryExpr has a child");
        if first.as_rule() == Rule::unaryOp {
            let op = match first.as_str() {
                "&" => UnaryOp::Addr,
                "*" => UnaryOp::Deref,
                "+" => UnaryOp::Plus,
                "-" => UnaryOp::Neg,
                "~" => UnaryOp::BitNot,
                "!" => UnaryOp::Not,
                other => unreachable!("unknown unary operator {other}"),
            };
            let operand = Self::from_pair(inner.next().expect("unary operand"), file);
            Expression::Unary(op, Box::new(operand), span)
        } else {
            Self::from_pair(first, file)
        }
    }

    fn from_postfix(pair: Pair<Rule>, file: &str) -> Expression {
        let (line, column) = pair.line_col();
        let span = Span::new(file, line, column);
        let mut inner = pair.into_inner();
        let mut acc = Self::from_pair(inner.next().expect("postfixExpr primary"), file);
        for postfix_op in inner {
            assert_eq!(postfix_op.as_rule(), Rule::postfixOp);
            let suffix = postfix_op.into_inner().next().expect("postfixOp has one child");
            acc = match suffix.as_rule() {
                Rule::indexSuffix => {
                    let index_expr = Self::from_pair(suffix.into_inner().next().unwrap(), file);
                    Expression::Index(Box::new(acc), Box::new(index_expr), span.clone())
                }
                Rule::callSuffix => {
                    let args = suffix
                        .into_inner()
                        .next()
                        .map(|list| list.into_inner().map(|a| Self::from_pair(a, file)).collect())
                        .unwrap_or_default();
                    Expression::Call(Box::new(acc), args, span.clone())
                }
                Rule::memberSuffix => {
                    let text = suffix.as_str();
                    let arrow = text.starts_with("->");
                    let member = Ident::from_pair(suffix.into_inner().next().unwrap(), file);
                    Expression::Member(Box::new(acc), member, arrow, span.clone())
                }
                other => unreachable!("unexpected postfixOp child {other:?}"),
            };
        }
        acc
    }

    fn from_primary(pair: Pair<Rule>, file: &str) -> Expression {
        let (line, column) = pair.line_col();
        let span = Span::new(file, line, column);
        let inner = pair.into_inner().next();
        match inner {
            None => unreachable!("primaryExpr with no child (parenthesized handled below)"),
            Some(child) => match child.as_rule() {
                Rule::expr => Self::from_pair(child, file),
                Rule::floatLiteral => Expression::FloatLiteral(child.as_str().to_owned(), span),
                Rule::integerLiteral => Expression::IntLiteral(child.as_str().to_owned(), span),
                Rule::charLiteral => Expression::CharLiteral(child.as_str().to_owned(), span),
                Rule::stringLiteral => Expression::StringLiteral(child.as_str().to_owned(), span),
                Rule::ident => Expression::Ident(Ident::from_pair(child, file)),
                other => unreachable!("unexpected primaryExpr child {other:?}"),
            },
        }
    }
}

fn binop_from_str(op: &str) -> BinOp {
    match op {
        "==" => BinOp::Eq,
        "!=" => BinOp::Ne,
        "<=" => BinOp::Le,
        ">=" => BinOp::Ge,
        "<" => BinOp::Lt,
        ">" => BinOp::Gt,
        "<<" => BinOp::Shl,
        ">>" => BinOp::Shr,
        "+" => BinOp::Add,
        "-" => BinOp::Sub,
        "*" => BinOp::Mul,
        "/" => BinOp::Div,
        "%" => BinOp::Rem,
        other => unreachable!("unknown binary operator {other}"),
    }
}

impl TypeName {
    fn from_pair(pair: Pair<Rule>, file: &str) -> TypeName {
        assert_eq!(pair.as_rule(), Rule::typeName);
        let (line, column) = pair.line_col();
        let span = Span::new(file, line, column);
        let mut inner = pair.into_inner();
        let specifiers = DeclarationSpecifiers::from_pair(inner.next().expect("typeName specifiers"), file);
        let pointer_depth = inner
            .next()
            .map(|abstract_decl| {
                assert_eq!(abstract_decl.as_rule(), Rule::abstractDeclarator);
                abstract_decl.as_str().matches('*').count() as u32
            })
            .unwrap_or(0);
        TypeName {
            specifiers,
            pointer_depth,
            span,
        }
    }
}
