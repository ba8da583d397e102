use pest::iterators::Pair;

use crate::span::Span;

use super::{declarator::Declarator, ident::Ident, Rule};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageClass {
    Extern,
    Static,
}

#[derive(Debug, Clone)]
pub enum TypeSpecifier {
    Void,
    Char,
    Int,
    Float,
    Double,
    Bool,
    Struct(StructSpecifier),
    /// A bare identifier used as a type specifier. This dialect has no `typedef`
    /// elaboration, so this only ever resolves against a previously-declared struct tag.
    Named(Ident),
}

#[derive(Debug, Clone)]
pub struct StructSpecifier {
    pub tag: Ident,
    /// `None` for a forward reference (`struct Foo;` used as a type), `Some` (possibly
    /// empty) when a `{ ... }` body was present.
    pub members: Option<Vec<StructMember>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct StructMember {
    pub specifiers: DeclarationSpecifiers,
    pub declarator: Declarator,
}

/// The specifier list that precedes every declarator: storage class plus the type.
#[derive(Debug, Clone)]
pub struct DeclarationSpecifiers {
    pub storage: Option<StorageClass>,
    pub type_specifier: TypeSpecifier,
    pub span: Span,
}

impl DeclarationSpecifiers {
    pub fn from_pair(pair: Pair<Rule>, file: &str) -> DeclarationSpecifiers {
        assert_eq!(pair.as_rule(), Rule::declarationSpecifiers);
        let (line, column) = pair.line_col();
        let span = Span::new(file, line, column);

        let mut storage = None;
        let mut type_specifier = None;
        for spec in pair.into_inner() {
            let inner = spec.into_inner().next().expect("declarationSpecifier has one child");
            match inner.as_rule() {
                Rule::storageClassSpecifier => {
                    storage = Some(match inner.as_str() {
                        "extern" => StorageClass::Extern,
                        "static" => StorageClass::Static,
                        other => unreachable!("unknown storage class {other}"),
                    });
                }
                Rule::typeSpecifier => {
                    type_specifier = Some(TypeSpecifier::from_pair(inner, file));
                }
                other => unreachable!("unexpected declarationSpecifier child {other:?}"),
            }
        }

        DeclarationSpecifiers {
            storage,
            type_specifier: type_specifier.expect("declarationSpecifiers requires a type"),
            span,
        }
    }
}

impl TypeSpecifier {
    fn from_pair(pair: Pair<Rule>, file: &str) -> TypeSpecifier {
        assert_eq!(pair.as_rule(), Rule::typeSpecifier);
        if let Some(inner) = pair.clone().into_inner().next() {
            return match inner.as_rule() {
                Rule::structSpecifier => TypeSpecifier::Struct(StructSpecifier::from_pair(inner, file)),
                Rule::ident => TypeSpecifier::Named(Ident::from_pair(inner, file)),
                other => unreachable!("unexpected typeSpecifier child {other:?}"),
            };
        }
        match pair.as_str() {
            "void" => TypeSpecifier::Void,
            "char" => TypeSpecifier::Char,
            "int" => TypeSpecifier::Int,
            "float" => TypeSpecifier::Float,
            "double" => TypeSpecifier::Double,
            "_Bool" => TypeSpecifier::Bool,
            other => unreachable!("unknown builtin type specifier {other}"),
        }
    }
}

impl StructSpecifier {
    fn from_pair(pair: Pair<Rule>, file: &str) -> StructSpecifier {
        assert_eq!(pair.as_rule(), Rule::structSpecifier);
        let (line, column) = pair.line_col();
        let span = Span::new(file, line, column);

        let mut inner = pair.into_inner();
        let tag = Ident::from_pair(inner.next().expect("struct tag"), file);

        let mut members = Vec::new();
        let mut saw_body = false;
        for decl in inner {
            saw_body = true;
            debug_assert_eq!(decl.as_rule(), Rule::structDeclaration);
            let mut decl_inner = decl.into_inner();
            let specifiers = DeclarationSpecifiers::from_pair(decl_inner.next().unwrap(), file);
            for declarator_pair in decl_inner {
                members.push(StructMember {
                    specifiers: specifiers.clone(),
                    declarator: Declarator::from_pair(declarator_pair, file),
                });
            }
        }

        StructSpecifier {
            tag,
            members: if saw_body { Some(members) } else { None },
            span,
        }
    }
}
