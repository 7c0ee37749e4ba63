//! Syntax tree for a single mojom file.

use std::fmt;

use crate::parser::token::Span;

/// A parsed mojom file.
#[derive(Debug, Clone, PartialEq)]
pub struct MojomFile {
    /// Label the file was parsed under (used in diagnostics)
    pub filename: String,
    /// `module a.b.c;` declaration, if present
    pub module: Option<ModuleDecl>,
    /// Import declarations, in source order
    pub imports: Vec<ImportDecl>,
    /// Top-level definitions, in source order
    pub definitions: Vec<Definition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDecl {
    pub attributes: Vec<Attribute>,
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub filename: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub key: String,
    pub value: Option<Literal>,
}

/// Literal values used by constants, defaults, enum values and attributes.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    Default,
    /// Reference to another constant or enum value
    Name(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(n) => write!(f, "{}", n),
            Literal::Float(n) => write!(f, "{}", n),
            Literal::String(s) => write!(f, "\"{}\"", s),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Default => write!(f, "default"),
            Literal::Name(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Struct(StructDecl),
    Union(UnionDecl),
    Enum(EnumDecl),
    Interface(InterfaceDecl),
    Const(ConstDecl),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructDecl {
    pub attributes: Vec<Attribute>,
    pub name: String,
    pub fields: Vec<FieldDecl>,
    pub enums: Vec<EnumDecl>,
    pub constants: Vec<ConstDecl>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnionDecl {
    pub attributes: Vec<Attribute>,
    pub name: String,
    pub fields: Vec<FieldDecl>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub attributes: Vec<Attribute>,
    pub typename: TypeRef,
    pub name: String,
    pub ordinal: Option<u32>,
    pub default: Option<Literal>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub attributes: Vec<Attribute>,
    pub name: String,
    pub values: Vec<EnumValueDecl>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValueDecl {
    pub attributes: Vec<Attribute>,
    pub name: String,
    pub value: Option<Literal>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDecl {
    pub attributes: Vec<Attribute>,
    pub name: String,
    pub methods: Vec<MethodDecl>,
    pub enums: Vec<EnumDecl>,
    pub constants: Vec<ConstDecl>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub attributes: Vec<Attribute>,
    pub name: String,
    pub ordinal: Option<u32>,
    pub parameters: Vec<ParameterDecl>,
    /// `None` for fire-and-forget methods, `Some` when `=> (...)` is present
    pub response: Option<Vec<ParameterDecl>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDecl {
    pub attributes: Vec<Attribute>,
    pub typename: TypeRef,
    pub name: String,
    pub ordinal: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstDecl {
    pub attributes: Vec<Attribute>,
    pub typename: TypeRef,
    pub name: String,
    pub value: Literal,
}

/// A type as written in source.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    /// Builtin scalar or user type name, possibly dotted
    Named(String),
    Array {
        element: Box<TypeRef>,
        fixed_size: Option<u64>,
    },
    Map {
        key: Box<TypeRef>,
        value: Box<TypeRef>,
    },
    /// `handle` or `handle<kind>`
    Handle(Option<String>),
    /// `Interface&`
    InterfaceRequest(String),
    /// `associated T`
    Associated(Box<TypeRef>),
    Nullable(Box<TypeRef>),
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => write!(f, "{}", name),
            TypeRef::Array {
                element,
                fixed_size: Some(size),
            } => write!(f, "array<{}, {}>", element, size),
            TypeRef::Array { element, .. } => write!(f, "array<{}>", element),
            TypeRef::Map { key, value } => write!(f, "map<{}, {}>", key, value),
            TypeRef::Handle(Some(kind)) => write!(f, "handle<{}>", kind),
            TypeRef::Handle(None) => write!(f, "handle"),
            TypeRef::InterfaceRequest(name) => write!(f, "{}&", name),
            TypeRef::Associated(inner) => write!(f, "associated {}", inner),
            TypeRef::Nullable(inner) => write!(f, "{}?", inner),
        }
    }
}
