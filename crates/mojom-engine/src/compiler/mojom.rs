//! Fully-linked module representation handed to generators.
//!
//! A [`Module`] is immutable once cached. Imported modules are shared by
//! reference (`Arc`), never copied, so every importer and every generator
//! observes the same instance.

use std::fmt;
use std::sync::Arc;

/// `[Key=Value]` attribute attached to a declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub key: String,
    pub value: Option<String>,
}

/// Category of a user-declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Struct,
    Union,
    Enum,
    Interface,
}

/// Reference to a user-declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedKind {
    /// Unqualified name (`Outer.Inner` for nested enums)
    pub name: String,
    /// Namespace of the defining module, `None` when unresolved
    pub namespace: Option<String>,
    /// What the name refers to, `None` when unresolved
    pub category: Option<DeclKind>,
}

impl NamedKind {
    /// `namespace.Name`, or just the name when the namespace is empty or unknown.
    pub fn qualified_name(&self) -> String {
        match self.namespace.as_deref() {
            Some(ns) if !ns.is_empty() => format!("{}.{}", ns, self.name),
            _ => self.name.clone(),
        }
    }
}

/// Resolved type of a field, parameter or constant.
#[derive(Debug, Clone, PartialEq)]
pub enum Kind {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float,
    Double,
    String,
    Handle(Option<String>),
    Array {
        element: Box<Kind>,
        length: Option<u64>,
    },
    Map {
        key: Box<Kind>,
        value: Box<Kind>,
    },
    Reference(NamedKind),
    InterfaceRequest(NamedKind),
    Associated(Box<Kind>),
    Nullable(Box<Kind>),
}

impl Kind {
    /// Builtin scalar for `name`, if it is one.
    pub fn builtin(name: &str) -> Option<Kind> {
        let kind = match name {
            "bool" => Kind::Bool,
            "int8" => Kind::Int8,
            "int16" => Kind::Int16,
            "int32" => Kind::Int32,
            "int64" => Kind::Int64,
            "uint8" => Kind::Uint8,
            "uint16" => Kind::Uint16,
            "uint32" => Kind::Uint32,
            "uint64" => Kind::Uint64,
            "float" => Kind::Float,
            "double" => Kind::Double,
            "string" => Kind::String,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, Kind::Nullable(_))
    }

    /// The kind with any nullable wrapper removed.
    pub fn non_nullable(&self) -> &Kind {
        match self {
            Kind::Nullable(inner) => inner,
            other => other,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Bool => write!(f, "bool"),
            Kind::Int8 => write!(f, "int8"),
            Kind::Int16 => write!(f, "int16"),
            Kind::Int32 => write!(f, "int32"),
            Kind::Int64 => write!(f, "int64"),
            Kind::Uint8 => write!(f, "uint8"),
            Kind::Uint16 => write!(f, "uint16"),
            Kind::Uint32 => write!(f, "uint32"),
            Kind::Uint64 => write!(f, "uint64"),
            Kind::Float => write!(f, "float"),
            Kind::Double => write!(f, "double"),
            Kind::String => write!(f, "string"),
            Kind::Handle(Some(kind)) => write!(f, "handle<{}>", kind),
            Kind::Handle(None) => write!(f, "handle"),
            Kind::Array {
                element,
                length: Some(n),
            } => write!(f, "array<{}, {}>", element, n),
            Kind::Array { element, .. } => write!(f, "array<{}>", element),
            Kind::Map { key, value } => write!(f, "map<{}, {}>", key, value),
            Kind::Reference(named) => write!(f, "{}", named.qualified_name()),
            Kind::InterfaceRequest(named) => write!(f, "{}&", named.qualified_name()),
            Kind::Associated(inner) => write!(f, "associated {}", inner),
            Kind::Nullable(inner) => write!(f, "{}?", inner),
        }
    }
}

/// Struct or union member.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub kind: Kind,
    pub ordinal: Option<u32>,
    pub default: Option<String>,
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Struct {
    pub name: String,
    pub fields: Vec<Field>,
    pub enums: Vec<Enum>,
    pub constants: Vec<Constant>,
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Union {
    pub name: String,
    pub fields: Vec<Field>,
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumField {
    pub name: String,
    /// Value as written in source
    pub value: Option<String>,
    /// Computed numeric value; `None` when it depends on something unresolvable
    pub numeric_value: Option<i64>,
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enum {
    pub name: String,
    pub fields: Vec<EnumField>,
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub kind: Kind,
    pub ordinal: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: String,
    /// Explicit ordinal, or one past the previous method's
    pub ordinal: u32,
    pub parameters: Vec<Parameter>,
    pub response_parameters: Option<Vec<Parameter>>,
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Interface {
    pub name: String,
    pub methods: Vec<Method>,
    pub enums: Vec<Enum>,
    pub constants: Vec<Constant>,
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    pub name: String,
    pub kind: Kind,
    pub value: String,
}

/// An import entry with the already-built imported module.
#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    /// File name exactly as written in the import statement
    pub filename: String,
    pub module: Arc<Module>,
}

/// Fully-linked representation of one mojom file.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    /// Source-root-relative path with `/` separators
    pub path: String,
    /// File base name (`foo.mojom`)
    pub name: String,
    /// `module` statement value, empty when absent
    pub namespace: String,
    pub attributes: Vec<Attribute>,
    pub imports: Vec<Import>,
    pub structs: Vec<Struct>,
    pub unions: Vec<Union>,
    pub enums: Vec<Enum>,
    pub interfaces: Vec<Interface>,
    pub constants: Vec<Constant>,
}

impl Module {
    /// Category of a type declared at this module's top level, including
    /// enums nested in structs and interfaces (`Outer.Inner`).
    pub fn declared_kind(&self, name: &str) -> Option<DeclKind> {
        if self.structs.iter().any(|s| s.name == name) {
            return Some(DeclKind::Struct);
        }
        if self.unions.iter().any(|u| u.name == name) {
            return Some(DeclKind::Union);
        }
        if self.interfaces.iter().any(|i| i.name == name) {
            return Some(DeclKind::Interface);
        }
        if self.enums.iter().any(|e| e.name == name) {
            return Some(DeclKind::Enum);
        }
        let (outer, inner) = name.split_once('.')?;
        let nested = self
            .structs
            .iter()
            .filter(|s| s.name == outer)
            .flat_map(|s| s.enums.iter())
            .chain(
                self.interfaces
                    .iter()
                    .filter(|i| i.name == outer)
                    .flat_map(|i| i.enums.iter()),
            )
            .any(|e| e.name == inner);
        nested.then_some(DeclKind::Enum)
    }

    /// The module's file name without its `.mojom` extension.
    pub fn stem(&self) -> &str {
        self.name.strip_suffix(".mojom").unwrap_or(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_module(namespace: &str) -> Module {
        Module {
            path: "test.mojom".to_string(),
            name: "test.mojom".to_string(),
            namespace: namespace.to_string(),
            attributes: Vec::new(),
            imports: Vec::new(),
            structs: Vec::new(),
            unions: Vec::new(),
            enums: Vec::new(),
            interfaces: Vec::new(),
            constants: Vec::new(),
        }
    }

    #[test]
    fn test_declared_kind_nested_enum() {
        let mut module = empty_module("demo");
        module.structs.push(Struct {
            name: "Outer".to_string(),
            fields: Vec::new(),
            enums: vec![Enum {
                name: "Mode".to_string(),
                fields: Vec::new(),
                attributes: Vec::new(),
            }],
            constants: Vec::new(),
            attributes: Vec::new(),
        });

        assert_eq!(module.declared_kind("Outer"), Some(DeclKind::Struct));
        assert_eq!(module.declared_kind("Outer.Mode"), Some(DeclKind::Enum));
        assert_eq!(module.declared_kind("Outer.Other"), None);
        assert_eq!(module.declared_kind("Missing"), None);
    }

    #[test]
    fn test_kind_display_uses_qualified_names() {
        let kind = Kind::Nullable(Box::new(Kind::Array {
            element: Box::new(Kind::Reference(NamedKind {
                name: "Point".to_string(),
                namespace: Some("geo".to_string()),
                category: Some(DeclKind::Struct),
            })),
            length: None,
        }));
        assert_eq!(kind.to_string(), "array<geo.Point>?");
        assert!(kind.is_nullable());
        assert!(matches!(kind.non_nullable(), Kind::Array { .. }));
    }

    #[test]
    fn test_stem() {
        assert_eq!(empty_module("").stem(), "test");
    }
}
