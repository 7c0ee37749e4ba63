//! Syntax tree to intermediate form.

use crate::compiler::ir::*;
use crate::compiler::mojom::Attribute;
use crate::parser::ast::{self, Definition, Literal, MojomFile};

/// Translate a parsed file into its intermediate form.
///
/// `name` is the file's base name; the tree is assumed well-formed.
pub fn translate(tree: &MojomFile, name: &str) -> MojomData {
    let mut data = MojomData {
        name: name.to_string(),
        namespace: tree
            .module
            .as_ref()
            .map(|m| m.name.clone())
            .unwrap_or_default(),
        attributes: tree
            .module
            .as_ref()
            .map(|m| attributes(&m.attributes))
            .unwrap_or_default(),
        imports: tree
            .imports
            .iter()
            .map(|import| ImportData {
                filename: import.filename.clone(),
                module: None,
            })
            .collect(),
        structs: Vec::new(),
        unions: Vec::new(),
        enums: Vec::new(),
        interfaces: Vec::new(),
        constants: Vec::new(),
    };

    for definition in &tree.definitions {
        match definition {
            Definition::Struct(decl) => data.structs.push(StructData {
                name: decl.name.clone(),
                fields: decl.fields.iter().map(field).collect(),
                enums: decl.enums.iter().map(enumeration).collect(),
                constants: decl.constants.iter().map(constant).collect(),
                attributes: attributes(&decl.attributes),
            }),
            Definition::Union(decl) => data.unions.push(UnionData {
                name: decl.name.clone(),
                fields: decl.fields.iter().map(field).collect(),
                attributes: attributes(&decl.attributes),
            }),
            Definition::Enum(decl) => data.enums.push(enumeration(decl)),
            Definition::Interface(decl) => data.interfaces.push(InterfaceData {
                name: decl.name.clone(),
                methods: decl.methods.iter().map(method).collect(),
                enums: decl.enums.iter().map(enumeration).collect(),
                constants: decl.constants.iter().map(constant).collect(),
                attributes: attributes(&decl.attributes),
            }),
            Definition::Const(decl) => data.constants.push(constant(decl)),
        }
    }

    data
}

fn attributes(attrs: &[ast::Attribute]) -> Vec<Attribute> {
    attrs
        .iter()
        .map(|attr| Attribute {
            key: attr.key.clone(),
            value: attr.value.as_ref().map(literal_text),
        })
        .collect()
}

/// Attribute values and defaults are carried as text; strings lose their quotes.
fn literal_text(literal: &Literal) -> String {
    match literal {
        Literal::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn field(decl: &ast::FieldDecl) -> FieldData {
    FieldData {
        name: decl.name.clone(),
        kind: decl.typename.clone(),
        ordinal: decl.ordinal,
        default: decl.default.as_ref().map(Literal::to_string),
        attributes: attributes(&decl.attributes),
    }
}

fn enumeration(decl: &ast::EnumDecl) -> EnumData {
    EnumData {
        name: decl.name.clone(),
        values: decl
            .values
            .iter()
            .map(|value| EnumValueData {
                name: value.name.clone(),
                value: value.value.as_ref().map(|literal| match literal {
                    Literal::Int(n) => EnumValue::Number(*n),
                    other => EnumValue::Name(literal_text(other)),
                }),
                attributes: attributes(&value.attributes),
            })
            .collect(),
        attributes: attributes(&decl.attributes),
    }
}

fn parameter(decl: &ast::ParameterDecl) -> ParameterData {
    ParameterData {
        name: decl.name.clone(),
        kind: decl.typename.clone(),
        ordinal: decl.ordinal,
    }
}

fn method(decl: &ast::MethodDecl) -> MethodData {
    MethodData {
        name: decl.name.clone(),
        ordinal: decl.ordinal,
        parameters: decl.parameters.iter().map(parameter).collect(),
        response_parameters: decl
            .response
            .as_ref()
            .map(|params| params.iter().map(parameter).collect()),
        attributes: attributes(&decl.attributes),
    }
}

fn constant(decl: &ast::ConstDecl) -> ConstantData {
    ConstantData {
        name: decl.name.clone(),
        kind: decl.typename.clone(),
        value: decl.value.to_string(),
    }
}
