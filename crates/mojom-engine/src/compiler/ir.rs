//! Intermediate form produced by the translator.
//!
//! Flat, declaration-ordered data for one file. Import entries start out
//! empty and are filled with built modules before module construction.

use std::sync::Arc;

use crate::compiler::mojom::{Attribute, Module};
use crate::parser::ast::TypeRef;

#[derive(Debug, Clone, PartialEq)]
pub struct MojomData {
    /// File base name (`foo.mojom`)
    pub name: String,
    pub namespace: String,
    pub attributes: Vec<Attribute>,
    pub imports: Vec<ImportData>,
    pub structs: Vec<StructData>,
    pub unions: Vec<UnionData>,
    pub enums: Vec<EnumData>,
    pub interfaces: Vec<InterfaceData>,
    pub constants: Vec<ConstantData>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportData {
    pub filename: String,
    /// Filled by the module builder once the import is built
    pub module: Option<Arc<Module>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldData {
    pub name: String,
    pub kind: TypeRef,
    pub ordinal: Option<u32>,
    pub default: Option<String>,
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructData {
    pub name: String,
    pub fields: Vec<FieldData>,
    pub enums: Vec<EnumData>,
    pub constants: Vec<ConstantData>,
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnionData {
    pub name: String,
    pub fields: Vec<FieldData>,
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValueData {
    pub name: String,
    pub value: Option<EnumValue>,
    pub attributes: Vec<Attribute>,
}

/// Explicit enum value: a number or a reference to a name.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumValue {
    Number(i64),
    Name(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumData {
    pub name: String,
    pub values: Vec<EnumValueData>,
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterData {
    pub name: String,
    pub kind: TypeRef,
    pub ordinal: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodData {
    pub name: String,
    pub ordinal: Option<u32>,
    pub parameters: Vec<ParameterData>,
    pub response_parameters: Option<Vec<ParameterData>>,
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceData {
    pub name: String,
    pub methods: Vec<MethodData>,
    pub enums: Vec<EnumData>,
    pub constants: Vec<ConstantData>,
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstantData {
    pub name: String,
    pub kind: TypeRef,
    pub value: String,
}
