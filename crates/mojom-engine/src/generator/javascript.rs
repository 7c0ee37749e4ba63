//! JavaScript bindings backend.
//!
//! Emits an AMD module `<module path>.js` that depends on the modules of
//! the file's imports.

use std::path::PathBuf;

use serde_json::{json, Value};

use crate::compiler::mojom::{DeclKind, Enum, Field, Kind, Module};
use crate::generator::{
    Backend, GenerateError, Generator, GeneratorContext, TemplateSet, TemplateSource,
};

const TEMPLATES: &[TemplateSource] = &[TemplateSource {
    name: "module.js.tmpl",
    source: include_str!("../../templates/js_templates/module.js.tmpl"),
}];

pub struct JavaScriptBackend;

impl Backend for JavaScriptBackend {
    fn name(&self) -> &str {
        "javascript"
    }

    fn template_prefix(&self) -> &str {
        "js_templates"
    }

    fn templates(&self) -> &[TemplateSource] {
        TEMPLATES
    }

    fn create(&self, context: GeneratorContext) -> Box<dyn Generator> {
        Box::new(JavaScriptGenerator { context })
    }
}

pub struct JavaScriptGenerator {
    context: GeneratorContext,
}

impl Generator for JavaScriptGenerator {
    fn generate_files(&mut self, _args: &[String]) -> Result<Vec<PathBuf>, GenerateError> {
        let templates = TemplateSet::load(
            &self.context.bytecode_path,
            JavaScriptBackend.template_prefix(),
            TEMPLATES,
        )?;
        let source = templates.render("module.js.tmpl", &module_context(&self.context.module))?;
        let path = self
            .context
            .write_file(&format!("{}.js", self.context.module.path), source.as_bytes())?;
        Ok(vec![path])
    }
}

fn module_context(module: &Module) -> Value {
    let mut exports: Vec<&str> = Vec::new();
    exports.extend(module.enums.iter().map(|e| e.name.as_str()));
    exports.extend(module.constants.iter().map(|c| c.name.as_str()));
    exports.extend(module.structs.iter().map(|s| s.name.as_str()));
    exports.extend(module.unions.iter().map(|u| u.name.as_str()));
    exports.extend(module.interfaces.iter().map(|i| i.name.as_str()));

    json!({
        "module_path": module.path,
        "imports": module.imports.iter().map(|import| json!({
            "path": import.module.path,
            "alias": import_alias(&import.module),
        })).collect::<Vec<_>>(),
        "enums": module.enums.iter().map(enum_context).collect::<Vec<_>>(),
        "constants": module.constants.iter().map(|c| json!({
            "name": c.name,
            "value": c.value,
        })).collect::<Vec<_>>(),
        "structs": module.structs.iter().map(|s| json!({
            "name": s.name,
            "struct": s.name,
            "enums": s.enums.iter().map(enum_context).collect::<Vec<_>>(),
            "fields": s.fields.iter().map(field_context).collect::<Vec<_>>(),
        })).collect::<Vec<_>>(),
        "unions": module.unions.iter().map(|u| json!({
            "name": u.name,
            "fields": u.fields.iter().enumerate().map(|(tag, f)| json!({
                "field": f.name,
                "tag": tag,
            })).collect::<Vec<_>>(),
        })).collect::<Vec<_>>(),
        "interfaces": module.interfaces.iter().map(|i| json!({
            "name": i.name,
            "qualified_name": qualified(&module.namespace, &i.name),
            "methods": i.methods.iter().map(|m| json!({
                "method": m.name,
                "ordinal": m.ordinal,
                "params": m.parameters.iter()
                    .map(|p| format!("'{}'", p.name))
                    .collect::<Vec<_>>()
                    .join(", "),
                "has_response": m.response_parameters.is_some(),
            })).collect::<Vec<_>>(),
        })).collect::<Vec<_>>(),
        "exports": exports,
    })
}

fn enum_context(e: &Enum) -> Value {
    json!({
        "name": e.name,
        "fields": e.fields.iter().map(|f| json!({
            "field": f.name,
            "value": f.numeric_value
                .map(|n| n.to_string())
                .or_else(|| f.value.clone())
                .unwrap_or_else(|| "undefined".to_string()),
        })).collect::<Vec<_>>(),
    })
}

fn field_context(field: &Field) -> Value {
    json!({
        "field": field.name,
        "default": field.default.clone().unwrap_or_else(|| default_value(&field.kind).to_string()),
    })
}

/// Initial value for a field without an explicit default.
fn default_value(kind: &Kind) -> &'static str {
    match kind {
        Kind::Bool => "false",
        Kind::Int8
        | Kind::Int16
        | Kind::Int32
        | Kind::Int64
        | Kind::Uint8
        | Kind::Uint16
        | Kind::Uint32
        | Kind::Uint64
        | Kind::Float
        | Kind::Double => "0",
        Kind::Reference(named) if named.category == Some(DeclKind::Enum) => "0",
        _ => "null",
    }
}

fn qualified(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", namespace, name)
    }
}

/// Parameter name under which an import is bound (`base$` for `base.mojom`).
fn import_alias(module: &Module) -> String {
    let stem: String = module
        .stem()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}$", stem)
}
