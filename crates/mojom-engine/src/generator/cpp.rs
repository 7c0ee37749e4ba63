//! C++ bindings backend.
//!
//! Emits one header per module: `<module path>[-<variant>].h`.

use std::path::PathBuf;

use serde_json::{json, Value};

use crate::compiler::mojom::{DeclKind, Enum, Field, Kind, Method, Module, NamedKind};
use crate::generator::{
    Backend, GenerateError, Generator, GeneratorContext, TemplateSet, TemplateSource,
};

const TEMPLATES: &[TemplateSource] = &[TemplateSource {
    name: "module.h.tmpl",
    source: include_str!("../../templates/cpp_templates/module.h.tmpl"),
}];

pub struct CppBackend;

impl Backend for CppBackend {
    fn name(&self) -> &str {
        "c++"
    }

    fn flag_prefix(&self) -> Option<&str> {
        Some("cpp")
    }

    fn template_prefix(&self) -> &str {
        "cpp_templates"
    }

    fn templates(&self) -> &[TemplateSource] {
        TEMPLATES
    }

    fn create(&self, context: GeneratorContext) -> Box<dyn Generator> {
        Box::new(CppGenerator { context })
    }
}

pub struct CppGenerator {
    context: GeneratorContext,
}

impl Generator for CppGenerator {
    fn generate_files(&mut self, _args: &[String]) -> Result<Vec<PathBuf>, GenerateError> {
        let templates = TemplateSet::load(
            &self.context.bytecode_path,
            CppBackend.template_prefix(),
            TEMPLATES,
        )?;
        let header = templates.render("module.h.tmpl", &self.module_context())?;
        let path = self
            .context
            .write_file(&self.context.output_name(".h"), header.as_bytes())?;
        Ok(vec![path])
    }
}

/// Which family of wrapper types string, array and map kinds map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wrappers {
    Mojo,
    Std,
    Blink,
}

impl CppGenerator {
    fn wrappers(&self) -> Wrappers {
        match (self.context.use_new_wrapper_types, self.context.for_blink) {
            (false, _) => Wrappers::Mojo,
            (true, false) => Wrappers::Std,
            (true, true) => Wrappers::Blink,
        }
    }

    fn namespace(&self, namespace: &str) -> String {
        let mut parts: Vec<&str> = namespace.split('.').filter(|p| !p.is_empty()).collect();
        if let Some(variant) = &self.context.variant {
            parts.push(variant);
        }
        parts.join("::")
    }

    fn qualified(&self, named: &NamedKind, suffix: &str) -> String {
        match named.namespace.as_deref() {
            Some(ns) if !ns.is_empty() => {
                format!("{}::{}{}", self.namespace(ns), named.name.replace('.', "::"), suffix)
            }
            _ => format!("{}{}", named.name.replace('.', "::"), suffix),
        }
    }

    /// C++ type for a kind. Type-map entries override named kinds.
    fn cpp_type(&self, kind: &Kind) -> String {
        let wrappers = self.wrappers();
        match kind {
            Kind::Bool => "bool".to_string(),
            Kind::Int8 => "int8_t".to_string(),
            Kind::Int16 => "int16_t".to_string(),
            Kind::Int32 => "int32_t".to_string(),
            Kind::Int64 => "int64_t".to_string(),
            Kind::Uint8 => "uint8_t".to_string(),
            Kind::Uint16 => "uint16_t".to_string(),
            Kind::Uint32 => "uint32_t".to_string(),
            Kind::Uint64 => "uint64_t".to_string(),
            Kind::Float => "float".to_string(),
            Kind::Double => "double".to_string(),
            Kind::String => match wrappers {
                Wrappers::Mojo => "mojo::String",
                Wrappers::Std => "std::string",
                Wrappers::Blink => "WTF::String",
            }
            .to_string(),
            Kind::Handle(kind) => handle_type(kind.as_deref()).to_string(),
            Kind::Array { element, .. } => {
                let element = self.cpp_type(element);
                match wrappers {
                    Wrappers::Mojo => format!("mojo::Array<{}>", element),
                    Wrappers::Std => format!("std::vector<{}>", element),
                    Wrappers::Blink => format!("WTF::Vector<{}>", element),
                }
            }
            Kind::Map { key, value } => {
                let (key, value) = (self.cpp_type(key), self.cpp_type(value));
                match wrappers {
                    Wrappers::Mojo => format!("mojo::Map<{}, {}>", key, value),
                    Wrappers::Std => format!("std::unordered_map<{}, {}>", key, value),
                    Wrappers::Blink => format!("WTF::HashMap<{}, {}>", key, value),
                }
            }
            Kind::Reference(named) => {
                if let Some(mapped) = self.context.typemap.get(&named.qualified_name()) {
                    return mapped.clone();
                }
                match named.category {
                    Some(DeclKind::Struct) | Some(DeclKind::Union) | Some(DeclKind::Interface) => {
                        self.qualified(named, "Ptr")
                    }
                    _ => self.qualified(named, ""),
                }
            }
            Kind::InterfaceRequest(named) => self.qualified(named, "Request"),
            Kind::Associated(inner) => match inner.as_ref() {
                Kind::InterfaceRequest(named) => self.qualified(named, "AssociatedRequest"),
                Kind::Reference(named) => self.qualified(named, "AssociatedPtrInfo"),
                other => self.cpp_type(other),
            },
            Kind::Nullable(inner) => {
                let inner_type = self.cpp_type(inner);
                let needs_optional = wrappers != Wrappers::Mojo
                    && matches!(
                        inner.as_ref(),
                        Kind::String | Kind::Array { .. } | Kind::Map { .. }
                    );
                if needs_optional {
                    format!("base::Optional<{}>", inner_type)
                } else {
                    inner_type
                }
            }
        }
    }

    fn enum_context(&self, e: &Enum) -> Value {
        json!({
            "name": e.name,
            "fields": e.fields.iter().map(|f| json!({
                "field": f.name,
                "value": f.numeric_value.map(|n| n.to_string()).or_else(|| f.value.clone()),
            })).collect::<Vec<_>>(),
        })
    }

    fn field_context(&self, field: &Field) -> Value {
        json!({
            "field": field.name,
            "type": self.cpp_type(&field.kind),
            "tag": field.name.to_uppercase(),
            "default": field.default.as_ref().filter(|_| is_scalar(&field.kind)),
        })
    }

    fn method_context(&self, method: &Method) -> Value {
        let mut params: Vec<String> = method
            .parameters
            .iter()
            .map(|p| format!("{} {}", self.cpp_type(&p.kind), p.name))
            .collect();
        let response_signature = method.response_parameters.as_ref().map(|response| {
            response
                .iter()
                .map(|p| self.cpp_type(&p.kind))
                .collect::<Vec<_>>()
                .join(", ")
        });
        if response_signature.is_some() {
            params.push(format!("const {}Callback& callback", method.name));
        }
        json!({
            "method": method.name,
            "ordinal": method.ordinal,
            "signature": params.join(", "),
            "has_response": response_signature.is_some(),
            "response_signature": response_signature,
        })
    }

    fn module_context(&self) -> Value {
        let module: &Module = &self.context.module;
        let namespace = self.namespace(&module.namespace);
        let namespaces: Vec<&str> = namespace.split("::").filter(|p| !p.is_empty()).collect();
        let mut namespaces_reversed = namespaces.clone();
        namespaces_reversed.reverse();

        let constants = |constants: &[crate::compiler::mojom::Constant]| {
            constants
                .iter()
                .map(|c| {
                    let ty = match c.kind {
                        Kind::String => "const char*".to_string(),
                        ref other => self.cpp_type(other),
                    };
                    json!({ "type": ty, "name": c.name, "value": c.value })
                })
                .collect::<Vec<_>>()
        };

        json!({
            "module_path": module.path,
            "guard": self.guard(),
            "use_std_types": self.wrappers() == Wrappers::Std,
            "for_blink": self.wrappers() == Wrappers::Blink,
            "includes": module.imports.iter().map(|import| {
                self.context.output_name_for(&import.module.path, ".h")
            }).collect::<Vec<_>>(),
            "namespaces": namespaces,
            "namespaces_reversed": namespaces_reversed,
            "enums": module.enums.iter().map(|e| self.enum_context(e)).collect::<Vec<_>>(),
            "constants": constants(&module.constants),
            "structs": module.structs.iter().map(|s| json!({
                "name": s.name,
                "enums": s.enums.iter().map(|e| self.enum_context(e)).collect::<Vec<_>>(),
                "constants": constants(&s.constants),
                "fields": s.fields.iter().map(|f| self.field_context(f)).collect::<Vec<_>>(),
            })).collect::<Vec<_>>(),
            "unions": module.unions.iter().map(|u| json!({
                "name": u.name,
                "fields": u.fields.iter().map(|f| self.field_context(f)).collect::<Vec<_>>(),
            })).collect::<Vec<_>>(),
            "interfaces": module.interfaces.iter().map(|i| json!({
                "name": i.name,
                "enums": i.enums.iter().map(|e| self.enum_context(e)).collect::<Vec<_>>(),
                "constants": constants(&i.constants),
                "methods": i.methods.iter().map(|m| self.method_context(m)).collect::<Vec<_>>(),
            })).collect::<Vec<_>>(),
        })
    }

    fn guard(&self) -> String {
        let mut guard: String = self
            .context
            .output_name(".h")
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect();
        guard.push('_');
        guard
    }
}

fn handle_type(kind: Option<&str>) -> &'static str {
    match kind {
        Some("message_pipe") => "mojo::ScopedMessagePipeHandle",
        Some("data_pipe_consumer") => "mojo::ScopedDataPipeConsumerHandle",
        Some("data_pipe_producer") => "mojo::ScopedDataPipeProducerHandle",
        Some("shared_buffer") => "mojo::ScopedSharedBufferHandle",
        _ => "mojo::ScopedHandle",
    }
}

fn is_scalar(kind: &Kind) -> bool {
    matches!(
        kind,
        Kind::Bool
            | Kind::Int8
            | Kind::Int16
            | Kind::Int32
            | Kind::Int64
            | Kind::Uint8
            | Kind::Uint16
            | Kind::Uint32
            | Kind::Uint64
            | Kind::Float
            | Kind::Double
    )
}
