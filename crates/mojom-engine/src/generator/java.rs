//! Java bindings backend.
//!
//! Renders one class per declaration and packs them into
//! `<module path>.srcjar`. With `--java_output_directory=DIR` the same
//! sources are also written unpacked under `DIR/<package path>/`.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde_json::{json, Value};

use crate::compiler::mojom::{Constant, DeclKind, Enum, Field, Kind, Module, NamedKind};
use crate::generator::{
    write_file, Backend, GenerateError, Generator, GeneratorContext, TemplateSet, TemplateSource,
};

const TEMPLATES: &[TemplateSource] = &[
    TemplateSource {
        name: "struct.java.tmpl",
        source: include_str!("../../templates/java_templates/struct.java.tmpl"),
    },
    TemplateSource {
        name: "union.java.tmpl",
        source: include_str!("../../templates/java_templates/union.java.tmpl"),
    },
    TemplateSource {
        name: "enum.java.tmpl",
        source: include_str!("../../templates/java_templates/enum.java.tmpl"),
    },
    TemplateSource {
        name: "interface.java.tmpl",
        source: include_str!("../../templates/java_templates/interface.java.tmpl"),
    },
    TemplateSource {
        name: "interface_internal.java.tmpl",
        source: include_str!("../../templates/java_templates/interface_internal.java.tmpl"),
    },
    TemplateSource {
        name: "constants.java.tmpl",
        source: include_str!("../../templates/java_templates/constants.java.tmpl"),
    },
];

pub struct JavaBackend;

impl Backend for JavaBackend {
    fn name(&self) -> &str {
        "java"
    }

    fn flag_prefix(&self) -> Option<&str> {
        Some("java")
    }

    fn template_prefix(&self) -> &str {
        "java_templates"
    }

    fn templates(&self) -> &[TemplateSource] {
        TEMPLATES
    }

    fn create(&self, context: GeneratorContext) -> Box<dyn Generator> {
        Box::new(JavaGenerator { context })
    }
}

/// Flags accepted by the Java backend.
#[derive(Debug, Parser)]
#[command(no_binary_name = true)]
struct JavaArgs {
    /// Also write the sources unpacked into this directory
    #[arg(long = "java_output_directory")]
    java_output_directory: Option<PathBuf>,
}

pub struct JavaGenerator {
    context: GeneratorContext,
}

/// A rendered source file: path inside the package directory and content.
struct JavaSource {
    file_name: String,
    content: String,
}

impl Generator for JavaGenerator {
    fn generate_files(&mut self, args: &[String]) -> Result<Vec<PathBuf>, GenerateError> {
        if self.context.variant.is_some() {
            return Err(GenerateError::Unsupported(
                "Variants not supported in Java bindings.".to_string(),
            ));
        }
        let args = JavaArgs::try_parse_from(args)
            .map_err(|e| GenerateError::InvalidArguments(e.to_string()))?;

        let sources = self.render_sources()?;
        let package_path = package(&self.context.module).replace('.', "/");

        let srcjar = self
            .context
            .output_dir
            .join(format!("{}.srcjar", self.context.module.path));
        write_srcjar(&srcjar, &package_path, &sources)?;
        tracing::info!("wrote {}", srcjar.display());
        let mut written = vec![srcjar];

        if let Some(directory) = args.java_output_directory {
            let directory = directory.join(&package_path);
            for source in &sources {
                written.push(write_file(
                    &directory.join(&source.file_name),
                    source.content.as_bytes(),
                )?);
            }
        }
        Ok(written)
    }
}

impl JavaGenerator {
    fn render_sources(&self) -> Result<Vec<JavaSource>, GenerateError> {
        let templates = TemplateSet::load(
            &self.context.bytecode_path,
            JavaBackend.template_prefix(),
            TEMPLATES,
        )?;
        let module: &Module = &self.context.module;
        let mut sources = Vec::new();
        let mut render = |template: &str, name: &str, mut context: Value| {
            if let Some(object) = context.as_object_mut() {
                object.insert("module_path".to_string(), json!(module.path));
                object.insert("package".to_string(), json!(package(module)));
            }
            let content = templates.render(template, &context)?;
            sources.push(JavaSource {
                file_name: format!("{}.java", name),
                content,
            });
            Ok::<_, GenerateError>(())
        };

        for s in &module.structs {
            render(
                "struct.java.tmpl",
                &s.name,
                json!({
                    "name": s.name,
                    "enums": s.enums.iter().map(enum_context).collect::<Vec<_>>(),
                    "constants": s.constants.iter().map(|c| self.constant_context(c)).collect::<Vec<_>>(),
                    "fields": s.fields.iter().map(|f| self.field_context(f)).collect::<Vec<_>>(),
                }),
            )?;
        }
        for u in &module.unions {
            render(
                "union.java.tmpl",
                &u.name,
                json!({
                    "name": u.name,
                    "fields": u.fields.iter().enumerate().map(|(tag, f)| json!({
                        "field": lower_camel(&f.name),
                        "accessor": upper_camel(&f.name),
                        "type": self.java_type(&f.kind, false),
                        "tag": tag,
                    })).collect::<Vec<_>>(),
                }),
            )?;
        }
        for e in &module.enums {
            render("enum.java.tmpl", &e.name, enum_context(e))?;
        }
        for i in &module.interfaces {
            let methods: Vec<Value> = i
                .methods
                .iter()
                .map(|m| {
                    let mut params: Vec<String> = m
                        .parameters
                        .iter()
                        .map(|p| format!("{} {}", self.java_type(&p.kind, false), lower_camel(&p.name)))
                        .collect();
                    let response_name = format!("{}Response", upper_camel(&m.name));
                    let callback_arity = m.response_parameters.as_ref().map(|response| {
                        let boxed: Vec<String> =
                            response.iter().map(|p| self.java_type(&p.kind, true)).collect();
                        if boxed.is_empty() {
                            "Callback0".to_string()
                        } else {
                            format!("Callback{}<{}>", boxed.len(), boxed.join(", "))
                        }
                    });
                    if callback_arity.is_some() {
                        params.push(format!("{} callback", response_name));
                    }
                    json!({
                        "method": lower_camel(&m.name),
                        "ordinal": m.ordinal,
                        "ordinal_name": format!("{}_ORDINAL", constant_case(&m.name)),
                        "signature": params.join(", "),
                        "has_response": callback_arity.is_some(),
                        "response_name": response_name,
                        "callback_arity": callback_arity,
                    })
                })
                .collect();
            let context = json!({
                "name": i.name,
                "qualified_name": qualified(&module.namespace, &i.name),
                "methods": methods,
            });
            render("interface.java.tmpl", &i.name, context.clone())?;
            render(
                "interface_internal.java.tmpl",
                &format!("{}_Internal", i.name),
                context,
            )?;
        }
        if !module.constants.is_empty() {
            let name = format!("{}Constants", upper_camel(module.stem()));
            render(
                "constants.java.tmpl",
                &name,
                json!({
                    "name": name,
                    "constants": module.constants.iter().map(|c| {
                        let mut value = self.constant_context(c);
                        if let Some(object) = value.as_object_mut() {
                            if let Some(name) = object.remove("name") {
                                object.insert("constant".to_string(), name);
                            }
                        }
                        value
                    }).collect::<Vec<_>>(),
                }),
            )?;
        }
        Ok(sources)
    }

    /// Java type for a kind; `boxed` selects reference types for generics.
    fn java_type(&self, kind: &Kind, boxed: bool) -> String {
        let primitive = |unboxed: &str, boxed_name: &str| {
            (if boxed { boxed_name } else { unboxed }).to_string()
        };
        match kind {
            Kind::Bool => primitive("boolean", "Boolean"),
            Kind::Int8 | Kind::Uint8 => primitive("byte", "Byte"),
            Kind::Int16 | Kind::Uint16 => primitive("short", "Short"),
            Kind::Int32 | Kind::Uint32 => primitive("int", "Integer"),
            Kind::Int64 | Kind::Uint64 => primitive("long", "Long"),
            Kind::Float => primitive("float", "Float"),
            Kind::Double => primitive("double", "Double"),
            Kind::String => "String".to_string(),
            Kind::Handle(kind) => match kind.as_deref() {
                Some("message_pipe") => "org.chromium.mojo.system.MessagePipeHandle",
                Some("data_pipe_consumer") => "org.chromium.mojo.system.DataPipe.ConsumerHandle",
                Some("data_pipe_producer") => "org.chromium.mojo.system.DataPipe.ProducerHandle",
                Some("shared_buffer") => "org.chromium.mojo.system.SharedBufferHandle",
                _ => "org.chromium.mojo.system.UntypedHandle",
            }
            .to_string(),
            Kind::Array { element, .. } => format!("{}[]", self.java_type(element, false)),
            Kind::Map { key, value } => format!(
                "java.util.Map<{}, {}>",
                self.java_type(key, true),
                self.java_type(value, true)
            ),
            Kind::Reference(named) => {
                if let Some(mapped) = self.context.typemap.get(&named.qualified_name()) {
                    return mapped.clone();
                }
                if named.category == Some(DeclKind::Enum) {
                    return primitive("int", "Integer");
                }
                self.class_name(named)
            }
            Kind::InterfaceRequest(named) => format!(
                "org.chromium.mojo.bindings.InterfaceRequest<{}>",
                self.class_name(named)
            ),
            Kind::Associated(_) => {
                "org.chromium.mojo.bindings.AssociatedInterfaceNotSupported".to_string()
            }
            Kind::Nullable(inner) => self.java_type(inner, boxed),
        }
    }

    /// Fully-qualified class name of a declared type.
    fn class_name(&self, named: &NamedKind) -> String {
        let module = &self.context.module;
        let package = match named.namespace.as_deref() {
            Some(ns) if ns == module.namespace => package(module),
            Some(ns) => module
                .imports
                .iter()
                .map(|import| &import.module)
                .find(|m| m.namespace == ns)
                .map(|m| package(m))
                .unwrap_or_else(|| ns.to_string()),
            None => String::new(),
        };
        if package.is_empty() {
            named.name.clone()
        } else {
            format!("{}.{}", package, named.name)
        }
    }

    fn field_context(&self, field: &Field) -> Value {
        json!({
            "field": lower_camel(&field.name),
            "type": self.java_type(&field.kind, false),
            "default": field.default.as_ref().map(|d| java_literal(d, &field.kind)),
        })
    }

    fn constant_context(&self, constant: &Constant) -> Value {
        json!({
            "name": constant_case(&constant.name),
            "type": self.java_type(&constant.kind, false),
            "value": java_literal(&constant.value, &constant.kind),
        })
    }
}

fn enum_context(e: &Enum) -> Value {
    json!({
        "name": e.name,
        "fields": e.fields.iter().map(|f| json!({
            "field": constant_case(&f.name),
            "value": f.numeric_value
                .map(|n| n.to_string())
                .or_else(|| f.value.as_deref().map(constant_case))
                .unwrap_or_else(|| "0".to_string()),
        })).collect::<Vec<_>>(),
    })
}

fn java_literal(value: &str, kind: &Kind) -> String {
    match kind.non_nullable() {
        Kind::Int64 | Kind::Uint64 => format!("{}L", value),
        Kind::Float => format!("{}f", value),
        Kind::Int8 | Kind::Uint8 => format!("(byte) {}", value),
        Kind::Int16 | Kind::Uint16 => format!("(short) {}", value),
        _ => value.to_string(),
    }
}

/// `JavaPackage` attribute of the module, or its namespace.
fn package(module: &Module) -> String {
    module
        .attributes
        .iter()
        .find(|attr| attr.key == "JavaPackage")
        .and_then(|attr| attr.value.clone())
        .unwrap_or_else(|| module.namespace.clone())
}

fn qualified(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", namespace, name)
    }
}

fn words(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let chars: Vec<char> = name.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' || c == '.' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        let boundary = c.is_ascii_uppercase()
            && i > 0
            && (chars[i - 1].is_ascii_lowercase()
                || chars[i - 1].is_ascii_digit()
                || (chars[i - 1].is_ascii_uppercase()
                    && chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase())));
        if boundary && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase(),
        None => String::new(),
    }
}

fn upper_camel(name: &str) -> String {
    words(name).iter().map(|w| capitalize(w)).collect()
}

fn lower_camel(name: &str) -> String {
    let mut parts = words(name).into_iter();
    let first = parts.next().map(|w| w.to_ascii_lowercase()).unwrap_or_default();
    first + &parts.map(|w| capitalize(&w)).collect::<String>()
}

/// `kMaxSize` / `maxSize` / `MAX_SIZE` all become `MAX_SIZE`.
fn constant_case(name: &str) -> String {
    let name = name
        .strip_prefix('k')
        .filter(|rest| rest.starts_with(|c: char| c.is_ascii_uppercase()))
        .unwrap_or(name);
    words(name)
        .iter()
        .map(|w| w.to_ascii_uppercase())
        .collect::<Vec<_>>()
        .join("_")
}

fn write_srcjar(path: &Path, package_path: &str, sources: &[JavaSource]) -> Result<(), GenerateError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| GenerateError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let archive_error = |source: zip::result::ZipError| GenerateError::Archive {
        path: path.to_path_buf(),
        source,
    };
    let file = std::fs::File::create(path).map_err(|source| GenerateError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    for source in sources {
        let name = if package_path.is_empty() {
            source.file_name.clone()
        } else {
            format!("{}/{}", package_path, source.file_name)
        };
        zip.start_file(name, options).map_err(archive_error)?;
        zip.write_all(source.content.as_bytes())
            .map_err(|source| GenerateError::Write {
                path: path.to_path_buf(),
                source,
            })?;
    }
    zip.finish().map_err(archive_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::module_builder::build_ordered_module;
    use crate::compiler::translate::translate;
    use crate::generator::TypeMap;
    use crate::parser::parse;
    use std::io::Read;
    use std::sync::Arc;
    use tempfile::TempDir;

    const SOURCE: &str = r#"
        [JavaPackage="org.chromium.demo"]
        module demo;
        enum Shade { LIGHT, DARK = 3 };
        struct Color { uint8 red = 255; int64 stamp; map<string, int32> names; };
        union Value { int32 number; string text; };
        interface Mixer { Mix(Color a, Color b) => (Color result); Reset(); };
        const int32 kMaxColors = 16;
    "#;

    fn context(output_dir: &Path) -> GeneratorContext {
        let tree = parse(SOURCE, "color_mixer.mojom").unwrap();
        let mut module = build_ordered_module(translate(&tree, "color_mixer.mojom"));
        module.path = "demo/color_mixer.mojom".to_string();
        GeneratorContext {
            module: Arc::new(module),
            output_dir: output_dir.to_path_buf(),
            typemap: TypeMap::new(),
            variant: None,
            bytecode_path: output_dir.join("bytecode"),
            for_blink: false,
            use_new_wrapper_types: false,
        }
    }

    fn entry_names(path: &Path) -> Vec<String> {
        let mut archive = zip::ZipArchive::new(std::fs::File::open(path).unwrap()).unwrap();
        let mut names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_srcjar_contents() {
        let temp_dir = TempDir::new().unwrap();
        let mut generator = JavaBackend.create(context(temp_dir.path()));
        let written = generator.generate_files(&[]).unwrap();

        let srcjar = temp_dir.path().join("demo/color_mixer.mojom.srcjar");
        assert_eq!(written, vec![srcjar.clone()]);
        assert_eq!(
            entry_names(&srcjar),
            vec![
                "org/chromium/demo/Color.java",
                "org/chromium/demo/ColorMixerConstants.java",
                "org/chromium/demo/Mixer.java",
                "org/chromium/demo/Mixer_Internal.java",
                "org/chromium/demo/Shade.java",
                "org/chromium/demo/Value.java",
            ]
        );

        let mut archive = zip::ZipArchive::new(std::fs::File::open(&srcjar).unwrap()).unwrap();
        let mut color = String::new();
        archive
            .by_name("org/chromium/demo/Color.java")
            .unwrap()
            .read_to_string(&mut color)
            .unwrap();
        assert!(color.contains("package org.chromium.demo;"));
        assert!(color.contains("    public byte red = (byte) 255;"));
        assert!(color.contains("    public long stamp;"));
        assert!(color.contains("    public java.util.Map<String, Integer> names;"));
    }

    #[test]
    fn test_java_output_directory() {
        let temp_dir = TempDir::new().unwrap();
        let unpacked = temp_dir.path().join("java_out");
        let mut generator = JavaBackend.create(context(temp_dir.path()));
        let written = generator
            .generate_files(&[format!("--java_output_directory={}", unpacked.display())])
            .unwrap();

        assert_eq!(written.len(), 7);
        let mixer = std::fs::read_to_string(unpacked.join("org/chromium/demo/Mixer.java")).unwrap();
        assert!(mixer.contains(
            "interface MixResponse extends org.chromium.mojo.bindings.Callbacks.Callback1<org.chromium.demo.Color>"
        ));
        assert!(mixer.contains(
            "void mix(org.chromium.demo.Color a, org.chromium.demo.Color b, MixResponse callback);"
        ));
        assert!(mixer.contains("    void reset();"));

        let constants =
            std::fs::read_to_string(unpacked.join("org/chromium/demo/ColorMixerConstants.java")).unwrap();
        assert!(constants.contains("public static final int MAX_COLORS = 16;"));
    }

    #[test]
    fn test_variant_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let mut ctx = context(temp_dir.path());
        ctx.variant = Some("blink".to_string());
        let err = JavaBackend.create(ctx).generate_files(&[]).unwrap_err();
        assert!(matches!(err, GenerateError::Unsupported(_)));
        assert!(!temp_dir.path().join("demo").exists());
    }

    #[test]
    fn test_unknown_flag_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let err = JavaBackend
            .create(context(temp_dir.path()))
            .generate_files(&["--java_bogus=1".to_string()])
            .unwrap_err();
        assert!(matches!(err, GenerateError::InvalidArguments(_)));
    }

    #[test]
    fn test_name_conversions() {
        assert_eq!(upper_camel("color_mixer"), "ColorMixer");
        assert_eq!(lower_camel("GetValue"), "getValue");
        assert_eq!(lower_camel("raw_bytes"), "rawBytes");
        assert_eq!(constant_case("kMaxColors"), "MAX_COLORS");
        assert_eq!(constant_case("HTTPStatus"), "HTTP_STATUS");
        assert_eq!(constant_case("DARK"), "DARK");
    }
}
