//! Mustache-style templates for the built-in backends.
//!
//! Supported tags:
//! - `{{name}}` / `{{a.b}}`: value lookup, innermost context first
//! - `{{#name}}...{{/name}}`: repeated for each array element, rendered once
//!   for any other truthy value
//! - `{{^name}}...{{/name}}`: rendered when the value is missing or falsy
//!
//! Section tags standing alone on a line take the whole line with them.
//! Compiled templates serialize to JSON and carry a SHA-256 checksum of
//! their source so stale precompiled artifacts are ignored.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::generator::{Backend, GenerateError, TemplateSource};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TemplateError {
    #[error("{template}: unterminated tag at byte {offset}")]
    UnterminatedTag { template: String, offset: usize },

    #[error("{template}: section '{section}' is never closed")]
    UnclosedSection { template: String, section: String },

    #[error("{template}: expected {{{{/{expected}}}}}, found {{{{/{found}}}}}")]
    MismatchedSection {
        template: String,
        expected: String,
        found: String,
    },

    #[error("{template}: empty tag at byte {offset}")]
    EmptyTag { template: String, offset: usize },

    #[error("unknown template '{0}'")]
    UnknownTemplate(String),
}

/// A node of a compiled template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Node {
    Text {
        text: String,
    },
    Var {
        name: String,
    },
    Section {
        name: String,
        inverted: bool,
        body: Vec<Node>,
    },
}

/// A compiled template, as stored in precompiled artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledTemplate {
    pub name: String,
    /// Hex SHA-256 of the template source
    pub checksum: String,
    pub nodes: Vec<Node>,
}

/// Hex SHA-256 of a template source.
pub fn checksum(source: &str) -> String {
    hex::encode(Sha256::digest(source.as_bytes()))
}

/// Compile template source into a node tree.
pub fn compile(name: &str, source: &str) -> Result<CompiledTemplate, TemplateError> {
    // (section name, inverted, nodes collected so far)
    let mut stack: Vec<(String, bool, Vec<Node>)> = Vec::new();
    let mut nodes: Vec<Node> = Vec::new();
    let mut rest = source;
    let mut at_line_start = true;

    loop {
        let offset = source.len() - rest.len();
        let Some(open) = rest.find("{{") else {
            push_text(current(&mut nodes, &mut stack), rest);
            break;
        };
        let close = rest[open + 2..]
            .find("}}")
            .map(|i| open + 2 + i)
            .ok_or_else(|| TemplateError::UnterminatedTag {
                template: name.to_string(),
                offset: offset + open,
            })?;

        let mut text = &rest[..open];
        let tag = rest[open + 2..close].trim();
        let mut after = &rest[close + 2..];

        let sigil = tag.chars().next().ok_or_else(|| TemplateError::EmptyTag {
            template: name.to_string(),
            offset: offset + open,
        })?;

        let is_section = matches!(sigil, '#' | '^' | '/');
        let mut standalone = false;
        if is_section {
            let line_prefix = match text.rfind('\n') {
                Some(i) => Some(&text[i + 1..]),
                None if at_line_start => Some(text),
                None => None,
            };
            let line_suffix = after.split_once('\n').map(|(s, _)| s).unwrap_or(after);
            if let Some(prefix) = line_prefix {
                if prefix.trim().is_empty() && line_suffix.trim().is_empty() {
                    text = &text[..text.len() - prefix.len()];
                    after = after.split_once('\n').map(|(_, r)| r).unwrap_or("");
                    standalone = true;
                }
            }
        }

        push_text(current(&mut nodes, &mut stack), text);

        match sigil {
            '#' | '^' => {
                stack.push((tag[1..].trim().to_string(), sigil == '^', Vec::new()));
            }
            '/' => {
                let closing = tag[1..].trim();
                let (section, inverted, body) =
                    stack.pop().ok_or_else(|| TemplateError::MismatchedSection {
                        template: name.to_string(),
                        expected: String::new(),
                        found: closing.to_string(),
                    })?;
                if section != closing {
                    return Err(TemplateError::MismatchedSection {
                        template: name.to_string(),
                        expected: section,
                        found: closing.to_string(),
                    });
                }
                current(&mut nodes, &mut stack).push(Node::Section {
                    name: section,
                    inverted,
                    body,
                });
            }
            _ => current(&mut nodes, &mut stack).push(Node::Var {
                name: tag.to_string(),
            }),
        }

        at_line_start = standalone;
        rest = after;
    }

    if let Some((section, _, _)) = stack.pop() {
        return Err(TemplateError::UnclosedSection {
            template: name.to_string(),
            section,
        });
    }

    Ok(CompiledTemplate {
        name: name.to_string(),
        checksum: checksum(source),
        nodes,
    })
}

fn current<'a>(
    root: &'a mut Vec<Node>,
    stack: &'a mut [(String, bool, Vec<Node>)],
) -> &'a mut Vec<Node> {
    match stack.last_mut() {
        Some((_, _, nodes)) => nodes,
        None => root,
    }
}

fn push_text(nodes: &mut Vec<Node>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Node::Text { text: existing }) = nodes.last_mut() {
        existing.push_str(text);
        return;
    }
    nodes.push(Node::Text {
        text: text.to_string(),
    });
}

impl CompiledTemplate {
    /// Render against a JSON context.
    pub fn render(&self, context: &Value) -> String {
        let mut out = String::new();
        let mut stack = vec![context];
        render_nodes(&self.nodes, &mut stack, &mut out);
        out
    }
}

fn render_nodes<'a>(nodes: &'a [Node], stack: &mut Vec<&'a Value>, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text { text } => out.push_str(text),
            Node::Var { name } => {
                if let Some(value) = lookup(stack, name) {
                    write_value(value, out);
                }
            }
            Node::Section {
                name,
                inverted,
                body,
            } => {
                let value = lookup(stack, name);
                let truthy = value.map(is_truthy).unwrap_or(false);
                if *inverted {
                    if !truthy {
                        render_nodes(body, stack, out);
                    }
                    continue;
                }
                let Some(value) = value.filter(|_| truthy) else {
                    continue;
                };
                match value {
                    Value::Array(items) => {
                        for item in items {
                            stack.push(item);
                            render_nodes(body, stack, out);
                            stack.pop();
                        }
                    }
                    other => {
                        stack.push(other);
                        render_nodes(body, stack, out);
                        stack.pop();
                    }
                }
            }
        }
    }
}

fn lookup<'a>(stack: &[&'a Value], name: &str) -> Option<&'a Value> {
    if name == "." {
        return stack.last().copied();
    }
    let mut parts = name.split('.');
    let first = parts.next()?;
    let mut value = stack
        .iter()
        .rev()
        .find_map(|frame| frame.as_object().and_then(|obj| obj.get(first)))?;
    for part in parts {
        value = value.as_object()?.get(part)?;
    }
    Some(value)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Number(_) | Value::Object(_) => true,
    }
}

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::Null => {}
        Value::String(s) => out.push_str(s),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        other => out.push_str(&other.to_string()),
    }
}

/// The compiled templates of one backend.
#[derive(Debug, Default)]
pub struct TemplateSet {
    templates: HashMap<String, CompiledTemplate>,
}

impl TemplateSet {
    /// Load a backend's templates.
    ///
    /// A precompiled artifact under `bytecode_path/<prefix>/<name>.json` is
    /// used when its checksum matches the embedded source; otherwise the
    /// embedded source is compiled.
    pub fn load(
        bytecode_path: &Path,
        prefix: &str,
        sources: &[TemplateSource],
    ) -> Result<Self, TemplateError> {
        let mut templates = HashMap::new();
        for source in sources {
            let expected = checksum(source.source);
            let artifact = artifact_path(bytecode_path, prefix, source.name);
            let compiled = match read_artifact(&artifact) {
                Some(compiled) if compiled.checksum == expected => {
                    tracing::debug!("using precompiled template {}", artifact.display());
                    compiled
                }
                Some(_) => {
                    tracing::debug!("stale template artifact {}", artifact.display());
                    compile(source.name, source.source)?
                }
                None => compile(source.name, source.source)?,
            };
            templates.insert(source.name.to_string(), compiled);
        }
        Ok(Self { templates })
    }

    pub fn render(&self, name: &str, context: &Value) -> Result<String, TemplateError> {
        self.templates
            .get(name)
            .map(|template| template.render(context))
            .ok_or_else(|| TemplateError::UnknownTemplate(name.to_string()))
    }
}

fn artifact_path(bytecode_path: &Path, prefix: &str, name: &str) -> PathBuf {
    bytecode_path.join(prefix).join(format!("{}.json", name))
}

fn read_artifact(path: &Path) -> Option<CompiledTemplate> {
    let content = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(compiled) => Some(compiled),
        Err(e) => {
            tracing::debug!("ignoring unreadable template artifact {}: {}", path.display(), e);
            None
        }
    }
}

/// Compile every template of `backends` into `output_dir`.
///
/// Returns the artifact paths written, in backend then template order.
pub fn precompile_templates(
    backends: &[std::sync::Arc<dyn Backend>],
    output_dir: &Path,
) -> Result<Vec<PathBuf>, GenerateError> {
    let mut written = Vec::new();
    for backend in backends {
        let directory = output_dir.join(backend.template_prefix());
        fs::create_dir_all(&directory).map_err(|source| GenerateError::Write {
            path: directory.clone(),
            source,
        })?;
        for source in backend.templates() {
            let compiled = compile(source.name, source.source)?;
            let path = artifact_path(output_dir, backend.template_prefix(), source.name);
            let json = serde_json::to_string_pretty(&compiled)
                .map_err(|e| GenerateError::Serialize(e.to_string()))?;
            fs::write(&path, json).map_err(|source| GenerateError::Write {
                path: path.clone(),
                source,
            })?;
            tracing::debug!("precompiled {}", path.display());
            written.push(path);
        }
    }
    Ok(written)
}
