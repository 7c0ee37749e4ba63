//! Type-map loading and lookup.
//!
//! A type-map source is JSON of the form `{ "<backend>": { "<idl type>":
//! "<target type>" } }`. Whole-line `//` comments are allowed and removed
//! before decoding. Later sources override earlier ones key by key.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use crate::error::{BindgenError, Result};

/// IDL type name to backend type name.
pub type TypeMap = BTreeMap<String, String>;

static EMPTY: TypeMap = BTreeMap::new();

/// Merged type maps for every backend.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TypeMapRegistry {
    maps: BTreeMap<String, TypeMap>,
}

impl TypeMapRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and merge `sources` in order. Repeated sources are skipped.
    pub fn load(&mut self, sources: &[PathBuf]) -> Result<()> {
        let mut seen = HashSet::new();
        for source in sources {
            if !seen.insert(source) {
                tracing::warn!("type map {} listed more than once", source.display());
                continue;
            }
            let content =
                std::fs::read_to_string(source).map_err(|e| BindgenError::FileAccess {
                    path: source.clone(),
                    source: e,
                    chain: Default::default(),
                })?;
            self.merge_str(&content, source)?;
        }
        Ok(())
    }

    /// Merge one source's content; `origin` names it in errors.
    pub fn merge_str(&mut self, content: &str, origin: &Path) -> Result<()> {
        let stripped = strip_comment_lines(content);
        let parsed: BTreeMap<String, TypeMap> =
            serde_json::from_str(&stripped).map_err(|e| BindgenError::Configuration {
                path: origin.to_path_buf(),
                message: e.to_string(),
            })?;
        for (backend, entries) in parsed {
            tracing::debug!(
                "type map {}: {} entries for {}",
                origin.display(),
                entries.len(),
                backend
            );
            self.maps.entry(backend).or_default().extend(entries);
        }
        Ok(())
    }

    /// Merged map for `backend`, empty if none was loaded.
    pub fn lookup(&self, backend: &str) -> &TypeMap {
        self.maps.get(backend).unwrap_or(&EMPTY)
    }
}

fn strip_comment_lines(content: &str) -> String {
    content
        .lines()
        .filter(|line| !line.trim_start().starts_with("//"))
        .collect::<Vec<_>>()
        .join("\n")
}
