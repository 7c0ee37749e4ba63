//! Import graph walking.
//!
//! Parses a file and, depth-first, every file it imports. Each path is
//! parsed at most once per run. The active import chain is tracked
//! separately from the parsed set so that a file which is still having its
//! imports walked is recognized as a cycle rather than as already parsed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::compiler::module::{find_import_file, ImportChain, SourceLocation};
use crate::error::{BindgenError, Result};
use crate::parser::{parse, MojomFile};

/// A parsed file together with where each of its imports resolved.
#[derive(Debug, Clone)]
pub struct ParsedFile {
    pub location: SourceLocation,
    pub tree: MojomFile,
    /// One entry per import statement, in source order
    pub imports: Vec<SourceLocation>,
}

/// Parse-phase state for one run.
#[derive(Debug, Default)]
pub struct ImportGraphWalker {
    parsed: HashMap<PathBuf, ParsedFile>,
}

impl ImportGraphWalker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `location` and everything it transitively imports.
    ///
    /// `chain` lists the files whose imports are currently being walked,
    /// outermost first. Returns without work if the file was already parsed.
    pub fn parse_file_and_imports(
        &mut self,
        location: &SourceLocation,
        import_directories: &[SourceLocation],
        chain: &ImportChain,
    ) -> Result<()> {
        let path = location.path();
        if self.parsed.contains_key(path) {
            return Ok(());
        }
        if chain.contains(path) {
            return Err(BindgenError::CircularImport {
                path: path.to_path_buf(),
                chain: chain.with(path),
            });
        }

        let source = std::fs::read_to_string(path).map_err(|source| BindgenError::FileAccess {
            path: path.to_path_buf(),
            source,
            chain: chain.with(path),
        })?;
        let tree = parse(&source, &path.display().to_string()).map_err(|error| {
            BindgenError::Parse {
                error,
                chain: chain.with(path),
            }
        })?;
        tracing::debug!("parsed {} ({} imports)", path.display(), tree.imports.len());

        let directory = location.directory();
        let nested = chain.with(path);
        let mut imports = Vec::with_capacity(tree.imports.len());
        for import in &tree.imports {
            let resolved = find_import_file(&directory, &import.filename, import_directories);
            self.parse_file_and_imports(&resolved, import_directories, &nested)?;
            imports.push(resolved);
        }

        self.parsed.insert(
            path.to_path_buf(),
            ParsedFile {
                location: location.clone(),
                tree,
                imports,
            },
        );
        Ok(())
    }

    pub fn get(&self, path: &Path) -> Option<&ParsedFile> {
        self.parsed.get(path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.parsed.contains_key(path)
    }

    /// Number of distinct files parsed so far.
    pub fn len(&self) -> usize {
        self.parsed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsed.is_empty()
    }
}
