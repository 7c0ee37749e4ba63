//! Code generation backends
//!
//! A [`Backend`] is a statically registered factory; for each module to
//! emit it creates a [`Generator`] bound to that module and the run-wide
//! settings, then calls [`Generator::generate_files`] with the extra
//! command-line flags addressed to it.

pub mod cpp;
pub mod dispatch;
pub mod java;
pub mod javascript;
pub mod registry;
pub mod template;
pub mod typemap;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::compiler::mojom::Module;

pub use dispatch::{Dispatcher, GenerationConfig};
pub use registry::BackendRegistry;
pub use template::{TemplateError, TemplateSet};
pub use typemap::{TypeMap, TypeMapRegistry};

/// Errors raised inside a backend
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("{0}")]
    Unsupported(String),

    #[error("invalid generator arguments: {0}")]
    InvalidArguments(String),

    #[error("failed to write archive {}: {source}", .path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("failed to serialize: {0}")]
    Serialize(String),
}

/// An embedded template: file name and source text.
#[derive(Debug, Clone, Copy)]
pub struct TemplateSource {
    pub name: &'static str,
    pub source: &'static str,
}

/// A target-language backend.
pub trait Backend: Send + Sync {
    /// Name used on the command line (`c++`, `java`, ...)
    fn name(&self) -> &str;

    /// Prefix of the `--<prefix>_` flags forwarded to this backend
    fn flag_prefix(&self) -> Option<&str> {
        None
    }

    /// Directory name for precompiled template artifacts
    fn template_prefix(&self) -> &str {
        self.name()
    }

    fn templates(&self) -> &[TemplateSource] {
        &[]
    }

    /// Create a generator for one module.
    fn create(&self, context: GeneratorContext) -> Box<dyn Generator>;
}

/// Produces the output files for one module.
pub trait Generator {
    /// Write all files; returns the written paths.
    fn generate_files(&mut self, args: &[String]) -> Result<Vec<PathBuf>, GenerateError>;
}

/// Everything a generator is bound to.
#[derive(Debug, Clone)]
pub struct GeneratorContext {
    pub module: Arc<Module>,
    pub output_dir: PathBuf,
    pub typemap: TypeMap,
    pub variant: Option<String>,
    pub bytecode_path: PathBuf,
    pub for_blink: bool,
    pub use_new_wrapper_types: bool,
}

impl GeneratorContext {
    /// Output path for the module, relative to the output directory:
    /// the module path plus `-<variant>` if any, plus `extension`.
    pub fn output_name(&self, extension: &str) -> String {
        self.output_name_for(&self.module.path, extension)
    }

    /// Output path of another module emitted in the same run.
    pub fn output_name_for(&self, module_path: &str, extension: &str) -> String {
        match &self.variant {
            Some(variant) => format!("{}-{}{}", module_path, variant, extension),
            None => format!("{}{}", module_path, extension),
        }
    }

    /// Write `contents` to `relative` under the output directory.
    pub fn write_file(&self, relative: &str, contents: &[u8]) -> Result<PathBuf, GenerateError> {
        write_file(&self.output_dir.join(relative), contents)
    }
}

/// Write a file, creating parent directories as needed.
pub(crate) fn write_file(path: &Path, contents: &[u8]) -> Result<PathBuf, GenerateError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| GenerateError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, contents).map_err(|source| GenerateError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("wrote {}", path.display());
    Ok(path.to_path_buf())
}
