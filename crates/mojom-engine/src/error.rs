//! Error types for the bindings pipeline.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::compiler::module::ImportChain;
use crate::generator::GenerateError;
use crate::parser::ParseError;

/// Errors that abort a generation run.
///
/// File and parse failures carry the import chain that led to the file,
/// so the message shows how an unreadable or malformed file was reached.
#[derive(Debug, Error)]
pub enum BindgenError {
    /// A file imports itself directly or transitively
    #[error("{}: Error: Circular dependency{chain}", .path.display())]
    CircularImport { path: PathBuf, chain: ImportChain },

    /// A requested or imported file could not be read
    #[error("{}: Error: {source}{chain}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
        chain: ImportChain,
    },

    /// A file is not valid mojom
    #[error("{error}{chain}")]
    Parse {
        error: ParseError,
        chain: ImportChain,
    },

    /// A generator name matched no known backend
    #[error("Unknown generator name {0}")]
    UnknownBackend(String),

    /// A type-map file could not be read or decoded
    #[error("{}: Error: {message}", .path.display())]
    Configuration { path: PathBuf, message: String },

    /// A module was requested before its file was parsed
    #[error("{}: Error: module requested before the file was parsed", .0.display())]
    NotParsed(PathBuf),

    /// A backend failed to produce its output
    #[error("{backend} generator failed: {source}")]
    Generate {
        backend: String,
        #[source]
        source: GenerateError,
    },

    /// Output or artifact I/O failed outside of a backend
    #[error("{}: Error: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, BindgenError>;
