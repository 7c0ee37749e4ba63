//! Mojom bindings engine
//!
//! Parses mojom IDL files, resolves their imports into a graph of linked
//! modules, and hands each requested module to the code generation
//! backends.
//!
//! - [`parser`]: lexer and recursive-descent parser
//! - [`compiler`]: translation, module construction, import graph walking
//! - [`generator`]: backends, templates, type maps
//! - [`driver`]: the `generate` and `precompile` operations

pub mod compiler;
pub mod driver;
pub mod error;
pub mod generator;
pub mod parser;

pub use compiler::{Module, ModuleProcessor, SourceLocation};
pub use driver::{generate, precompile, GenerateOptions, GenerateSummary, DEFAULT_GENERATORS};
pub use error::{BindgenError, Result};
pub use generator::{Backend, BackendRegistry, GenerateError, Generator, GeneratorContext};
