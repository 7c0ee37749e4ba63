//! Module resolution and build pipeline
//!
//! - [`location`]: source locations and import lookup
//! - [`walker`]: depth-first parse of a file and its imports, cycle detection
//! - [`builder`] / [`cache`]: linked modules, built once per path
//! - [`processor`]: one run over the requested files

pub mod builder;
pub mod cache;
pub mod chain;
pub mod location;
pub mod processor;
pub mod walker;

pub use builder::ModuleBuilder;
pub use cache::{CacheStats, ModuleCache};
pub use chain::ImportChain;
pub use location::{find_import_file, SourceLocation};
pub use processor::ModuleProcessor;
pub use walker::{ImportGraphWalker, ParsedFile};
