//! Front end: from parsed files to linked modules.

pub mod ir;
pub mod module;
pub mod module_builder;
pub mod mojom;
pub mod translate;

pub use module::{ImportChain, ModuleProcessor, SourceLocation};
pub use module_builder::build_ordered_module;
pub use mojom::{Kind, Module};
pub use translate::translate;
