//! Module building over the parsed import graph.

use std::sync::Arc;

use crate::compiler::module::{ImportGraphWalker, ModuleCache, SourceLocation};
use crate::compiler::module_builder::build_ordered_module;
use crate::compiler::mojom::Module;
use crate::compiler::translate::translate;
use crate::error::{BindgenError, Result};

/// Builds linked modules from parsed files, once per path.
#[derive(Debug, Default)]
pub struct ModuleBuilder {
    cache: ModuleCache,
    debug_print_intermediate: bool,
}

impl ModuleBuilder {
    pub fn new(debug_print_intermediate: bool) -> Self {
        Self {
            cache: ModuleCache::new(),
            debug_print_intermediate,
        }
    }

    /// Build the module for `location`, building its imports first.
    ///
    /// The file and all of its imports must already have been parsed by
    /// `parsed`. Repeated calls for the same path return the same `Arc`.
    pub fn build_module(
        &mut self,
        location: &SourceLocation,
        parsed: &ImportGraphWalker,
    ) -> Result<Arc<Module>> {
        if let Some(module) = self.cache.get(location.path()) {
            tracing::debug!("module cache hit for {}", location.path().display());
            return Ok(module);
        }

        let file = parsed
            .get(location.path())
            .ok_or_else(|| BindgenError::NotParsed(location.path().to_path_buf()))?;

        let mut data = translate(&file.tree, &location.file_name());
        for (entry, import) in data.imports.iter_mut().zip(&file.imports) {
            entry.module = Some(self.build_module(import, parsed)?);
        }

        if self.debug_print_intermediate {
            println!("{:#?}", data);
        }

        let mut module = build_ordered_module(data);
        module.path = location.relative_path();
        tracing::debug!("built module {} ({})", module.path, module.namespace);

        Ok(self.cache.insert(location.path().to_path_buf(), module))
    }

    pub fn cache(&self) -> &ModuleCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::module::ImportChain;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_build_shares_imported_modules() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("net")).unwrap();
        fs::write(
            root.join("net/a.mojom"),
            "module net; import \"b.mojom\"; import \"c.mojom\"; struct A { B b; };",
        )
        .unwrap();
        fs::write(root.join("net/b.mojom"), "module net; import \"c.mojom\"; struct B {};").unwrap();
        fs::write(root.join("net/c.mojom"), "module net; struct C {};").unwrap();

        let a = SourceLocation::new(root.join("net/a.mojom"), root);
        let b = SourceLocation::new(root.join("net/b.mojom"), root);
        let mut walker = ImportGraphWalker::new();
        walker.parse_file_and_imports(&a, &[], &ImportChain::new()).unwrap();

        let mut builder = ModuleBuilder::new(false);
        let module_a = builder.build_module(&a, &walker).unwrap();
        let module_b = builder.build_module(&b, &walker).unwrap();

        assert_eq!(module_a.path, "net/a.mojom");
        assert_eq!(module_a.name, "a.mojom");
        assert!(Arc::ptr_eq(&module_a.imports[0].module, &module_b));
        assert!(Arc::ptr_eq(
            &module_a.imports[1].module,
            &module_b.imports[0].module
        ));
        assert_eq!(builder.cache().len(), 3);

        let again = builder.build_module(&a, &walker).unwrap();
        assert!(Arc::ptr_eq(&again, &module_a));
    }

    #[test]
    fn test_build_before_parse_is_an_error() {
        let walker = ImportGraphWalker::new();
        let mut builder = ModuleBuilder::new(false);
        let err = builder
            .build_module(&SourceLocation::new("never.mojom", "."), &walker)
            .unwrap_err();
        assert!(matches!(err, BindgenError::NotParsed(_)));
    }
}
