//! One generation run over a set of requested files.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::compiler::module::{
    CacheStats, ImportChain, ImportGraphWalker, ModuleBuilder, SourceLocation,
};
use crate::compiler::mojom::Module;
use crate::error::Result;
use crate::generator::Dispatcher;

/// Owns the parse and module caches for one run.
///
/// `process_file` parses a file with its imports, builds its module and,
/// if the file was requested for output, hands the module to the
/// dispatcher. Imports that were not requested are built but never
/// generated. Each path is generated at most once per run.
pub struct ModuleProcessor {
    source_root: PathBuf,
    import_directories: Vec<SourceLocation>,
    walker: ImportGraphWalker,
    builder: ModuleBuilder,
    dispatcher: Dispatcher,
    requested: HashSet<PathBuf>,
    generated: HashSet<PathBuf>,
    written: Vec<PathBuf>,
}

impl ModuleProcessor {
    /// `requested` lists the files whose modules are emitted.
    pub fn new(
        source_root: impl Into<PathBuf>,
        import_directories: Vec<SourceLocation>,
        requested: &[PathBuf],
        dispatcher: Dispatcher,
        debug_print_intermediate: bool,
    ) -> Self {
        let source_root = source_root.into();
        let requested = requested
            .iter()
            .map(|path| SourceLocation::new(path, &source_root).path().to_path_buf())
            .collect();
        Self {
            source_root,
            import_directories,
            walker: ImportGraphWalker::new(),
            builder: ModuleBuilder::new(debug_print_intermediate),
            dispatcher,
            requested,
            generated: HashSet::new(),
            written: Vec::new(),
        }
    }

    /// Parse, build and (if requested) generate `filename`.
    pub fn process_file(&mut self, filename: &Path) -> Result<Arc<Module>> {
        let location = SourceLocation::new(filename, &self.source_root);
        self.walker
            .parse_file_and_imports(&location, &self.import_directories, &ImportChain::new())?;
        let module = self.build_module(&location)?;

        let path = location.path();
        if self.requested.contains(path) && !self.generated.contains(path) {
            let files = self.dispatcher.dispatch(&module)?;
            self.generated.insert(path.to_path_buf());
            self.written.extend(files);
        }
        Ok(module)
    }

    /// Build the module for an already parsed location.
    pub fn build_module(&mut self, location: &SourceLocation) -> Result<Arc<Module>> {
        self.builder.build_module(location, &self.walker)
    }

    /// Files parsed so far.
    pub fn files_parsed(&self) -> usize {
        self.walker.len()
    }

    /// Modules built so far.
    pub fn modules_built(&self) -> usize {
        self.builder.cache().len()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.builder.cache().stats()
    }

    /// Every output file written so far, in order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn into_written(self) -> Vec<PathBuf> {
        self.written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{GenerationConfig, TypeMapRegistry};
    use std::fs;
    use tempfile::TempDir;

    fn processor(root: &Path, requested: &[PathBuf]) -> ModuleProcessor {
        let dispatcher = Dispatcher::new(
            Vec::new(),
            GenerationConfig::default(),
            TypeMapRegistry::new(),
            Vec::new(),
        );
        ModuleProcessor::new(root, Vec::new(), requested, dispatcher, false)
    }

    #[test]
    fn test_process_file_builds_once() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("a.mojom"), "import \"b.mojom\"; struct A { B b; };").unwrap();
        fs::write(root.join("b.mojom"), "struct B {};").unwrap();

        let a = root.join("a.mojom");
        let b = root.join("b.mojom");
        let mut processor = processor(root, &[a.clone(), b.clone()]);
        let module_a = processor.process_file(&a).unwrap();
        let module_b = processor.process_file(&b).unwrap();

        assert!(Arc::ptr_eq(&module_a.imports[0].module, &module_b));
        assert_eq!(processor.files_parsed(), 2);
        assert_eq!(processor.modules_built(), 2);
        assert_eq!(module_a.path, "a.mojom");

        let again = processor.process_file(&a).unwrap();
        assert!(Arc::ptr_eq(&again, &module_a));
    }

    #[test]
    fn test_relative_spelling_shares_cache_entry() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("sub/x.mojom"), "struct X {};").unwrap();

        let mut processor = processor(root, &[]);
        let first = processor.process_file(&root.join("sub/x.mojom")).unwrap();
        let second = processor
            .process_file(&root.join("sub/../sub/./x.mojom"))
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.path, "sub/x.mojom");
        assert!(processor.written().is_empty());
    }
}
