//! Fan a built module out to the requested backends.

use std::path::PathBuf;
use std::sync::Arc;

use crate::compiler::mojom::Module;
use crate::error::{BindgenError, Result};
use crate::generator::{Backend, GeneratorContext, TypeMapRegistry};

/// Run-wide generation settings.
#[derive(Debug, Clone, Default)]
pub struct GenerationConfig {
    pub output_dir: PathBuf,
    pub variant: Option<String>,
    pub bytecode_path: PathBuf,
    pub for_blink: bool,
    pub use_new_wrapper_types: bool,
}

/// Invokes every requested backend for a module.
pub struct Dispatcher {
    backends: Vec<Arc<dyn Backend>>,
    config: GenerationConfig,
    typemaps: TypeMapRegistry,
    extra_flags: Vec<String>,
}

impl Dispatcher {
    pub fn new(
        backends: Vec<Arc<dyn Backend>>,
        config: GenerationConfig,
        typemaps: TypeMapRegistry,
        extra_flags: Vec<String>,
    ) -> Self {
        Self {
            backends,
            config,
            typemaps,
            extra_flags,
        }
    }

    /// Generate `module` with each backend in request order.
    ///
    /// Stops at the first failing backend. Returns every written path.
    pub fn dispatch(&self, module: &Arc<Module>) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for backend in &self.backends {
            let context = GeneratorContext {
                module: Arc::clone(module),
                output_dir: self.config.output_dir.clone(),
                typemap: self.typemaps.lookup(backend.name()).clone(),
                variant: self.config.variant.clone(),
                bytecode_path: self.config.bytecode_path.clone(),
                for_blink: self.config.for_blink,
                use_new_wrapper_types: self.config.use_new_wrapper_types,
            };
            let flags = self.flags_for(backend.as_ref());
            tracing::debug!(
                "generating {} with {} ({} flags)",
                module.path,
                backend.name(),
                flags.len()
            );
            let mut generator = backend.create(context);
            let files = generator
                .generate_files(&flags)
                .map_err(|source| BindgenError::Generate {
                    backend: backend.name().to_string(),
                    source,
                })?;
            written.extend(files);
        }
        Ok(written)
    }

    /// Extra flags addressed to `backend` via its `--<prefix>_` prefix.
    pub fn flags_for(&self, backend: &dyn Backend) -> Vec<String> {
        let Some(prefix) = backend.flag_prefix() else {
            return Vec::new();
        };
        let prefix = format!("--{}_", prefix);
        self.extra_flags
            .iter()
            .filter(|arg| arg.starts_with(&prefix))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::registry::BackendRegistry;

    #[test]
    fn test_flags_filtered_by_prefix() {
        let registry = BackendRegistry::builtin();
        let dispatcher = Dispatcher::new(
            registry.all().to_vec(),
            GenerationConfig::default(),
            TypeMapRegistry::new(),
            vec![
                "--java_output_directory=out/java".to_string(),
                "--cpp_extra=1".to_string(),
                "--javafoo".to_string(),
            ],
        );

        let cpp = registry.get("c++").unwrap();
        let java = registry.get("java").unwrap();
        let js = registry.get("javascript").unwrap();
        assert_eq!(dispatcher.flags_for(cpp.as_ref()), vec!["--cpp_extra=1"]);
        assert_eq!(
            dispatcher.flags_for(java.as_ref()),
            vec!["--java_output_directory=out/java"]
        );
        assert!(dispatcher.flags_for(js.as_ref()).is_empty());
    }
}
