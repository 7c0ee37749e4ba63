//! Known backends by name.

use std::sync::Arc;

use crate::error::{BindgenError, Result};
use crate::generator::cpp::CppBackend;
use crate::generator::java::JavaBackend;
use crate::generator::javascript::JavaScriptBackend;
use crate::generator::Backend;

/// Name-indexed table of backends. Lookups are case-insensitive.
#[derive(Clone, Default)]
pub struct BackendRegistry {
    backends: Vec<Arc<dyn Backend>>,
}

impl BackendRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in `c++`, `javascript` and `java` backends.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(CppBackend));
        registry.register(Arc::new(JavaScriptBackend));
        registry.register(Arc::new(JavaBackend));
        registry
    }

    /// Add a backend, replacing any existing one with the same name.
    pub fn register(&mut self, backend: Arc<dyn Backend>) {
        let name = backend.name().to_lowercase();
        self.backends.retain(|b| b.name().to_lowercase() != name);
        self.backends.push(backend);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Backend>> {
        let name = name.to_lowercase();
        self.backends
            .iter()
            .find(|b| b.name().to_lowercase() == name)
            .cloned()
    }

    /// Resolve a comma-separated list of backend names.
    ///
    /// Names are trimmed and matched case-insensitively; empty entries are
    /// ignored and repeated names load once.
    pub fn load(&self, names: &str) -> Result<Vec<Arc<dyn Backend>>> {
        let mut loaded: Vec<Arc<dyn Backend>> = Vec::new();
        for name in names.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            let backend = self
                .get(name)
                .ok_or_else(|| BindgenError::UnknownBackend(name.to_string()))?;
            if !loaded.iter().any(|b| b.name() == backend.name()) {
                loaded.push(backend);
            }
        }
        Ok(loaded)
    }

    pub fn all(&self) -> &[Arc<dyn Backend>] {
        &self.backends
    }

    /// Flag prefixes declared by the registered backends.
    pub fn flag_prefixes(&self) -> Vec<String> {
        self.backends
            .iter()
            .filter_map(|b| b.flag_prefix().map(str::to_string))
            .collect()
    }
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.backends.iter().map(|b| b.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_trims_and_ignores_case() {
        let registry = BackendRegistry::builtin();
        let loaded = registry.load(" C++ , JavaScript,java").unwrap();
        let names: Vec<_> = loaded.iter().map(|b| b.name()).collect();
        assert_eq!(names, vec!["c++", "javascript", "java"]);
    }

    #[test]
    fn test_load_empty_list() {
        assert!(BackendRegistry::builtin().load("").unwrap().is_empty());
    }

    #[test]
    fn test_load_deduplicates() {
        let loaded = BackendRegistry::builtin().load("java,JAVA").unwrap();
        assert_eq!(loaded.len(), 1);
    }

    #[test]
    fn test_unknown_backend() {
        let err = BackendRegistry::builtin().load("c++,cobol").err().expect("expected an error");
        match err {
            BindgenError::UnknownBackend(name) => assert_eq!(name, "cobol"),
            other => panic!("expected unknown backend, got {:?}", other),
        }
    }

    #[test]
    fn test_flag_prefixes() {
        let prefixes = BackendRegistry::builtin().flag_prefixes();
        assert_eq!(prefixes, vec!["cpp".to_string(), "java".to_string()]);
    }
}
