//! Module cache
//!
//! Built modules keyed by resolved path. Entries are shared (`Arc`) so an
//! import seen through several importers is one instance.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::compiler::mojom::Module;

/// Module cache for one run
#[derive(Debug, Default)]
pub struct ModuleCache {
    modules: HashMap<PathBuf, Arc<Module>>,
    hits: usize,
    misses: usize,
}

impl ModuleCache {
    /// Create a new empty module cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a built module, counting the hit or miss
    pub fn get(&mut self, path: &Path) -> Option<Arc<Module>> {
        match self.modules.get(path) {
            Some(module) => {
                self.hits += 1;
                Some(Arc::clone(module))
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Insert a built module and return the shared handle
    pub fn insert(&mut self, path: PathBuf, module: Module) -> Arc<Module> {
        let module = Arc::new(module);
        self.modules.insert(path, Arc::clone(&module));
        module
    }

    /// Get the number of cached modules
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Check if cache is empty
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.modules.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cached modules
    pub entries: usize,
    /// Number of cache hits
    pub hits: usize,
    /// Number of cache misses
    pub misses: usize,
}

impl CacheStats {
    /// Calculate hit ratio (0.0 to 1.0)
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::mojom::Module;

    fn module(name: &str) -> Module {
        Module {
            path: name.to_string(),
            name: name.to_string(),
            namespace: String::new(),
            attributes: Vec::new(),
            imports: Vec::new(),
            structs: Vec::new(),
            unions: Vec::new(),
            enums: Vec::new(),
            interfaces: Vec::new(),
            constants: Vec::new(),
        }
    }

    #[test]
    fn test_cache_returns_shared_instance() {
        let mut cache = ModuleCache::new();
        let path = PathBuf::from("a.mojom");
        let inserted = cache.insert(path.clone(), module("a.mojom"));

        let first = cache.get(&path).unwrap();
        let second = cache.get(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &inserted));
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_cache_stats() {
        let mut cache = ModuleCache::new();
        assert!(cache.get(Path::new("a.mojom")).is_none());
        cache.insert(PathBuf::from("a.mojom"), module("a.mojom"));
        cache.get(Path::new("a.mojom"));

        let stats = cache.stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_ratio() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_cache_stats() {
        let cache = ModuleCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.stats(), CacheStats::default());
        assert_eq!(cache.stats().hit_ratio(), 0.0);
    }
}
