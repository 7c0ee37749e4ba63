//! Import chains for error reporting.

use std::fmt;
use std::path::{Path, PathBuf};

/// Ordered list of files currently being imported, outermost first.
///
/// Displays as one `  X was imported by Y` line per edge, most recent
/// import first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportChain(Vec<PathBuf>);

impl ImportChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new chain with `path` appended.
    pub fn with(&self, path: impl Into<PathBuf>) -> Self {
        let mut paths = self.0.clone();
        paths.push(path.into());
        Self(paths)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.0.iter().any(|p| p == path)
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ImportChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for pair in self.0.windows(2).rev() {
            write!(
                f,
                "\n  {} was imported by {}",
                pair[1].display(),
                pair[0].display()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_most_recent_first() {
        let chain = ImportChain::new()
            .with("a.mojom")
            .with("b.mojom")
            .with("c.mojom");
        assert_eq!(
            chain.to_string(),
            "\n  c.mojom was imported by b.mojom\n  b.mojom was imported by a.mojom"
        );
    }

    #[test]
    fn test_single_entry_displays_nothing() {
        let chain = ImportChain::new().with("a.mojom");
        assert_eq!(chain.to_string(), "");
        assert!(chain.contains(Path::new("a.mojom")));
        assert!(!chain.contains(Path::new("b.mojom")));
    }

    #[test]
    fn test_with_leaves_original_untouched() {
        let base = ImportChain::new().with("a.mojom");
        let extended = base.with("b.mojom");
        assert_eq!(base.len(), 1);
        assert_eq!(extended.len(), 2);
    }
}
