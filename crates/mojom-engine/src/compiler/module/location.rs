//! Source locations and import path resolution.
//!
//! A [`SourceLocation`] pairs a file (or directory) path with the source root
//! it is relative to. Import lookup tries the importing file's directory
//! first and then every configured import directory, each of which may sit
//! under a different source root.

use std::path::{Component, Path, PathBuf};

/// A path paired with the source root it is relative to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    path: PathBuf,
    source_root: PathBuf,
}

impl SourceLocation {
    /// Create a location. `path` is normalized lexically so that different
    /// spellings of the same file share one cache key.
    pub fn new(path: impl AsRef<Path>, source_root: impl AsRef<Path>) -> Self {
        Self {
            path: normalize(path.as_ref()),
            source_root: source_root.as_ref().to_path_buf(),
        }
    }

    /// Parse an import directory spec of the form `path` or `path:root`.
    ///
    /// Without an explicit root the directory is rooted at `default_root`.
    /// Fields after the second `:` are ignored.
    pub fn parse_import_directory(spec: &str, default_root: &Path) -> Self {
        let mut fields = spec.split(':');
        let path = fields.next().unwrap_or(spec);
        match fields.next() {
            Some(root) => Self::new(path, root),
            None => Self::new(path, default_root),
        }
    }

    /// Resolved path, used as the cache key.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// Directory containing this location, under the same source root.
    pub fn directory(&self) -> Self {
        let parent = self.path.parent().unwrap_or_else(|| Path::new(""));
        Self::new(parent, &self.source_root)
    }

    /// `file_name` inside this location, under the same source root.
    pub fn join(&self, file_name: &str) -> Self {
        Self::new(self.path.join(file_name), &self.source_root)
    }

    /// Path relative to the source root with `/` separators on every host.
    pub fn relative_path(&self) -> String {
        let path = absolute(&self.path);
        let root = absolute(&self.source_root);
        let relative = pathdiff::diff_paths(&path, &root).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// File name of this location (`foo.mojom`).
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Find `file_name` in `search` or, failing that, in `additional` in order.
///
/// Returns the first existing file with its own directory's source root.
/// When nothing matches, returns `file_name` under `search` so the caller
/// can report the failed read with the usual relative-path metadata.
pub fn find_import_file(
    search: &SourceLocation,
    file_name: &str,
    additional: &[SourceLocation],
) -> SourceLocation {
    for directory in std::iter::once(search).chain(additional) {
        let candidate = directory.join(file_name);
        if candidate.path().is_file() {
            return candidate;
        }
    }
    tracing::debug!(
        "import '{}' not found under {} or {} import directories",
        file_name,
        search.path().display(),
        additional.len()
    );
    search.join(file_name)
}

/// Lexically normalize a path: drop `.` and fold `name/..` pairs.
fn normalize(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path)
        .map(|p| normalize(&p))
        .unwrap_or_else(|_| normalize(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_spellings() {
        assert_eq!(
            SourceLocation::new("./a/b/../c.mojom", ".").path(),
            Path::new("a/c.mojom")
        );
        assert_eq!(SourceLocation::new("", ".").path(), Path::new("."));
        assert_eq!(
            SourceLocation::new("../x/./y.mojom", ".").path(),
            Path::new("../x/y.mojom")
        );
    }

    #[test]
    fn test_relative_path_uses_forward_slashes() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let location = SourceLocation::new(root.join("services").join("net").join("a.mojom"), root);
        assert_eq!(location.relative_path(), "services/net/a.mojom");
    }

    #[test]
    fn test_relative_path_against_relative_root() {
        let location = SourceLocation::new("gen/x/y.mojom", "gen");
        assert_eq!(location.relative_path(), "x/y.mojom");
    }

    #[test]
    fn test_parse_import_directory() {
        let default_root = Path::new("../..");
        let plain = SourceLocation::parse_import_directory("third_party/mojo", default_root);
        assert_eq!(plain.path(), Path::new("third_party/mojo"));
        assert_eq!(plain.source_root(), default_root);

        let rooted = SourceLocation::parse_import_directory("gen/mojo:gen", default_root);
        assert_eq!(rooted.path(), Path::new("gen/mojo"));
        assert_eq!(rooted.source_root(), Path::new("gen"));

        let extra = SourceLocation::parse_import_directory("gen/mojo:gen:x", default_root);
        assert_eq!(extra.path(), Path::new("gen/mojo"));
        assert_eq!(extra.source_root(), Path::new("gen"));
    }

    #[test]
    fn test_find_prefers_primary_directory() {
        let temp_dir = TempDir::new().unwrap();
        let primary = temp_dir.path().join("primary");
        let extra = temp_dir.path().join("extra");
        fs::create_dir_all(&primary).unwrap();
        fs::create_dir_all(&extra).unwrap();
        fs::write(primary.join("foo.mojom"), "").unwrap();
        fs::write(extra.join("foo.mojom"), "").unwrap();

        let found = find_import_file(
            &SourceLocation::new(&primary, temp_dir.path()),
            "foo.mojom",
            &[SourceLocation::new(&extra, &extra)],
        );
        assert_eq!(found.path(), normalize(&primary.join("foo.mojom")));
        assert_eq!(found.source_root(), temp_dir.path());
    }

    #[test]
    fn test_find_in_second_additional_directory() {
        let temp_dir = TempDir::new().unwrap();
        let primary = temp_dir.path().join("primary");
        let first = temp_dir.path().join("first");
        let second = temp_dir.path().join("second");
        for dir in [&primary, &first, &second] {
            fs::create_dir_all(dir).unwrap();
        }
        fs::write(second.join("foo.mojom"), "").unwrap();

        let found = find_import_file(
            &SourceLocation::new(&primary, temp_dir.path()),
            "foo.mojom",
            &[
                SourceLocation::new(&first, temp_dir.path()),
                SourceLocation::new(&second, &second),
            ],
        );
        assert_eq!(found.path(), normalize(&second.join("foo.mojom")));
        // The match keeps its own directory's root
        assert_eq!(found.source_root(), second.as_path());
        assert_eq!(found.relative_path(), "foo.mojom");
    }

    #[test]
    fn test_not_found_falls_back_to_primary() {
        let temp_dir = TempDir::new().unwrap();
        let primary = SourceLocation::new(temp_dir.path().join("src"), temp_dir.path());

        let missing = find_import_file(
            &primary,
            "nested/missing.mojom",
            &[SourceLocation::new(temp_dir.path().join("other"), "/")],
        );
        assert!(!missing.path().exists());
        assert_eq!(missing.source_root(), temp_dir.path());
        assert_eq!(missing.relative_path(), "src/nested/missing.mojom");
    }
}
