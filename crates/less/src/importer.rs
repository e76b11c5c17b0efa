//! Import resolution and the parsed-stylesheet cache.
//!
//! The compiler reads imported files only through the [`Importer`] trait and
//! memoizes parsed files only through [`ImportCache`]. Both are `Send +
//! Sync` so one instance can serve compilations on several threads.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::error::{LessError, Position, Result};
use crate::parser::Stylesheet;

/// A resolved import.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportedFile {
    /// Identity of the file: used for cycle detection, import-once and as
    /// the cache key. Also the file name reported in positions.
    pub key: String,
    pub contents: String,
}

/// Locates and reads imported files.
pub trait Importer: Send + Sync {
    /// Resolve `path` as written in an `@import`, relative to the key of the
    /// importing file. `Ok(None)` means the file does not exist.
    fn resolve(&self, path: &str, origin: Option<&str>) -> Result<Option<ImportedFile>>;
}

/// Memoizes parsed imports by key.
///
/// Entries are written once and never modified afterwards.
pub trait ImportCache: Send + Sync {
    fn get(&self, key: &str) -> Option<Arc<Stylesheet>>;
    fn put(&self, key: &str, sheet: Arc<Stylesheet>);
}

/// Reads imports from disk.
///
/// Relative paths are tried against the importing file's directory, then
/// each include path, then the working directory.
#[derive(Clone, Debug, Default)]
pub struct FileSystemImporter {
    include_paths: Vec<PathBuf>,
}

impl FileSystemImporter {
    pub fn new(include_paths: Vec<PathBuf>) -> Self {
        Self { include_paths }
    }

    fn candidates(&self, path: &Path, origin: Option<&str>) -> Vec<PathBuf> {
        if path.is_absolute() {
            return vec![path.to_path_buf()];
        }
        let mut candidates = Vec::with_capacity(self.include_paths.len() + 2);
        if let Some(dir) = origin.and_then(|o| Path::new(o).parent()) {
            candidates.push(dir.join(path));
        }
        candidates.extend(self.include_paths.iter().map(|dir| dir.join(path)));
        candidates.push(path.to_path_buf());
        candidates
    }
}

impl Importer for FileSystemImporter {
    fn resolve(&self, path: &str, origin: Option<&str>) -> Result<Option<ImportedFile>> {
        for candidate in self.candidates(Path::new(path), origin) {
            if !candidate.is_file() {
                continue;
            }
            let contents = std::fs::read_to_string(&candidate).map_err(|source| LessError::Io {
                position: Position::unknown(origin.unwrap_or(path)),
                path: candidate.display().to_string(),
                source,
            })?;
            let key = candidate
                .canonicalize()
                .unwrap_or(candidate)
                .display()
                .to_string();
            log::debug!("read {} ({} bytes)", key, contents.len());
            return Ok(Some(ImportedFile { key, contents }));
        }
        Ok(None)
    }
}

/// An importer over an in-memory set of files, keyed by normalized path.
///
/// ```
/// use less::{Importer, MemoryImporter};
///
/// let importer = MemoryImporter::new()
///     .with_file("styles/main.less", "@import \"vars\";")
///     .with_file("styles/vars.less", "@x: 1;");
/// let file = importer.resolve("vars.less", Some("styles/main.less")).unwrap().unwrap();
/// assert_eq!(file.key, "styles/vars.less");
/// ```
#[derive(Clone, Debug, Default)]
pub struct MemoryImporter {
    files: HashMap<String, String>,
}

impl MemoryImporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, contents: &str) -> Self {
        self.files.insert(normalize(Path::new(path)), contents.to_string());
        self
    }
}

impl Importer for MemoryImporter {
    fn resolve(&self, path: &str, origin: Option<&str>) -> Result<Option<ImportedFile>> {
        let relative = origin
            .and_then(|o| Path::new(o).parent())
            .map(|dir| normalize(&dir.join(path)));
        let found = relative
            .into_iter()
            .chain(std::iter::once(normalize(Path::new(path))))
            .find_map(|key| {
                self.files.get(&key).map(|contents| ImportedFile {
                    key,
                    contents: contents.clone(),
                })
            });
        Ok(found)
    }
}

/// Lexically resolve `.` and `..` components.
fn normalize(path: &Path) -> String {
    let mut parts: Vec<&str> = Vec::new();
    let mut absolute = false;
    for component in path.components() {
        match component {
            Component::RootDir => absolute = true,
            Component::CurDir | Component::Prefix(_) => {}
            Component::ParentDir => {
                if parts.last().is_some_and(|p| *p != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            Component::Normal(part) => parts.push(part.to_str().unwrap_or_default()),
        }
    }
    let joined = parts.join("/");
    if absolute { format!("/{joined}") } else { joined }
}

/// A cache that stores nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCache;

impl ImportCache for NoCache {
    fn get(&self, _key: &str) -> Option<Arc<Stylesheet>> {
        None
    }

    fn put(&self, _key: &str, _sheet: Arc<Stylesheet>) {}
}

/// A thread-safe in-memory cache; the first entry stored for a key wins.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Arc<Stylesheet>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ImportCache for MemoryCache {
    fn get(&self, key: &str) -> Option<Arc<Stylesheet>> {
        self.entries.read().ok()?.get(key).cloned()
    }

    fn put(&self, key: &str, sheet: Arc<Stylesheet>) {
        if let Ok(mut entries) = self.entries.write() {
            entries.entry(key.to_string()).or_insert(sheet);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_resolves_dots() {
        assert_eq!(normalize(Path::new("a/./b/../c.less")), "a/c.less");
        assert_eq!(normalize(Path::new("../x.less")), "../x.less");
        assert_eq!(normalize(Path::new("/a/../b.less")), "/b.less");
    }

    #[test]
    fn memory_importer_prefers_origin_directory() {
        let importer = MemoryImporter::new()
            .with_file("lib/a.less", "lib")
            .with_file("a.less", "root");
        let file = importer.resolve("a.less", Some("lib/main.less")).unwrap().unwrap();
        assert_eq!(file.contents, "lib");
        let file = importer.resolve("a.less", Some("main.less")).unwrap().unwrap();
        assert_eq!(file.contents, "root");
        assert!(importer.resolve("missing.less", None).unwrap().is_none());
    }

    #[test]
    fn memory_cache_is_write_once() {
        let cache = MemoryCache::new();
        let first = Arc::new(Stylesheet {
            file: Arc::from("a.less"),
            rules: Vec::new(),
        });
        let second = Arc::new(Stylesheet {
            file: Arc::from("other.less"),
            rules: Vec::new(),
        });
        cache.put("a.less", first);
        cache.put("a.less", second);
        assert_eq!(cache.len(), 1);
        assert_eq!(&*cache.get("a.less").unwrap().file, "a.less");
        assert!(NoCache.get("a.less").is_none());
    }

    #[test]
    fn file_system_importer_reports_missing_files() {
        let importer = FileSystemImporter::new(Vec::new());
        let result = importer
            .resolve("definitely-not-here-1f3a.less", Some("/nonexistent/dir/main.less"))
            .unwrap();
        assert!(result.is_none());
    }
}
