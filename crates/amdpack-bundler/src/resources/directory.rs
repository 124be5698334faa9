//! Packs a directory tree into a flat `relative/path → base64` map.

use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use indexmap::IndexMap;
use tracing::warn;
use walkdir::WalkDir;

/// Walk `root` depth-first, sub-directories before files, names sorted.
///
/// Keys are relative to `root` and always `/` separated. A missing or
/// non-directory `root` packs to an empty map.
pub fn pack_directory(root: &Path) -> IndexMap<String, String> {
    let mut entries = IndexMap::new();
    if !root.is_dir() {
        return entries;
    }

    let walker = WalkDir::new(root).min_depth(1).sort_by(|a, b| {
        let a_dir = a.file_type().is_dir();
        let b_dir = b.file_type().is_dir();
        b_dir.cmp(&a_dir).then_with(|| a.file_name().cmp(b.file_name()))
    });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("skipping unreadable entry in {}: {}", root.display(), err);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let key = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        match std::fs::read(entry.path()) {
            Ok(bytes) => {
                entries.insert(key, STANDARD.encode(bytes));
            }
            Err(err) => warn!("skipping {}: {}", entry.path().display(), err),
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_nested_directories_come_first() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("b/c")).unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join("b/b.txt"), "b").unwrap();
        fs::write(dir.path().join("b/c/c.txt"), "c").unwrap();

        let packed = pack_directory(dir.path());
        let keys: Vec<_> = packed.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b/c/c.txt", "b/b.txt", "a.txt"]);
        assert_eq!(packed["a.txt"], "YQ==");
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(pack_directory(&dir.path().join("missing")).is_empty());
    }
}
