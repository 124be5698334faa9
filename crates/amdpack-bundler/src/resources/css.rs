//! CSS `@import` resolution for `css!` resources.
//!
//! The root stylesheet and everything it imports are read depth-first and
//! concatenated dependencies-first, each file appearing once with its own
//! `@import` statements removed.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use indexmap::{IndexMap, IndexSet};
use once_cell::sync::Lazy;
use path_clean::PathClean;
use regex::Regex;
use tracing::trace;

static IMPORT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"@import\s*["']([^"']+)["']\s*;?\s*"#).expect("valid @import pattern")
});

/// Errors raised while resolving a stylesheet.
#[derive(Debug, thiserror::Error)]
pub enum CssError {
    #[error("css file '{}' not found.", .0.display())]
    NotFound(PathBuf),

    #[error("cyclic css @import detected.{}", format_chain(.chain))]
    CyclicImport {
        /// Import chain from the root to the re-entered file
        chain: Vec<PathBuf>,
    },

    #[error("unable to read css file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn format_chain(chain: &[PathBuf]) -> String {
    let mut out = String::new();
    for (depth, path) in chain.iter().enumerate() {
        let _ = write!(out, "\n{} ↪ {}", " ".repeat(depth), path.display());
    }
    out
}

/// One parsed stylesheet.
#[derive(Debug, Clone)]
struct CssFile {
    content: String,
    includes: Vec<PathBuf>,
}

/// Reads a stylesheet and inlines its imports.
pub struct CssReader {
    path: PathBuf,
    resolving: IndexSet<PathBuf>,
    resolved: IndexMap<PathBuf, CssFile>,
}

impl CssReader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: absolute(path.as_ref()),
            resolving: IndexSet::new(),
            resolved: IndexMap::new(),
        }
    }

    /// Resolve the root stylesheet and return the concatenated content.
    pub fn read(mut self) -> Result<String, CssError> {
        let root = self.path.clone();
        self.load(&root)?;
        let contents: Vec<&str> = self
            .resolved
            .values()
            .map(|file| file.content.as_str())
            .collect();
        Ok(contents.join("\n"))
    }

    fn load(&mut self, path: &Path) -> Result<(), CssError> {
        if self.resolved.contains_key(path) {
            return Ok(());
        }
        if self.resolving.contains(path) {
            let mut chain: Vec<PathBuf> = self.resolving.iter().cloned().collect();
            chain.push(path.to_path_buf());
            return Err(CssError::CyclicImport { chain });
        }

        self.resolving.insert(path.to_path_buf());
        let file = parse(path)?;
        for include in &file.includes {
            self.load(include)?;
        }
        self.resolving.shift_remove(path);
        self.resolved.insert(path.to_path_buf(), file);
        Ok(())
    }
}

fn parse(path: &Path) -> Result<CssFile, CssError> {
    if !path.is_file() {
        return Err(CssError::NotFound(path.to_path_buf()));
    }
    let raw = std::fs::read_to_string(path).map_err(|source| CssError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    let includes: Vec<PathBuf> = IMPORT_PATTERN
        .captures_iter(&raw)
        .map(|caps| dir.join(&caps[1]).clean())
        .collect();
    trace!("{} imports {} stylesheet(s)", path.display(), includes.len());

    let content = IMPORT_PATTERN.replace_all(&raw, "").into_owned();
    Ok(CssFile { content, includes })
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.clean();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path).clean(),
        Err(_) => path.clean(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_imports_come_first() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.css", "@import \"b.css\"; .a{}");
        write(&dir, "b.css", ".b{}");

        let content = CssReader::new(&a).read().unwrap();
        assert_eq!(content, ".b{}\n.a{}");
    }

    #[test]
    fn test_shared_import_is_emitted_once() {
        let dir = TempDir::new().unwrap();
        let root = write(
            &dir,
            "root.css",
            "@import './theme/a.css';\n@import './theme/b.css';\nbody{}",
        );
        write(&dir, "theme/a.css", "@import 'base.css';\n.a{}");
        write(&dir, "theme/b.css", "@import \"base.css\";\n.b{}");
        write(&dir, "theme/base.css", ".base{}");

        let content = CssReader::new(&root).read().unwrap();
        assert_eq!(content, ".base{}\n.a{}\n.b{}\nbody{}");
    }

    #[test]
    fn test_cyclic_import_names_chain() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.css", "@import \"b.css\"; .a{}");
        let b = write(&dir, "b.css", "@import \"a.css\";");

        let err = CssReader::new(&a).read().unwrap_err();
        match &err {
            CssError::CyclicImport { chain } => {
                assert_eq!(chain.len(), 3);
                assert_eq!(chain[0], a.clean());
                assert_eq!(chain[1], b.clean());
                assert_eq!(chain[2], a.clean());
            }
            other => panic!("expected cyclic import, got {:?}", other),
        }
        let message = err.to_string();
        assert!(message.contains("a.css"));
        assert!(message.contains("b.css"));
        assert!(message.contains("\n  ↪ "));
    }

    #[test]
    fn test_missing_import_is_not_found() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.css", "@import \"missing.css\";");

        let err = CssReader::new(&a).read().unwrap_err();
        match err {
            CssError::NotFound(path) => assert!(path.ends_with("missing.css")),
            other => panic!("expected not found, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_root_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = CssReader::new(dir.path().join("nope.css")).read().unwrap_err();
        assert!(matches!(err, CssError::NotFound(_)));
    }
}
