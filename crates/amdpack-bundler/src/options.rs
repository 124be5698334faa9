use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::loader::EsTarget;

/// Configuration for a single bundling pass.
///
/// Use the builder methods for ergonomic configuration, or construct
/// directly for full control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BundleOptions {
    /// ES level of the loader runtime (default: es3).
    pub es_target: EsTarget,

    /// Directory resource paths are resolved against.
    pub project_root: PathBuf,

    /// Module resolved by the loader instead of the last `define`.
    pub entry_point: Option<String>,

    /// How the entry module's exports leave the bundle (default: discarded).
    pub export_as: ExportAs,

    /// Host globals exposed to the bundle as modules.
    pub import_as: Vec<ImportAs>,
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self::new(".")
    }
}

impl BundleOptions {
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            es_target: EsTarget::default(),
            project_root: project_root.as_ref().to_path_buf(),
            entry_point: None,
            export_as: ExportAs::None,
            import_as: Vec::new(),
        }
    }

    pub fn es_target(mut self, target: EsTarget) -> Self {
        self.es_target = target;
        self
    }

    pub fn entry_point(mut self, name: impl Into<String>) -> Self {
        self.entry_point = Some(name.into());
        self
    }

    pub fn export_as(mut self, export_as: ExportAs) -> Self {
        self.export_as = export_as;
        self
    }

    /// Add one import-as binding. Bindings keep their insertion order.
    pub fn import_as(mut self, import: ImportAs) -> Self {
        self.import_as.push(import);
        self
    }
}

/// Where the entry module's exports are assigned.
///
/// Serialized as an optional string: absent for `None`, `"commonjs"` for
/// `CommonJs`, anything else is a global variable name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum ExportAs {
    /// Result of the loader is discarded
    #[default]
    None,
    /// `module.exports = (function () { ... })();`
    CommonJs,
    /// `var <name> = (function () { ... })();`
    Global(String),
}

impl ExportAs {
    pub const COMMONJS: &'static str = "commonjs";
}

impl From<Option<String>> for ExportAs {
    fn from(value: Option<String>) -> Self {
        match value {
            None => ExportAs::None,
            Some(name) if name == Self::COMMONJS => ExportAs::CommonJs,
            Some(name) => ExportAs::Global(name),
        }
    }
}

impl From<ExportAs> for Option<String> {
    fn from(value: ExportAs) -> Self {
        match value {
            ExportAs::None => None,
            ExportAs::CommonJs => Some(ExportAs::COMMONJS.to_string()),
            ExportAs::Global(name) => Some(name),
        }
    }
}

/// Shape of the synthetic module created for an import-as binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportKind {
    /// `import X from "m"`: the global is the default export
    Default,
    /// `import * as X from "m"`: the global is the module itself
    Namespace,
}

/// Binds the host global `outer` to the module name `inner`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportAs {
    #[serde(rename = "type")]
    pub kind: ImportKind,
    pub outer: String,
    pub inner: String,
}

impl ImportAs {
    pub fn new(kind: ImportKind, outer: impl Into<String>, inner: impl Into<String>) -> Self {
        Self {
            kind,
            outer: outer.into(),
            inner: inner.into(),
        }
    }
}
