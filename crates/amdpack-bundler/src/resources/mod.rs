//! Resource materialization.
//!
//! Every `directive!path` dependency found by the [`AmdReader`] becomes a
//! small module of its own, prepended to the bundle body. Resource paths are
//! resolved against the configured project root.

pub mod css;
pub mod directory;
mod render;

use std::path::Path;

use path_clean::PathClean;
use tracing::debug;

use crate::reader::{AmdReader, Directive, ResourceDefine};
use crate::Result;

pub use directory::pack_directory;

/// Injects resource modules into an AMD bundle.
pub struct Resources;

impl Resources {
    /// Read `code`, rewrite resource dependencies to their keys and prepend one
    /// module per resource.
    pub fn transform(project_root: impl AsRef<Path>, code: &str) -> Result<String> {
        let project_root = project_root.as_ref();
        let document = AmdReader::read(code)?;
        let body = document.remap(code);

        let mut parts = Vec::new();
        for resource in document.resources() {
            parts.push(Self::materialize(project_root, resource)?);
        }
        debug!("materialized {} resource module(s)", parts.len());
        parts.push(body);
        Ok(parts.join("\n"))
    }

    /// Render one resource as a `define` fragment.
    pub fn materialize(project_root: &Path, resource: &ResourceDefine) -> Result<String> {
        let path = project_root.join(&resource.source_path).clean();
        let value = match resource.directive {
            Directive::Text => render::text(&path)?,
            Directive::Json => render::json(&path)?,
            Directive::Base64 => render::base64(&path)?,
            Directive::Buffer => render::buffer(&path),
            Directive::Css => render::css(&path)?,
            Directive::Directory => render::directory(&path)?,
        };
        render::define(&resource.name, &value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_transform_prepends_fragments() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("lib")).unwrap();
        fs::write(dir.path().join("lib/a.txt"), "hello").unwrap();

        let code = concat!(
            "define(\"lib/mod\", [\"require\", \"exports\", \"text!./a.txt\"], function (require, exports, a) {\n",
            "    exports.a = a.default;\n",
            "});\n",
            "define(\"index\", [\"require\", \"exports\", \"lib/mod\"], function (require, exports, m) {\n",
            "});\n",
        );
        let out = Resources::transform(dir.path(), code).unwrap();

        assert!(out.starts_with("define(\"text!lib/a.txt\", [\"exports\"]"));
        assert!(out.contains("exports[\"default\"] = \"hello\";"));
        assert!(out.contains(
            "define(\"lib/mod\", [\"require\", \"exports\", \"text!lib/a.txt\"], function"
        ));
    }

    #[test]
    fn test_transform_without_resources_keeps_body() {
        let code = "define(\"index\", [\"require\", \"exports\"], function (require, exports) {\n});\n";
        let out = Resources::transform("/nonexistent", code).unwrap();
        assert_eq!(out, code);
    }

    #[test]
    fn test_malformed_define_is_an_error() {
        let code = "define(\"index\" [\"exports\"], function (exports) {\n});\n";
        let err = Resources::transform("/", code).unwrap_err();
        assert!(err.to_string().contains("malformed define on line 1"));
    }
}
