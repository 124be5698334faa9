//! Loader synthesis.
//!
//! Wraps a resource-transformed bundle in a small AMD runtime so the result
//! can run without an external module loader:
//!
//! ```text
//! <export prefix>(function () {
//!     ...runtime header...
//!     <import-as modules>
//!     <bundle body>
//!     'marker:resolver';
//!     ...runtime footer, resolves the entry module...
//! })();
//! ```

mod target;
mod template;

pub use target::{Capabilities, EsTarget};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::options::{BundleOptions, ExportAs, ImportAs, ImportKind};
use crate::Result;

/// Present in every synthesized bundle.
pub const RESOLVER_MARKER: &str = "'marker:resolver';";

/// Options consumed by [`Loader::transform`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoaderOptions {
    pub es_target: EsTarget,
    pub entry_point: Option<String>,
    pub export_as: ExportAs,
    pub import_as: Vec<ImportAs>,
}

impl From<&BundleOptions> for LoaderOptions {
    fn from(options: &BundleOptions) -> Self {
        Self {
            es_target: options.es_target,
            entry_point: options.entry_point.clone(),
            export_as: options.export_as.clone(),
            import_as: options.import_as.clone(),
        }
    }
}

pub struct Loader;

impl Loader {
    /// Runtime header and footer for `target`.
    pub fn template(target: EsTarget) -> Result<(String, String)> {
        template::render(&target.capabilities())
    }

    pub fn transform(options: &LoaderOptions, code: &str) -> Result<String> {
        let (header, footer) = Self::template(options.es_target)?;
        debug!(target = %options.es_target, "wrapping bundle in loader runtime");

        let mut body = Vec::with_capacity(options.import_as.len() + 2);
        for import in &options.import_as {
            body.push(Self::import_fragment(import)?);
        }
        body.push(code.to_string());
        body.push(RESOLVER_MARKER.to_string());

        let entry = match &options.entry_point {
            Some(name) => serde_json::to_string(name)?,
            None => "entry[0]".to_string(),
        };
        let footer = footer.replacen(template::ENTRY_MARKER, &entry, 1);

        Ok([
            format!("{}{}", Self::export_prefix(&options.export_as), header),
            indent(&body.join("\n")),
            footer,
        ]
        .join("\n"))
    }

    fn export_prefix(export_as: &ExportAs) -> String {
        match export_as {
            ExportAs::None => String::new(),
            ExportAs::CommonJs => "module.exports = ".to_string(),
            ExportAs::Global(name) => format!("var {} = ", name),
        }
    }

    /// A module named `inner` whose default export is the host global `outer`.
    fn import_fragment(import: &ImportAs) -> Result<String> {
        let flag = match import.kind {
            ImportKind::Default => "__esModule",
            ImportKind::Namespace => "__cjsModule",
        };
        Ok(format!(
            "define({}, [\"exports\"], function (exports) {{\n    exports.{} = true;\n    exports[\"default\"] = host[{}];\n}});",
            serde_json::to_string(&import.inner)?,
            flag,
            serde_json::to_string(&import.outer)?,
        ))
    }
}

fn indent(code: &str) -> String {
    code.split('\n')
        .map(|line| format!("    {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = "define(\"index\", [\"require\", \"exports\"], function (require, exports) {\n});";

    fn options() -> LoaderOptions {
        LoaderOptions::default()
    }

    #[test]
    fn test_export_prefixes() {
        let none = Loader::transform(&options(), BODY).unwrap();
        assert!(none.starts_with("(function () {"));

        let commonjs = LoaderOptions {
            export_as: ExportAs::CommonJs,
            ..options()
        };
        let out = Loader::transform(&commonjs, BODY).unwrap();
        assert!(out.starts_with("module.exports = (function () {"));

        let global = LoaderOptions {
            export_as: ExportAs::Global("Foo".into()),
            ..options()
        };
        let out = Loader::transform(&global, BODY).unwrap();
        assert!(out.starts_with("var Foo = (function () {"));
    }

    #[test]
    fn test_body_is_indented_and_marked() {
        let out = Loader::transform(&options(), BODY).unwrap();
        assert!(out.contains(
            "\n    define(\"index\", [\"require\", \"exports\"], function (require, exports) {\n    });\n    'marker:resolver';\n"
        ));
    }

    #[test]
    fn test_entry_defaults_to_last_define() {
        let out = Loader::transform(&options(), BODY).unwrap();
        assert!(out.contains("return resolve(entry[0]);"));
        assert!(!out.contains("marker:entry"));
    }

    #[test]
    fn test_explicit_entry_point() {
        let opts = LoaderOptions {
            entry_point: Some("lib/main".into()),
            ..options()
        };
        let out = Loader::transform(&opts, BODY).unwrap();
        assert!(out.contains("return resolve(\"lib/main\");"));
    }

    #[test]
    fn test_import_as_fragments() {
        let opts = LoaderOptions {
            import_as: vec![
                ImportAs::new(ImportKind::Default, "React", "react"),
                ImportAs::new(ImportKind::Namespace, "THREE", "three"),
            ],
            ..options()
        };
        let out = Loader::transform(&opts, BODY).unwrap();
        assert!(out.contains("    define(\"react\", [\"exports\"], function (exports) {\n        exports.__esModule = true;\n        exports[\"default\"] = host[\"React\"];\n    });"));
        assert!(out.contains("exports.__cjsModule = true;\n        exports[\"default\"] = host[\"THREE\"];"));
        let react = out.find("define(\"react\"").unwrap();
        let index = out.find("define(\"index\"").unwrap();
        assert!(react < index);
    }

    #[test]
    fn test_target_selects_runtime_flavour() {
        let opts = LoaderOptions {
            es_target: EsTarget::Es2015,
            ..options()
        };
        let out = Loader::transform(&opts, BODY).unwrap();
        assert!(out.contains("const instances = {};"));
        assert!(out.contains("definition.factory(...dependencies);"));
    }
}
