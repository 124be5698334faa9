use std::str::FromStr;

use amdpack_bundler::{EsTarget, ImportAs, ImportKind};

use crate::config::{is_identifier, is_import_name};

/// Parse an ES target name, case-insensitively.
pub fn parse_target(s: &str) -> Result<EsTarget, String> {
    EsTarget::from_str(s)
}

/// Parse `--export-as`: `commonjs` or a JavaScript identifier.
///
/// Valid: commonjs, MyLibrary, _internal, $jquery
/// Invalid: 123abc, my-lib, my.lib, ""
pub fn parse_export_as(s: &str) -> Result<String, String> {
    if s.is_empty() {
        return Err("Export name cannot be empty".to_string());
    }
    if s == "commonjs" || is_identifier(s) {
        return Ok(s.to_string());
    }
    Err(format!(
        "Export name must be 'commonjs' or a JavaScript identifier: '{}'",
        s
    ))
}

/// Parse a `<global>=<module>` pair as a namespace import.
pub fn parse_import_as(s: &str) -> Result<ImportAs, String> {
    parse_pair(s, ImportKind::Namespace)
}

/// Parse a `<global>=<module>` pair as a default import.
pub fn parse_import_as_default(s: &str) -> Result<ImportAs, String> {
    parse_pair(s, ImportKind::Default)
}

fn parse_pair(s: &str, kind: ImportKind) -> Result<ImportAs, String> {
    let (outer, inner) = s
        .split_once('=')
        .ok_or_else(|| format!("Expected <global>=<module>, got '{}'", s))?;
    if !is_import_name(outer) || !is_import_name(inner) {
        return Err(format!(
            "Expected <global>=<module> with letters, digits, '_', '$' or '-', got '{}'",
            s
        ));
    }
    Ok(ImportAs::new(kind, outer, inner))
}
