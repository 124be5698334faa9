//! Per-directive encoders.
//!
//! Every encoder returns a JavaScript expression. Load failures never
//! propagate: each directive falls back to a fixed value and logs a warning.

use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};
use tracing::warn;

use super::css::CssReader;
use super::directory::pack_directory;
use crate::Result;

/// Wrap an encoded value in a resource module.
pub(crate) fn define(name: &str, value: &str) -> Result<String> {
    Ok(format!(
        "define({}, [\"exports\"], function (exports) {{\n    exports.__esModule = true;\n    exports[\"default\"] = {};\n}});",
        js_string(name)?,
        value
    ))
}

/// Quote `value` as a JavaScript string literal.
pub(crate) fn js_string(value: &str) -> Result<String> {
    let quoted = serde_json::to_string(value)?;
    Ok(quoted.replace('\u{2028}', "\\u2028").replace('\u{2029}', "\\u2029"))
}

pub(crate) fn text(path: &Path) -> Result<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => js_string(&content),
        Err(err) => {
            warn!("unable to load text resource {}: {}", path.display(), err);
            Ok("\"\"".to_string())
        }
    }
}

pub(crate) fn json(path: &Path) -> Result<String> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            warn!("unable to load json resource {}: {}", path.display(), err);
            return format_json(&json!({ "error": "unable to load resource" }));
        }
    };
    match serde_json::from_str::<Value>(&content) {
        Ok(value) => format_json(&value),
        Err(err) => {
            warn!("invalid json in {}: {}", path.display(), err);
            Ok(serde_json::to_string(&json!({ "error": err.to_string() }))?)
        }
    }
}

pub(crate) fn base64(path: &Path) -> Result<String> {
    match std::fs::read(path) {
        Ok(bytes) => js_string(&STANDARD.encode(bytes)),
        Err(err) => {
            warn!("unable to load base64 resource {}: {}", path.display(), err);
            Ok("\"\"".to_string())
        }
    }
}

pub(crate) fn buffer(path: &Path) -> String {
    match std::fs::read(path) {
        Ok(bytes) => {
            let items: Vec<String> = bytes.iter().map(u8::to_string).collect();
            format!("new Uint8Array([{}])", items.join(","))
        }
        Err(err) => {
            warn!("unable to load buffer resource {}: {}", path.display(), err);
            "new Uint8Array([])".to_string()
        }
    }
}

pub(crate) fn directory(path: &Path) -> Result<String> {
    let packed = pack_directory(path);
    if packed.is_empty() && !path.is_dir() {
        warn!("directory resource {} not found", path.display());
    }
    format_json(&serde_json::to_value(packed)?)
}

pub(crate) fn css(path: &Path) -> Result<String> {
    let content = match CssReader::new(path).read() {
        Ok(content) => content,
        Err(err) => {
            warn!("{}", err);
            return Ok("\"\"".to_string());
        }
    };
    let lines = content
        .split('\n')
        .map(|line| js_string(&line.replace('\r', "")).map(|quoted| format!("        {}", quoted)))
        .collect::<Result<Vec<_>>>()?;
    Ok(format!("[\n{}\n    ].join('\\n')", lines.join(",\n")))
}

/// Pretty-print with continuation lines indented to sit inside `define`.
fn format_json(value: &Value) -> Result<String> {
    let pretty = serde_json::to_string_pretty(value)?;
    Ok(pretty.replace('\n', "\n    "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_define_wraps_value() {
        let out = define("text!a.txt", "\"hi\"").unwrap();
        assert_eq!(
            out,
            "define(\"text!a.txt\", [\"exports\"], function (exports) {\n    exports.__esModule = true;\n    exports[\"default\"] = \"hi\";\n});"
        );
    }

    #[test]
    fn test_js_string_escapes_line_separators() {
        let quoted = js_string("a\u{2028}b\"c\n").unwrap();
        assert_eq!(quoted, "\"a\\u2028b\\\"c\\n\"");
    }

    #[test]
    fn test_json_keeps_key_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, r#"{"z": 1, "a": [true]}"#).unwrap();
        let out = json(&path).unwrap();
        assert_eq!(out, "{\n      \"z\": 1,\n      \"a\": [\n        true\n      ]\n    }");
    }

    #[test]
    fn test_json_fallbacks() {
        let dir = TempDir::new().unwrap();
        let missing = json(&dir.path().join("missing.json")).unwrap();
        assert_eq!(missing, "{\n      \"error\": \"unable to load resource\"\n    }");

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{ nope").unwrap();
        let out = json(&bad).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        assert!(value["error"].as_str().unwrap().contains("key must be a string"));
    }

    #[test]
    fn test_binary_encoders() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bin");
        fs::write(&path, [1u8, 2, 255]).unwrap();
        assert_eq!(buffer(&path), "new Uint8Array([1,2,255])");
        assert_eq!(base64(&path).unwrap(), "\"AQL/\"");

        let missing = dir.path().join("missing");
        assert_eq!(buffer(&missing), "new Uint8Array([])");
        assert_eq!(base64(&missing).unwrap(), "\"\"");
    }

    #[test]
    fn test_css_renders_line_array() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.css");
        fs::write(&path, ".a {\r\n  content: \"x\";\r\n}").unwrap();
        let out = css(&path).unwrap();
        assert_eq!(
            out,
            "[\n        \".a {\",\n        \"  content: \\\"x\\\";\",\n        \"}\"\n    ].join('\\n')"
        );
    }

    #[test]
    fn test_css_error_degrades_to_empty_string() {
        let dir = TempDir::new().unwrap();
        assert_eq!(css(&dir.path().join("missing.css")).unwrap(), "\"\"");
    }
}
