//! Shared test utilities for amdpack-bundler tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A throwaway project root with resource files.
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp project"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, content: impl AsRef<[u8]>) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create fixture directory");
        }
        fs::write(&path, content).expect("write fixture");
        path
    }
}

/// One compiler-shaped `define` with an empty factory body.
pub fn amd_module(name: &str, dependencies: &[&str]) -> String {
    let quoted: Vec<String> = dependencies.iter().map(|d| format!("\"{}\"", d)).collect();
    let params: Vec<String> = (0..dependencies.len()).map(|i| format!("d{}", i)).collect();
    format!(
        "define(\"{}\", [{}], function ({}) {{\n    \"use strict\";\n}});\n",
        name,
        quoted.join(", "),
        params.join(", ")
    )
}

/// Extract the JavaScript expression assigned to a resource's default export.
pub fn resource_value<'a>(output: &'a str, key: &str) -> &'a str {
    let header = format!("define(\"{}\", [\"exports\"], function (exports) {{", key);
    let start = output
        .find(&header)
        .unwrap_or_else(|| panic!("resource {} not found in output", key));
    let rest = &output[start..];
    let value_start = rest.find("exports[\"default\"] = ").expect("default export") + 21;
    let value_end = rest[value_start..].find(";\n").expect("end of default export");
    &rest[value_start..value_start + value_end]
}
