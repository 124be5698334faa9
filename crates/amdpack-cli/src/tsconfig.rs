//! Default compiler target and output path for an input file.
//!
//! Scripts compile next to themselves at es3. A `tsconfig.json` is read
//! (comments and trailing commas allowed) and its `compilerOptions` decide,
//! falling back to `bundle.js` beside the tsconfig.

use std::path::{Path, PathBuf};

use amdpack_bundler::EsTarget;
use jsonc_parser::ParseOptions;
use serde::Deserialize;
use tracing::debug;

use crate::compiler::CompileKind;
use crate::error::{CliError, Result, ResultExt};
use crate::ui;

const DEFAULT_BUNDLE: &str = "bundle.js";

/// Target and output file derived from the input alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileDefaults {
    pub es_target: EsTarget,
    pub out_file: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct TsConfig {
    compiler_options: TsCompilerOptions,
    files: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct TsCompilerOptions {
    target: Option<String>,
    out_file: Option<String>,
    out_dir: Option<String>,
}

impl CompileDefaults {
    pub fn resolve(kind: CompileKind, input: &Path) -> Result<Self> {
        match kind {
            CompileKind::Script => Ok(Self::for_script(input)),
            CompileKind::Project => Self::for_project(input),
        }
    }

    /// `<dir>/<stem>.js` at es3.
    pub fn for_script(script: &Path) -> Self {
        let dir = script.parent().unwrap_or_else(|| Path::new(""));
        Self {
            es_target: EsTarget::Es3,
            out_file: dir.join(js_name(script)),
        }
    }

    pub fn for_project(tsconfig_path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(tsconfig_path).with_path(tsconfig_path)?;
        let config = parse_tsconfig(&text)
            .map_err(CliError::Custom)
            .context(format!("{} is not a valid tsconfig", tsconfig_path.display()))
            .with_hint("A tsconfig must be a JSON object (comments and trailing commas are allowed)")?;
        let dir = tsconfig_path.parent().unwrap_or_else(|| Path::new(""));
        let defaults = Self::from_tsconfig(dir, &config);
        debug!(
            "tsconfig defaults: target={} out_file={}",
            defaults.es_target,
            defaults.out_file.display()
        );
        Ok(defaults)
    }

    fn from_tsconfig(dir: &Path, config: &TsConfig) -> Self {
        let options = &config.compiler_options;
        let es_target = options
            .target
            .as_deref()
            .map(EsTarget::from_name)
            .unwrap_or_default();

        let out_file = if let Some(out_file) = &options.out_file {
            dir.join(out_file)
        } else if let Some(out_dir) = &options.out_dir {
            let out_dir = dir.join(out_dir);
            match last_source_file(&config.files) {
                Some(file) => out_dir.join(js_name(Path::new(file))),
                None => out_dir.join(DEFAULT_BUNDLE),
            }
        } else {
            let out_file = match last_source_file(&config.files) {
                Some(file) => dir.join(js_name(Path::new(file))),
                None => dir.join(DEFAULT_BUNDLE),
            };
            ui::debug(&format!(
                "tsconfig sets neither outFile nor outDir, writing {}",
                out_file.display()
            ));
            out_file
        };

        Self {
            es_target,
            out_file,
        }
    }
}

fn parse_tsconfig(text: &str) -> std::result::Result<TsConfig, String> {
    let value = jsonc_parser::parse_to_serde_value(text, &ParseOptions::default())
        .map_err(|e| e.to_string())?;
    match value {
        Some(value) => serde_json::from_value(value).map_err(|e| e.to_string()),
        None => Ok(TsConfig::default()),
    }
}

/// The last `files` entry, if it is a non-declaration TypeScript source.
fn last_source_file(files: &[String]) -> Option<&str> {
    let last = files.last()?;
    let is_source = last.ends_with(".ts") || last.ends_with(".tsx");
    (is_source && !last.ends_with(".d.ts")).then_some(last.as_str())
}

fn js_name(source: &Path) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "bundle".to_string());
    format!("{}.js", stem)
}
