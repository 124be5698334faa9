//! Configuration for amdpack builds.
//!
//! Merges settings from CLI args, environment variables, and an
//! `amdpack.config.json` file.
//! Priority: CLI > Environment > File > Defaults

mod defaults;
mod loading;
mod validation;

use std::path::PathBuf;
use std::time::Duration;

use amdpack_bundler::{BundleOptions, EsTarget, ExportAs, ImportAs};
use serde::{Deserialize, Serialize};

use crate::compiler::SettleOptions;

pub use defaults::*;
pub use loading::{env_key, CONFIG_FILE, ENV_PREFIX};
pub use validation::*;

/// amdpack configuration, loaded from `amdpack.config.json` or CLI args.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AmdpackConfig {
    /// TypeScript script or tsconfig to compile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<PathBuf>,

    /// Bundle path (default: derived from the input)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_file: Option<PathBuf>,

    /// Compiler and loader ES target (default: derived from the input)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<EsTarget>,

    /// `"commonjs"` or a global variable name for the entry exports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_as: Option<String>,

    /// Host globals exposed to the bundle as modules
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub import_as: Vec<ImportAs>,

    /// Module resolved instead of the last `define`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,

    /// Resource lookup root (default: the input's directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_root: Option<PathBuf>,

    /// Keep the compiler running and rebundle on every emit
    #[serde(default)]
    pub watch: bool,

    /// Compiler program
    #[serde(default = "default_compiler")]
    pub compiler: String,

    /// Quiet period before an output change is read
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Poll interval while waiting for a late emit
    #[serde(default = "default_settle_tick_ms")]
    pub settle_tick_ms: u64,

    /// How long to wait for a late emit after the compiler exits
    #[serde(default = "default_settle_timeout_ms")]
    pub settle_timeout_ms: u64,
}

impl Default for AmdpackConfig {
    fn default() -> Self {
        Self {
            input: None,
            out_file: None,
            target: None,
            export_as: None,
            import_as: Vec::new(),
            entry_point: None,
            project_root: None,
            watch: false,
            compiler: default_compiler(),
            debounce_ms: default_debounce_ms(),
            settle_tick_ms: default_settle_tick_ms(),
            settle_timeout_ms: default_settle_timeout_ms(),
        }
    }
}

impl AmdpackConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn settle(&self) -> SettleOptions {
        SettleOptions {
            tick: Duration::from_millis(self.settle_tick_ms),
            timeout: Duration::from_millis(self.settle_timeout_ms),
        }
    }

    /// Bundler options for the resolved target and project root.
    pub fn bundle_options(&self, es_target: EsTarget, project_root: PathBuf) -> BundleOptions {
        BundleOptions {
            es_target,
            project_root,
            entry_point: self.entry_point.clone(),
            export_as: ExportAs::from(self.export_as.clone()),
            import_as: self.import_as.clone(),
        }
    }
}
