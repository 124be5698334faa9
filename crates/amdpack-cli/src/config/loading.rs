use std::path::{Path, PathBuf};

use amdpack_bundler::{EsTarget, ImportAs};
use figment::{
    providers::{Env, Format as _, Json, Serialized},
    Figment,
};
use serde::Serialize;
use tracing::debug;

use crate::cli::BuildArgs;
use crate::config::AmdpackConfig;
use crate::error::{ConfigError, Result};

/// Config file picked up from the working directory.
pub const CONFIG_FILE: &str = "amdpack.config.json";

/// Prefix of environment overrides (`AMDPACK_OUT_FILE`, `AMDPACK_WATCH`, ...).
pub const ENV_PREFIX: &str = "AMDPACK_";

/// Fields that may be set from the environment.
const ENV_FIELDS: &[&str] = &[
    "input",
    "outFile",
    "target",
    "exportAs",
    "entryPoint",
    "projectRoot",
    "watch",
    "compiler",
    "debounceMs",
    "settleTickMs",
    "settleTimeoutMs",
];

/// Map a prefix-stripped environment key (`out_file`) to its config field
/// (`outFile`). Keys that name no field are dropped.
pub fn env_key(key: &str) -> Option<String> {
    let mut field = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            field.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            field.push(c.to_ascii_lowercase());
        }
    }
    ENV_FIELDS.contains(&field.as_str()).then_some(field)
}

/// The subset of the config given on the command line.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    input: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    out_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<EsTarget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    export_as: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    import_as: Vec<ImportAs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    entry_point: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    project_root: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    watch: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    compiler: Option<String>,
}

impl From<&BuildArgs> for CliOverrides {
    fn from(args: &BuildArgs) -> Self {
        let import_as = args
            .import_as
            .iter()
            .chain(args.import_as_default.iter())
            .cloned()
            .collect();

        Self {
            input: args.input.clone(),
            out_file: args.out_file.clone(),
            target: args.target,
            export_as: args.export_as.clone(),
            import_as,
            entry_point: args.entry_point.clone(),
            project_root: args.project_root.clone(),
            watch: args.watch.then_some(true),
            compiler: args.compiler.clone(),
        }
    }
}

impl AmdpackConfig {
    /// Load configuration from multiple sources.
    /// Priority: CLI args > environment variables > config file > defaults
    pub fn load(args: &BuildArgs) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = Self::config_file(args.config.as_deref())? {
            debug!("loading config from {}", path.display());
            figment = figment.merge(Json::file(path));
        }

        figment = figment
            .merge(
                // `filter_map` resets `lowercase`, so it must come first.
                Env::prefixed(ENV_PREFIX)
                    .filter_map(|key| env_key(key.as_str()).map(Into::into))
                    .lowercase(false),
            )
            .merge(Serialized::defaults(CliOverrides::from(args)));

        figment.extract().map_err(|e| {
            ConfigError::InvalidValue {
                field: "configuration".to_string(),
                value: e.to_string(),
                hint: format!("Check {} syntax and field types", CONFIG_FILE),
            }
            .into()
        })
    }

    /// An explicit `--config` must exist; the default file is optional.
    fn config_file(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        match explicit {
            Some(path) if path.is_file() => Ok(Some(path.to_path_buf())),
            Some(path) => Err(ConfigError::NotFound(path.to_path_buf()).into()),
            None => {
                let default_path = Path::new(CONFIG_FILE);
                Ok(default_path.is_file().then(|| default_path.to_path_buf()))
            }
        }
    }
}
