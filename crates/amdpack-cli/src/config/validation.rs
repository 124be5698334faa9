use amdpack_bundler::ExportAs;

use crate::config::AmdpackConfig;
use crate::error::{ConfigError, Result};

const MAX_DEBOUNCE_MS: u64 = 10_000;

/// True for a JavaScript identifier (`MyLib`, `_x`, `$`).
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// True for a host global or module name usable in `--import-as`:
/// letters, digits, `_`, `$` and `-`.
pub fn is_import_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '$' || c == '-')
}

/// Validate an export-as value: `"commonjs"` or an identifier.
pub fn validate_export_as(value: &str) -> Result<()> {
    if value == ExportAs::COMMONJS || is_identifier(value) {
        return Ok(());
    }
    Err(ConfigError::InvalidValue {
        field: "exportAs".to_string(),
        value: value.to_string(),
        hint: "Must be 'commonjs' or a JavaScript identifier".to_string(),
    }
    .into())
}

impl AmdpackConfig {
    /// Validate configuration for logical consistency.
    pub fn validate(&self) -> Result<()> {
        if self.input.is_none() {
            return Err(ConfigError::MissingField {
                field: "input".to_string(),
                hint: "Pass an input file, e.g. 'amdpack build src/index.ts'".to_string(),
            }
            .into());
        }

        if let Some(export_as) = &self.export_as {
            validate_export_as(export_as)?;
        }

        for import in &self.import_as {
            if !is_import_name(&import.outer) || !is_import_name(&import.inner) {
                return Err(ConfigError::InvalidValue {
                    field: "importAs".to_string(),
                    value: format!("{}={}", import.outer, import.inner),
                    hint: "Use <global>=<module> with letters, digits, '_', '$' or '-'".to_string(),
                }
                .into());
            }
        }

        if matches!(&self.entry_point, Some(name) if name.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "entryPoint".to_string(),
                value: String::new(),
                hint: "Entry point must name a module".to_string(),
            }
            .into());
        }

        if self.compiler.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "compiler".to_string(),
                value: String::new(),
                hint: "Set the compiler program, e.g. 'tsc'".to_string(),
            }
            .into());
        }

        if self.debounce_ms == 0 || self.debounce_ms > MAX_DEBOUNCE_MS {
            return Err(ConfigError::InvalidValue {
                field: "debounceMs".to_string(),
                value: self.debounce_ms.to_string(),
                hint: format!("Must be between 1 and {}", MAX_DEBOUNCE_MS),
            }
            .into());
        }

        if self.settle_tick_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "settleTickMs".to_string(),
                value: "0".to_string(),
                hint: "Must be greater than 0".to_string(),
            }
            .into());
        }

        if self.settle_timeout_ms < self.settle_tick_ms {
            return Err(ConfigError::InvalidValue {
                field: "settleTimeoutMs".to_string(),
                value: self.settle_timeout_ms.to_string(),
                hint: format!("Must be at least settleTickMs ({})", self.settle_tick_ms),
            }
            .into());
        }

        Ok(())
    }
}
