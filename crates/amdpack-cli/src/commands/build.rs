//! Build command implementation.
//!
//! Resolves the compiler and bundler options from the config, runs the
//! compiler through [`CompilerDriver`] and rewrites every new emit of the
//! output file into a bundle.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use amdpack_bundler::{BundleOptions, Bundler};
use async_trait::async_trait;
use tokio::signal;
use tracing::debug;

use crate::cli::BuildArgs;
use crate::compiler::{
    CompileHandler, CompileKind, CompilerDriver, CompilerInvocation, CompilerOptions,
    SettleOptions,
};
use crate::config::AmdpackConfig;
use crate::error::{CliError, Result, ResultExt};
use crate::tsconfig::CompileDefaults;
use crate::ui;

/// Everything needed for one build, resolved from the config.
#[derive(Debug, Clone)]
pub struct BuildPlan {
    pub compiler: CompilerOptions,
    pub invocation: CompilerInvocation,
    pub bundle: BundleOptions,
    pub settle: SettleOptions,
    pub debounce: Duration,
}

impl BuildPlan {
    /// Fill in target, output file and project root from the input when the
    /// config leaves them unset.
    pub fn resolve(config: &AmdpackConfig) -> Result<Self> {
        let input = config.input.clone().ok_or_else(|| {
            CliError::InvalidArgument("no input file given".to_string())
        })?;
        let kind = CompileKind::detect(&input).ok_or_else(|| {
            CliError::InvalidArgument(format!(
                "cannot bundle '{}'\n\nHint: Pass a .ts or .tsx script, or a tsconfig.json",
                input.display()
            ))
        })?;
        if !input.is_file() {
            return Err(CliError::FileNotFound(input));
        }

        let defaults = CompileDefaults::resolve(kind, &input)?;
        let es_target = config.target.unwrap_or(defaults.es_target);
        let out_file = config.out_file.clone().unwrap_or(defaults.out_file);
        let project_root = config
            .project_root
            .clone()
            .unwrap_or_else(|| input_directory(&input));

        let compiler = CompilerOptions {
            kind,
            es_target,
            in_file: input,
            out_file,
            watch: config.watch,
        };
        let invocation = CompilerInvocation::with_program(&config.compiler, &compiler);

        Ok(Self {
            compiler,
            invocation,
            bundle: config.bundle_options(es_target, project_root),
            settle: config.settle(),
            debounce: config.debounce(),
        })
    }
}

fn input_directory(input: &Path) -> PathBuf {
    match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Bundles each new compiler emit and writes it back to the output file.
pub struct BundleWriter {
    out_file: PathBuf,
    options: BundleOptions,
    bundles: usize,
    last_error: Option<CliError>,
}

impl BundleWriter {
    pub fn new(out_file: impl Into<PathBuf>, options: BundleOptions) -> Self {
        Self {
            out_file: out_file.into(),
            options,
            bundles: 0,
            last_error: None,
        }
    }

    /// Number of bundles written so far.
    pub fn bundles(&self) -> usize {
        self.bundles
    }

    /// The error from the most recent emit, if it failed.
    pub fn take_error(&mut self) -> Option<CliError> {
        self.last_error.take()
    }

    async fn write_bundle(&self, content: &str) -> Result<usize> {
        let bundle = Bundler::bundle(content, &self.options)?;
        tokio::fs::write(&self.out_file, &bundle)
            .await
            .context("unable to write bundle")?;
        Ok(bundle.len())
    }
}

#[async_trait]
impl CompileHandler for BundleWriter {
    fn on_diagnostic(&mut self, line: &str) {
        println!("{}", line);
    }

    async fn on_content(&mut self, content: String) {
        // Our own write-back shows up here as well.
        if !Bundler::should_bundle(&content) {
            debug!("{} is already bundled", self.out_file.display());
            return;
        }

        let start = Instant::now();
        match self.write_bundle(&content).await {
            Ok(size) => {
                self.bundles += 1;
                self.last_error = None;
                ui::success(&format!(
                    "Bundled {} ({}) in {}",
                    self.out_file.display(),
                    ui::format_size(size as u64),
                    ui::format_duration(start.elapsed())
                ));
            }
            Err(err) => {
                ui::error(&format!("Failed to bundle {}: {}", self.out_file.display(), err));
                self.last_error = Some(err);
            }
        }
    }
}

/// Execute the build command.
///
/// 1. Load and validate configuration (CLI > Env > File > Defaults)
/// 2. Resolve compiler and bundler options from the input
/// 3. Run the compiler, bundling each emit, until it exits or Ctrl+C
pub async fn execute(args: BuildArgs) -> Result<()> {
    let start_time = Instant::now();

    let config = AmdpackConfig::load(&args)?;
    config.validate()?;
    let plan = BuildPlan::resolve(&config)?;

    ui::info(&format!(
        "Compiling {} -> {} ({})",
        plan.compiler.in_file.display(),
        plan.compiler.out_file.display(),
        plan.compiler.es_target
    ));
    if plan.compiler.watch {
        ui::info("Watching for changes. Press Ctrl+C to stop");
    }

    let mut writer = BundleWriter::new(&plan.compiler.out_file, plan.bundle.clone());
    let mut driver = CompilerDriver::new(plan.settle, plan.debounce);

    let outcome = tokio::select! {
        result = driver.compile(&plan.invocation, &plan.compiler.out_file, &mut writer) => result?,
        _ = signal::ctrl_c() => {
            ui::info("Stopping compiler...");
            return Ok(());
        }
    };
    debug!("compile finished: {:?}", outcome);

    if let Some(err) = writer.take_error() {
        return Err(err);
    }
    if writer.bundles() == 0 {
        ui::warning(&format!(
            "Compiler produced no new output at {}",
            plan.compiler.out_file.display()
        ));
        return Ok(());
    }

    ui::success(&format!(
        "Build completed in {}",
        ui::format_duration(start_time.elapsed())
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use amdpack_bundler::EsTarget;
    use tempfile::TempDir;

    const EMIT: &str =
        "define(\"index\", [\"require\", \"exports\"], function (require, exports) {\n});\n";

    fn config(input: PathBuf) -> AmdpackConfig {
        AmdpackConfig {
            input: Some(input),
            ..AmdpackConfig::default()
        }
    }

    #[test]
    fn test_plan_for_script() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("main.ts");
        std::fs::write(&input, "export const x = 1;").unwrap();

        let plan = BuildPlan::resolve(&config(input.clone())).unwrap();
        assert_eq!(plan.compiler.kind, CompileKind::Script);
        assert_eq!(plan.compiler.es_target, EsTarget::Es3);
        assert_eq!(plan.compiler.out_file, dir.path().join("main.js"));
        assert_eq!(plan.bundle.project_root, dir.path());
        assert_eq!(plan.invocation.program, "tsc");
    }

    #[test]
    fn test_plan_overrides() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("tsconfig.json");
        std::fs::write(&input, r#"{ "compilerOptions": { "target": "es5" } }"#).unwrap();

        let config = AmdpackConfig {
            target: Some(EsTarget::Es2015),
            out_file: Some(PathBuf::from("out/app.js")),
            project_root: Some(PathBuf::from("assets")),
            compiler: "tsc-nightly".to_string(),
            ..config(input)
        };
        let plan = BuildPlan::resolve(&config).unwrap();
        assert_eq!(plan.compiler.kind, CompileKind::Project);
        assert_eq!(plan.compiler.es_target, EsTarget::Es2015);
        assert_eq!(plan.bundle.es_target, EsTarget::Es2015);
        assert_eq!(plan.compiler.out_file, PathBuf::from("out/app.js"));
        assert_eq!(plan.bundle.project_root, PathBuf::from("assets"));
    }

    #[test]
    fn test_plan_rejects_unsupported_input() {
        let err = BuildPlan::resolve(&config(PathBuf::from("index.js"))).unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument(_)));
    }

    #[test]
    fn test_plan_requires_existing_input() {
        let err = BuildPlan::resolve(&config(PathBuf::from("/nonexistent/index.ts"))).unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(_)));
    }

    #[test]
    fn test_input_directory() {
        assert_eq!(input_directory(Path::new("index.ts")), PathBuf::from("."));
        assert_eq!(input_directory(Path::new("src/index.ts")), PathBuf::from("src"));
    }

    #[tokio::test]
    async fn test_writer_bundles_once() {
        let dir = TempDir::new().unwrap();
        let out_file = dir.path().join("bundle.js");
        let mut writer = BundleWriter::new(&out_file, BundleOptions::new(dir.path()));

        writer.on_content(EMIT.to_string()).await;
        assert_eq!(writer.bundles(), 1);
        let bundled = std::fs::read_to_string(&out_file).unwrap();
        assert!(!Bundler::should_bundle(&bundled));

        // The write-back arrives as a content event too.
        writer.on_content(bundled).await;
        assert_eq!(writer.bundles(), 1);
        assert!(writer.take_error().is_none());
    }

    #[tokio::test]
    async fn test_writer_records_bundle_errors() {
        let dir = TempDir::new().unwrap();
        let mut writer =
            BundleWriter::new(dir.path().join("bundle.js"), BundleOptions::new(dir.path()));

        writer
            .on_content("define(\"index\", [\"require\", exports], function () {\n});\n".to_string())
            .await;
        assert_eq!(writer.bundles(), 0);
        assert!(matches!(writer.take_error(), Some(CliError::Bundle(_))));
    }

    #[tokio::test]
    async fn test_writer_reports_write_errors() {
        let dir = TempDir::new().unwrap();
        let out_file = dir.path().join("missing").join("bundle.js");
        let mut writer = BundleWriter::new(&out_file, BundleOptions::new(dir.path()));

        writer.on_content(EMIT.to_string()).await;
        assert_eq!(writer.bundles(), 0);
        let err = writer.take_error().unwrap();
        assert!(err.to_string().starts_with("unable to write bundle: "));
    }
}
