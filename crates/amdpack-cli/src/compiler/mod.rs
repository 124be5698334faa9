//! External TypeScript compiler integration.
//!
//! - [`CompilerOptions`] / [`CompilerInvocation`] describe one `tsc` run
//! - [`CompilerDriver`] runs it and joins process exit with output-file
//!   change events

mod driver;
mod invocation;

use std::path::{Path, PathBuf};

use amdpack_bundler::EsTarget;

pub use driver::{
    CompileError, CompileHandler, CompileOutcome, CompilerDriver, DriverState, SettleOptions,
};
pub use invocation::CompilerInvocation;

/// Default compiler program.
pub const DEFAULT_COMPILER: &str = "tsc";

/// How the compiler input is passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileKind {
    /// A `tsconfig.json`, passed with `--project`
    Project,
    /// A single `.ts` / `.tsx` source file
    Script,
}

impl CompileKind {
    /// Classify an input path, `None` if the compiler cannot take it.
    pub fn detect(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        if name.ends_with(".ts") || name.ends_with(".tsx") {
            Some(CompileKind::Script)
        } else if name.contains("tsconfig") && name.ends_with(".json") {
            Some(CompileKind::Project)
        } else {
            None
        }
    }
}

/// Options for one compiler run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    pub kind: CompileKind,
    pub es_target: EsTarget,
    pub in_file: PathBuf,
    pub out_file: PathBuf,
    pub watch: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_script() {
        assert_eq!(
            CompileKind::detect(Path::new("src/index.ts")),
            Some(CompileKind::Script)
        );
        assert_eq!(
            CompileKind::detect(Path::new("App.TSX")),
            Some(CompileKind::Script)
        );
    }

    #[test]
    fn test_detect_project() {
        assert_eq!(
            CompileKind::detect(Path::new("tsconfig.json")),
            Some(CompileKind::Project)
        );
        assert_eq!(
            CompileKind::detect(Path::new("config/tsconfig.build.json")),
            Some(CompileKind::Project)
        );
    }

    #[test]
    fn test_detect_rejects_other_inputs() {
        assert_eq!(CompileKind::detect(Path::new("index.js")), None);
        assert_eq!(CompileKind::detect(Path::new("package.json")), None);
        assert_eq!(CompileKind::detect(Path::new("types.d")), None);
    }
}
