use std::ffi::OsString;
use std::process::Stdio;

use tokio::process::Command;

use super::{CompileKind, CompilerOptions};

/// A fully resolved compiler command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerInvocation {
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl CompilerInvocation {
    /// `<program> [--project] <in> --outFile <out> --target <t> --module amd [--watch]`
    pub fn with_program(program: impl Into<OsString>, options: &CompilerOptions) -> Self {
        let mut args: Vec<OsString> = Vec::new();
        if options.kind == CompileKind::Project {
            args.push("--project".into());
        }
        args.push(options.in_file.clone().into_os_string());
        args.push("--outFile".into());
        args.push(options.out_file.clone().into_os_string());
        args.push("--target".into());
        args.push(options.es_target.as_str().into());
        args.push("--module".into());
        args.push("amd".into());
        if options.watch {
            args.push("--watch".into());
        }

        Self {
            program: program.into(),
            args,
        }
    }

    /// An arbitrary program and argument list.
    pub fn raw<I, S>(program: impl Into<OsString>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Build the process command with piped output.
    ///
    /// On Windows the compiler is usually a `.cmd` shim, so it runs through
    /// `cmd /C`.
    pub fn command(&self) -> Command {
        let mut command = if cfg!(windows) {
            let mut command = Command::new("cmd");
            command.arg("/C").arg(&self.program);
            command
        } else {
            Command::new(&self.program)
        };
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    /// Shell-like rendering for log output.
    pub fn display(&self) -> String {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|part| part.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amdpack_bundler::EsTarget;
    use std::path::PathBuf;

    fn options(kind: CompileKind, watch: bool) -> CompilerOptions {
        CompilerOptions {
            kind,
            es_target: EsTarget::Es5,
            in_file: PathBuf::from("src/index.ts"),
            out_file: PathBuf::from("dist/index.js"),
            watch,
        }
    }

    #[test]
    fn test_script_invocation() {
        let invocation = CompilerInvocation::with_program("tsc", &options(CompileKind::Script, false));
        assert_eq!(
            invocation.display(),
            "tsc src/index.ts --outFile dist/index.js --target es5 --module amd"
        );
    }

    #[test]
    fn test_project_invocation_with_watch() {
        let mut opts = options(CompileKind::Project, true);
        opts.in_file = PathBuf::from("tsconfig.json");
        let invocation = CompilerInvocation::with_program("tsc", &opts);
        assert_eq!(
            invocation.display(),
            "tsc --project tsconfig.json --outFile dist/index.js --target es5 --module amd --watch"
        );
    }

    #[test]
    fn test_raw_invocation() {
        let invocation = CompilerInvocation::raw("sh", ["-c", "exit 0"]);
        assert_eq!(invocation.program, OsString::from("sh"));
        assert_eq!(invocation.args.len(), 2);
    }
}
