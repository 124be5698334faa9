//! End-to-end tests for the `amdpack` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn amdpack(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("amdpack").unwrap();
    cmd.current_dir(dir.path()).env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_help_lists_build() {
    let dir = TempDir::new().unwrap();
    amdpack(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"));
}

#[test]
fn test_build_help_lists_options() {
    let dir = TempDir::new().unwrap();
    amdpack(&dir)
        .args(["build", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--export-as"))
        .stdout(predicate::str::contains("--import-as-default"));
}

#[test]
fn test_missing_input() {
    let dir = TempDir::new().unwrap();
    amdpack(&dir)
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing required field: input"));
}

#[test]
fn test_unsupported_input_extension() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("index.js"), "").unwrap();
    amdpack(&dir)
        .args(["build", "index.js"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot bundle"));
}

#[test]
fn test_nonexistent_input() {
    let dir = TempDir::new().unwrap();
    amdpack(&dir)
        .args(["build", "missing.ts"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_invalid_export_as() {
    let dir = TempDir::new().unwrap();
    amdpack(&dir)
        .args(["build", "index.ts", "--export-as", "my-lib"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("JavaScript identifier"));
}

#[test]
fn test_invalid_config_file_value() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("index.ts"), "").unwrap();
    fs::write(dir.path().join("amdpack.config.json"), r#"{ "exportAs": "my-lib" }"#).unwrap();
    amdpack(&dir)
        .args(["build", "index.ts"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("exportAs"));
}

#[cfg(unix)]
mod with_fake_compiler {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;

    /// A stand-in for `tsc` that writes `body` to the `--outFile` argument.
    fn fake_compiler(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("fake-tsc.sh");
        let script = format!(
            "#!/bin/sh\n\
             while [ \"$#\" -gt 0 ]; do\n\
               if [ \"$1\" = \"--outFile\" ]; then out=\"$2\"; fi\n\
               shift\n\
             done\n\
             {}\n",
            body
        );
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn test_build_bundles_compiler_output() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("main.ts"), "").unwrap();
        fs::write(dir.path().join("message.txt"), "hi").unwrap();
        let compiler = fake_compiler(
            &dir,
            "printf 'define(\"index\", [\"require\", \"exports\", \"text!./message.txt\"], function (require, exports, message) {\\n    exports.message = message;\\n});\\n' > \"$out\"\nsleep 0.3",
        );

        amdpack(&dir)
            .args(["build", "main.ts", "--export-as", "App", "--compiler"])
            .arg(&compiler)
            .assert()
            .success();

        let bundle = fs::read_to_string(dir.path().join("main.js")).unwrap();
        assert!(bundle.starts_with("var App = (function () {"));
        assert!(bundle.contains("define(\"text!message.txt\", [\"exports\"]"));
        assert!(bundle.contains("exports[\"default\"] = \"hi\";"));
        assert!(bundle.contains("\"text!message.txt\"], function (require, exports, message)"));
    }

    #[test]
    fn test_out_file_override() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("main.ts"), "").unwrap();
        let compiler = fake_compiler(
            &dir,
            "printf 'define(\"main\", [\"require\", \"exports\"], function (require, exports) {\\n});\\n' > \"$out\"\nsleep 0.3",
        );

        amdpack(&dir)
            .args(["build", "main.ts", "--out-file", "dist/app.js", "--compiler"])
            .arg(&compiler)
            .assert()
            .success();

        let bundle = fs::read_to_string(dir.path().join("dist/app.js")).unwrap();
        assert!(bundle.starts_with("(function () {"));
    }

    #[test]
    fn test_compiler_exit_code_is_propagated() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("main.ts"), "").unwrap();
        let compiler = fake_compiler(&dir, "echo 'main.ts(1,1): error TS1005'\nexit 4");

        amdpack(&dir)
            .args(["build", "main.ts", "--compiler"])
            .arg(&compiler)
            .assert()
            .code(4)
            .stdout(predicate::str::contains("error TS1005"))
            .stderr(predicate::str::contains("exited with code 4"));
    }
}
