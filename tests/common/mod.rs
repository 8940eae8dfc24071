use std::path::{Path, PathBuf};
use std::process::{Command, Output};

pub fn khost_bin() -> &'static str {
    env!("CARGO_BIN_EXE_khost")
}

/// Stage a fake solver under `dir` with the given executable stem. The body
/// is a shell script; tests that call this are unix-only.
#[cfg(unix)]
pub fn write_solver_script(dir: &Path, stem: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(stem);
    let script = format!("#!/bin/sh\n{body}\n");
    std::fs::write(&path, script).expect("write solver script");
    let mut perms = std::fs::metadata(&path)
        .expect("stat solver script")
        .permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("chmod solver script");
    path
}

pub fn write_request(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).expect("write request file");
    path
}

/// Run `khost solve` against a staged solver dir and parse the envelope.
pub fn run_solve(solvers_dir: &Path, request_path: &Path) -> serde_json::Value {
    let output = solve_output(solvers_dir, request_path, &[]);
    parse_envelope(&output)
}

pub fn solve_output(solvers_dir: &Path, request_path: &Path, extra: &[&str]) -> Output {
    Command::new(khost_bin())
        .arg("solve")
        .arg("--request")
        .arg(request_path)
        .arg("--solvers-dir")
        .arg(solvers_dir)
        .args(extra)
        .output()
        .expect("run khost solve")
}

pub fn parse_envelope(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "khost exited nonzero: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("parse response envelope")
}
