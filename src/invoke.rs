//! Solver process invocation and result decoding.
//!
//! One child process per invocation: spawn with the encoded argument vector
//! (never through a shell), drain stdout and stderr to completion on reader
//! threads, then classify exactly once. Concurrent invocations share nothing;
//! each owns its child handle and buffers for the invocation's lifetime.

use crate::encode::encode;
use crate::error::{ExitReason, SolveError};
use crate::request::{ProblemParams, SolveRequest, SolveResponse};
use crate::util::truncate_bytes;
use crate::variant::ProblemVariant;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

/// Cap on how much of a stream ends up in an error message. The full buffers
/// are drained regardless; this only bounds the diagnostic text.
const MAX_STREAM_REPORT_BYTES: usize = 8 * 1024;

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Where solver executables live relative to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Source tree layout: `<root>/cpp/<stem>`.
    Development,
    /// Bundled layout: `<exe dir>/resources/cpp/<stem>`.
    Packaged,
}

/// Resolves a variant to its solver executable path.
#[derive(Debug, Clone)]
pub struct SolverLocator {
    base: PathBuf,
}

impl SolverLocator {
    pub fn development(root: &Path) -> Self {
        SolverLocator {
            base: root.join("cpp"),
        }
    }

    /// Packaged mode resolves relative to the host executable's directory.
    /// Falling back to the current directory only moves the failure to spawn
    /// time, where it surfaces with the resolved path attached.
    pub fn packaged() -> Self {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));
        SolverLocator {
            base: exe_dir.join("resources").join("cpp"),
        }
    }

    /// Explicit base directory, bypassing mode-based layout entirely.
    pub fn explicit(base: PathBuf) -> Self {
        SolverLocator { base }
    }

    pub fn for_mode(mode: RunMode, root: &Path) -> Self {
        match mode {
            RunMode::Development => SolverLocator::development(root),
            RunMode::Packaged => SolverLocator::packaged(),
        }
    }

    /// Never fails: a missing executable is reported at spawn time as a
    /// launch error carrying this path.
    pub fn resolve(&self, variant: ProblemVariant) -> PathBuf {
        self.base.join(format!(
            "{}{}",
            variant.solver_stem(),
            std::env::consts::EXE_SUFFIX
        ))
    }
}

/// Per-invocation knobs. `timeout` is opt-in; without it the child runs to
/// completion.
#[derive(Debug, Clone, Copy, Default)]
pub struct InvokeOptions {
    pub timeout: Option<Duration>,
}

/// Fully drained child output, captured before any classification.
#[derive(Debug)]
struct RawOutput {
    exit: ExitReason,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

/// Encode, spawn, drain, and decode one invocation.
pub fn run_solver(
    locator: &SolverLocator,
    variant: ProblemVariant,
    params: &ProblemParams,
    options: InvokeOptions,
) -> Result<serde_json::Value, SolveError> {
    let args = encode(variant, params)?;
    let path = locator.resolve(variant);
    tracing::debug!(
        solver = variant.solver_stem(),
        path = %path.display(),
        args = args.len(),
        "invoking solver"
    );
    let raw = run_child(&path, &args, options.timeout)?;
    decode_output(raw)
}

/// Convert an invocation outcome into the uniform response envelope. Nothing
/// escapes as a fault: every error kind becomes `{success: false, error}`.
pub fn solve(
    locator: &SolverLocator,
    request: &SolveRequest,
    options: InvokeOptions,
) -> SolveResponse {
    match run_solver(locator, request.algorithm, &request.params, options) {
        Ok(data) => SolveResponse::success(data),
        Err(err) => {
            tracing::warn!(variant = %request.algorithm, error = %err, "invocation failed");
            SolveResponse::failure(err.to_string())
        }
    }
}

fn run_child(
    path: &Path,
    args: &[String],
    timeout: Option<Duration>,
) -> Result<RawOutput, SolveError> {
    let mut child = Command::new(path)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| SolveError::Launch {
            path: path.to_path_buf(),
            source,
        })?;

    // Drain both pipes off-thread so a chatty solver can never fill one and
    // deadlock against our wait loop.
    let stdout_reader = spawn_drain(child.stdout.take());
    let stderr_reader = spawn_drain(child.stderr.take());

    let timed_out = wait_with_deadline(&mut child, timeout, path)?;
    let status = child.wait().map_err(|source| SolveError::Launch {
        path: path.to_path_buf(),
        source,
    })?;
    let stdout = stdout_reader.join().unwrap_or_default();
    let stderr = stderr_reader.join().unwrap_or_default();

    if let Some(secs) = timed_out {
        return Err(SolveError::Timeout {
            path: path.to_path_buf(),
            secs,
        });
    }

    let exit = match status.code() {
        Some(code) => ExitReason::Code(code),
        None => ExitReason::Signal,
    };
    Ok(RawOutput {
        exit,
        stdout,
        stderr,
    })
}

/// Poll until the child exits or the deadline passes; on expiry kill the
/// child and report the configured timeout in seconds.
fn wait_with_deadline(
    child: &mut Child,
    timeout: Option<Duration>,
    path: &Path,
) -> Result<Option<u64>, SolveError> {
    let start = Instant::now();
    loop {
        let exited = child.try_wait().map_err(|source| SolveError::Launch {
            path: path.to_path_buf(),
            source,
        })?;
        if exited.is_some() {
            return Ok(None);
        }
        if let Some(limit) = timeout {
            if start.elapsed() > limit {
                let _ = child.kill();
                return Ok(Some(limit.as_secs()));
            }
        }
        std::thread::sleep(WAIT_POLL_INTERVAL);
    }
}

fn spawn_drain<R: Read + Send + 'static>(stream: Option<R>) -> std::thread::JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Some(mut stream) = stream {
            let _ = stream.read_to_end(&mut buffer);
        }
        buffer
    })
}

/// Completion handling, first applicable rule wins: non-zero exit, then
/// unparseable stdout, then success.
fn decode_output(raw: RawOutput) -> Result<serde_json::Value, SolveError> {
    if raw.exit != ExitReason::Code(0) {
        return Err(SolveError::Process {
            code: raw.exit,
            stderr: truncate_bytes(&raw.stderr, MAX_STREAM_REPORT_BYTES),
            stdout: truncate_bytes(&raw.stdout, MAX_STREAM_REPORT_BYTES),
        });
    }
    serde_json::from_slice(&raw.stdout).map_err(|source| SolveError::Parse {
        source,
        stdout: truncate_bytes(&raw.stdout, MAX_STREAM_REPORT_BYTES),
    })
}
