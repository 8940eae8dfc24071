//! Failure taxonomy for the encode/invoke pipeline.
//!
//! Every failure ends up as the `error` string of a response envelope, so
//! each message carries the diagnostic detail the UI would otherwise need
//! logs for: resolved path, exit code, captured streams, or the parse
//! diagnostic.

use crate::variant::ProblemVariant;
use std::path::PathBuf;
use thiserror::Error;

/// Request rejected before any process was spawned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("variant {variant} requires `{field}`")]
    MissingLeading {
        variant: ProblemVariant,
        field: &'static str,
    },

    #[error("variant {variant} does not take `{field}`")]
    UnexpectedLeading {
        variant: ProblemVariant,
        field: &'static str,
    },

    #[error("`k` and `capacity2` are mutually exclusive; no variant takes both")]
    ConflictingLeading,

    #[error("item {index}: variant {variant} requires `{field}`")]
    MissingItemField {
        variant: ProblemVariant,
        index: usize,
        field: &'static str,
    },

    #[error("item {index}: `{field}` is not part of variant {variant}")]
    UnexpectedItemField {
        variant: ProblemVariant,
        index: usize,
        field: &'static str,
    },

    #[error("`k` must be at least 1")]
    ZeroK,

    #[error("item {index}: `count` must be at least 1")]
    ZeroCount { index: usize },

    #[error("item {index}: `type` must be 0, 1, or 2 (got {kind})")]
    KindOutOfRange { index: usize, kind: u8 },

    #[error("item {index}: `parent` {parent} exceeds item count {len} (indices are 1-based, 0 = root)")]
    ParentOutOfRange { index: usize, parent: u64, len: usize },
}

/// Terminal outcome of one invocation that did not produce solver data.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("failed to start solver {path}: {source}")]
    Launch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("solver {path} timed out after {secs}s and was killed")]
    Timeout { path: PathBuf, secs: u64 },

    #[error("solver exited with {code}\nstderr: {stderr}\nstdout: {stdout}")]
    Process {
        code: ExitReason,
        stderr: String,
        stdout: String,
    },

    #[error("JSON parsing of solver output failed: {source}\nstdout: {stdout}")]
    Parse {
        #[source]
        source: serde_json::Error,
        stdout: String,
    },
}

/// Exit code, or the signal-terminated case where none exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    Code(i32),
    Signal,
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExitReason::Code(code) => write!(f, "code {code}"),
            ExitReason::Signal => f.write_str("a signal (no exit code)"),
        }
    }
}
