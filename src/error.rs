//! Typed failure taxonomy for the build pipeline.
//!
//! No component raises past its boundary: every fallible operation returns
//! `Result<_, BuildError>` and the orchestrator decides how far a failure
//! propagates (abort the package, abort the phase, abort the run).

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while fetching, extracting, or building a package.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("checksum mismatch for {path}: expected {expected}, got {actual}")]
    HashMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("unsupported archive format: {0}")]
    UnsupportedArchive(PathBuf),

    #[error("failed to extract {path}: {reason}")]
    Extract { path: PathBuf, reason: String },

    #[error("no extracted source tree found for {name}-{version} in {dir}")]
    TreeNotFound {
        name: String,
        version: String,
        dir: PathBuf,
    },

    #[error("build step {index} for {package} exited with code {code}: {command}")]
    Step {
        package: String,
        index: usize,
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("could not launch '{command}': {reason}")]
    Launch { command: String, reason: String },

    #[error("{path} exists but is not a symlink to {target}")]
    SymlinkConflict { path: PathBuf, target: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
