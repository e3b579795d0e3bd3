//! Error types for the package store pipeline.
//!
//! Each failure class has its own type so that callers can tell a fatal
//! enumeration failure apart from a per-repository degradation.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to produce the package list. Fatal to the whole read pass.
#[derive(Debug, Error)]
pub enum EnumerateError {
    #[error("workspace root {} is not readable: {source}", path.display())]
    UnreadableRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk workspace root {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to read manifest {}: {source}", path.display())]
    ManifestIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed manifest {}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read package list: {0}")]
    Input(#[from] std::io::Error),

    #[error("package enumeration task failed: {0}")]
    Join(String),
}

/// Failure to query the version-control state of a checkout.
#[derive(Debug, Error)]
pub enum VcsError {
    #[error("failed to run `{command}` in {}: {source}", dir.display())]
    Spawn {
        command: String,
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed in {}: {stderr}", dir.display())]
    Command {
        command: String,
        dir: PathBuf,
        stderr: String,
    },

    #[error("unexpected output from `{command}`: {output}")]
    Parse { command: String, output: String },
}

/// Failure to compute a comparison between two revisions.
///
/// Stored inside cached comparisons, hence `Clone` and string payloads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompareError {
    #[error("no comparison provider for remote {0}")]
    Unsupported(String),

    #[error("repository has no known remote")]
    NoRemote,

    #[error("local or remote revision is unknown")]
    MissingRevision,

    #[error("comparison timed out after {0} s")]
    Timeout(u64),

    #[error("comparison failed: {0}")]
    Provider(String),
}

/// Failure of a package-manager update.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateError {
    #[error("failed to start updater `{command}`: {message}")]
    Spawn { command: String, message: String },

    #[error("update of {pattern} failed: {stderr}")]
    Failed { pattern: String, stderr: String },

    #[error("update worker has stopped")]
    WorkerGone,

    #[error("empty import path pattern")]
    EmptyPattern,
}
