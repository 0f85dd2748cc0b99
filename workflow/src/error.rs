//! Error types for driving external task executables.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors raised while reading metadata from, configuring or running an
/// external task.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Spawning, waiting on or reading from a process, or file I/O.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Metadata that is not valid JSON or not a schema document.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The executable could not report its metadata.
    #[error("failed to read metadata from '{}': {message}", .program.display())]
    Metadata {
        /// Executable that was asked.
        program: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// The task exited with a non-zero status.
    #[error("task '{name}' failed ({}): {stderr}", .code.map_or_else(|| "killed".to_string(), |c| format!("exit code {c}")))]
    TaskFailed {
        /// Task name.
        name: String,
        /// Exit code, `None` when killed by a signal.
        code: Option<i32>,
        /// Captured standard error.
        stderr: String,
    },

    /// The task did not finish in time and was killed.
    #[error("task '{name}' timed out after {timeout:?}")]
    Timeout {
        /// Task name.
        name: String,
        /// Configured limit.
        timeout: Duration,
    },

    /// No configured task has this name.
    #[error("unknown task: {0}")]
    UnknownTask(String),
}

/// Convenience alias for results with [`WorkflowError`].
pub type Result<T> = std::result::Result<T, WorkflowError>;
