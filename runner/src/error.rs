//! Error types for grammar compilation, registration and task runs.

use std::num::{ParseFloatError, ParseIntError};
use std::path::PathBuf;

use scout_task_core::ValidationError;
use thiserror::Error;

/// Error type returned by task functions.
pub type TaskError = Box<dyn std::error::Error + Send + Sync>;

/// A command-line value that does not parse as its declared kind.
///
/// Surfaces through `clap` as a usage error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CastError {
    /// Not a base-10 integer.
    #[error("expected an integer: {0}")]
    Integer(#[from] ParseIntError),
    /// Not a decimal number.
    #[error("expected a number: {0}")]
    Float(#[from] ParseFloatError),
    /// Not one of the accepted boolean spellings.
    #[error("expected true or false, got {0:?}")]
    Boolean(String),
}

/// Errors raised while registering a task.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The task schema failed validation.
    #[error("task {name:?} has an invalid schema: {}", join_errors(.errors))]
    InvalidSchema {
        /// Task name.
        name: String,
        /// Every problem found.
        errors: Vec<ValidationError>,
    },
    /// A task with the same name is already registered.
    #[error("task {0:?} is already registered")]
    DuplicateTask(String),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors that end a task run.
#[derive(Debug, Error)]
pub enum RunError {
    /// Unknown flag, missing required flag or malformed value. Also carries
    /// `--help` output, which exits successfully.
    #[error(transparent)]
    Usage(#[from] clap::Error),
    /// The leading task name matches no registered task.
    #[error("Unknown task '{0}'")]
    UnknownTask(String),
    /// The registry is empty.
    #[error("no tasks registered")]
    NoTasks,
    /// The task function returned an error.
    #[error("{0}")]
    Invocation(TaskError),
    /// Writing the `--<reserved>-output` file failed.
    #[error("failed to write output file '{}': {source}", .path.display())]
    OutputFile {
        /// Destination path.
        path: PathBuf,
        /// Underlying failure.
        source: std::io::Error,
    },
    /// Writing to stdout failed.
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
    /// The schema could not be encoded as metadata.
    #[error("failed to encode metadata: {0}")]
    Metadata(#[from] serde_json::Error),
}

impl RunError {
    /// Process exit code for this error: usage problems exit with 2, task
    /// and output failures with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(err) => err.exit_code(),
            Self::UnknownTask(_) | Self::NoTasks => 2,
            Self::Invocation(_) | Self::OutputFile { .. } | Self::Io(_) | Self::Metadata(_) => 1,
        }
    }
}
