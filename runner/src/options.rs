//! Runner configuration.

use std::path::Path;

use scout_task_core::DEFAULT_RESERVED_NAME;

/// Settings shared by [`Runner`](crate::Runner) and
/// [`TaskRegistry`](crate::TaskRegistry).
///
/// # Examples
///
/// ```
/// use scout_task_runner::RunnerOptions;
///
/// let options = RunnerOptions::default();
/// assert_eq!(options.output_flag(), "scout-output");
/// assert_eq!(options.metadata_flag(), "scout-metadata");
/// assert_eq!(options.error_tag(), "[scout.task]");
///
/// let options = RunnerOptions::new("job").with_program("jobs");
/// assert_eq!(options.output_flag(), "job-output");
/// assert_eq!(options.program_name(Some("/usr/bin/other")), "jobs");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerOptions {
    /// Prefix of the runner's own flags.
    pub reserved: String,
    /// Program name shown in usage; derived from argv\[0\] when unset.
    pub program: Option<String>,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self::new(DEFAULT_RESERVED_NAME)
    }
}

impl RunnerOptions {
    /// Creates options with the given reserved prefix.
    pub fn new(reserved: impl Into<String>) -> Self {
        Self {
            reserved: reserved.into(),
            program: None,
        }
    }

    /// Fixes the program name shown in usage.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = Some(program.into());
        self
    }

    /// Name of the output-path flag, without dashes.
    pub fn output_flag(&self) -> String {
        format!("{}-output", self.reserved)
    }

    /// Name of the metadata-dump switch, without dashes.
    pub fn metadata_flag(&self) -> String {
        format!("{}-metadata", self.reserved)
    }

    /// Tag that prefixes runner messages on stderr.
    pub fn error_tag(&self) -> String {
        format!("[{}.task]", self.reserved)
    }

    /// Program name for usage output: the configured name, else the file
    /// name of argv\[0\], else the reserved prefix.
    pub fn program_name(&self, argv0: Option<&str>) -> String {
        if let Some(program) = &self.program {
            return program.clone();
        }
        argv0
            .and_then(|arg| Path::new(arg).file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.reserved.clone())
    }

    /// Returns `true` when the metadata switch appears anywhere in `args`.
    pub(crate) fn wants_metadata(&self, args: &[String]) -> bool {
        let switch = format!("--{}", self.metadata_flag());
        args.iter().any(|arg| *arg == switch)
    }
}
