//! Host-side configuration of external tasks.
//!
//! # Example YAML
//!
//! ```yaml
//! reserved: scout
//! timeout_secs: 60
//! tasks:
//!   - name: count
//!     program: ./bin/scout-demo
//!     args: [count]
//!     returns: string
//!     description: Repeat a label
//!   - name: resize
//!     program: ./tasks/resize
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Duration;

use scout_task_core::{DEFAULT_RESERVED_NAME, TypeKind};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::external::ExternalTask;

fn default_reserved() -> String {
    DEFAULT_RESERVED_NAME.to_string()
}

/// One configured task.
///
/// `returns` and `description` replace what the executable reports in its
/// metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskEntry {
    /// Name the host uses for the task.
    pub name: String,
    /// Executable to run.
    pub program: PathBuf,
    /// Arguments placed before the task flags, usually the task name of a
    /// multi-task program.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    /// Return kind override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<TypeKind>,
    /// Description override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Workflow configuration: the reserved flag prefix, an optional per-run
/// timeout and the task list.
///
/// # Examples
///
/// ```
/// use scout_task_workflow::WorkflowConfig;
///
/// let config: WorkflowConfig = serde_yaml::from_str(
///     "tasks:\n  - name: count\n    program: ./scout-demo\n    args: [count]\n",
/// )
/// .unwrap();
/// assert_eq!(config.reserved, "scout");
/// assert_eq!(config.timeout(), None);
/// assert_eq!(config.task("count").map(|t| t.args.len()), Some(1));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Reserved flag prefix of the executables.
    #[serde(default = "default_reserved")]
    pub reserved: String,
    /// Per-run limit in seconds; no limit when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Configured tasks.
    #[serde(default)]
    pub tasks: Vec<TaskEntry>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            reserved: default_reserved(),
            timeout_secs: None,
            tasks: Vec::new(),
        }
    }
}

impl WorkflowConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::WorkflowError::Io) if the file cannot be read,
    /// or [`Yaml`](crate::WorkflowError::Yaml) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Finds a task entry by name.
    pub fn task(&self, name: &str) -> Option<&TaskEntry> {
        self.tasks.iter().find(|entry| entry.name == name)
    }

    /// Per-run timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Builds the executable handle for `entry` with this configuration's
    /// prefix and timeout.
    pub fn external(&self, entry: &TaskEntry) -> ExternalTask {
        let task = ExternalTask::new(&entry.program)
            .with_args(entry.args.iter().cloned())
            .with_reserved(self.reserved.clone());
        match self.timeout() {
            Some(timeout) => task.with_timeout(timeout),
            None => task,
        }
    }
}
