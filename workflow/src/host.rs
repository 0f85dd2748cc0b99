//! A set of external tasks loaded from configuration.

use std::path::Path;

use scout_task_core::FunctionSchema;
use tracing::debug;

use crate::argv::TaskInputs;
use crate::config::{TaskEntry, WorkflowConfig};
use crate::error::{Result, WorkflowError};
use crate::external::ExternalTask;

/// An external task with its (possibly overridden) schema.
#[derive(Debug, Clone, PartialEq)]
pub struct HostedTask {
    schema: FunctionSchema,
    external: ExternalTask,
}

impl HostedTask {
    /// Reads the schema from `external` and applies the overrides of `entry`.
    ///
    /// When the executable reports several schemas, the one named like the
    /// entry is used.
    pub fn load(entry: &TaskEntry, external: ExternalTask) -> Result<Self> {
        let schemas = external.read_metadata()?;
        let schema = pick_schema(entry, schemas).ok_or_else(|| WorkflowError::Metadata {
            program: entry.program.clone(),
            message: format!("no schema for task '{}'", entry.name),
        })?;
        Ok(Self::new(entry, schema, external))
    }

    /// Wraps an already known schema, applying the overrides of `entry`.
    pub fn new(entry: &TaskEntry, mut schema: FunctionSchema, external: ExternalTask) -> Self {
        schema.name = entry.name.clone();
        if let Some(returns) = entry.returns {
            schema.returns = returns;
        }
        if let Some(description) = entry.description.as_ref().filter(|d| !d.is_empty()) {
            schema.description = description.clone();
        }
        Self { schema, external }
    }

    /// Task schema after overrides.
    pub fn schema(&self) -> &FunctionSchema {
        &self.schema
    }

    /// The executable handle.
    pub fn external(&self) -> &ExternalTask {
        &self.external
    }

    /// Runs the task and returns its stdout.
    pub fn run(&self, inputs: &TaskInputs) -> Result<Vec<u8>> {
        self.external.run(&self.schema, inputs)
    }

    /// Runs the task and has it write its result to `path`.
    pub fn run_to_file(&self, inputs: &TaskInputs, path: &Path) -> Result<()> {
        self.external.run_to_file(&self.schema, inputs, path)
    }
}

fn pick_schema(entry: &TaskEntry, mut schemas: Vec<FunctionSchema>) -> Option<FunctionSchema> {
    if schemas.len() == 1 {
        return schemas.pop();
    }
    let index = schemas.iter().position(|schema| schema.name == entry.name)?;
    Some(schemas.swap_remove(index))
}

/// Every task of a [`WorkflowConfig`], with metadata read up front.
///
/// # Examples
///
/// ```no_run
/// use scout_task_workflow::{TaskHost, TaskInputs, WorkflowConfig};
///
/// let config = WorkflowConfig::load("workflow.yml").unwrap();
/// let host = TaskHost::from_config(&config).unwrap();
/// let stdout = host.run("count", &TaskInputs::new().with("count", 2)).unwrap();
/// println!("{}", String::from_utf8_lossy(&stdout));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TaskHost {
    tasks: Vec<HostedTask>,
}

impl TaskHost {
    /// Loads every configured task.
    ///
    /// # Errors
    ///
    /// Fails on the first task whose metadata cannot be read.
    pub fn from_config(config: &WorkflowConfig) -> Result<Self> {
        let mut tasks = Vec::with_capacity(config.tasks.len());
        for entry in &config.tasks {
            let task = HostedTask::load(entry, config.external(entry))?;
            debug!(task = %entry.name, params = task.schema.params.len(), "loaded task metadata");
            tasks.push(task);
        }
        Ok(Self { tasks })
    }

    /// Finds a task by name.
    pub fn get(&self, name: &str) -> Option<&HostedTask> {
        self.tasks.iter().find(|task| task.schema.name == name)
    }

    /// Task names in configuration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.iter().map(|task| task.schema.name.as_str())
    }

    /// Runs the named task.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::UnknownTask`] when no task has this name, otherwise
    /// whatever [`ExternalTask::run`] reports.
    pub fn run(&self, name: &str, inputs: &TaskInputs) -> Result<Vec<u8>> {
        self.get(name)
            .ok_or_else(|| WorkflowError::UnknownTask(name.to_string()))?
            .run(inputs)
    }
}

#[cfg(test)]
mod tests {
    use scout_task_core::{FunctionSignature, TypeKind, build_schema};

    use super::*;

    fn entry(name: &str) -> TaskEntry {
        TaskEntry {
            name: name.to_string(),
            program: "./task".into(),
            args: Vec::new(),
            returns: None,
            description: None,
        }
    }

    fn schema(name: &str) -> FunctionSchema {
        build_schema(&FunctionSignature::new(name).returns("str").doc("Reported."))
    }

    #[test]
    fn test_overrides_replace_reported_metadata() {
        let mut configured = entry("alias");
        configured.returns = Some(TypeKind::Binary);
        configured.description = Some("Configured.".to_string());
        let task = HostedTask::new(&configured, schema("count"), ExternalTask::new("./task"));
        assert_eq!(task.schema().name, "alias");
        assert_eq!(task.schema().returns, TypeKind::Binary);
        assert_eq!(task.schema().description, "Configured.");
    }

    #[test]
    fn test_empty_description_override_is_ignored() {
        let mut configured = entry("count");
        configured.description = Some(String::new());
        let task = HostedTask::new(&configured, schema("count"), ExternalTask::new("./task"));
        assert_eq!(task.schema().description, "Reported.");
        assert_eq!(task.schema().returns, TypeKind::String);
    }

    #[test]
    fn test_pick_schema_by_name() {
        let picked = pick_schema(&entry("b"), vec![schema("a"), schema("b")]);
        assert_eq!(picked.map(|s| s.name), Some("b".to_string()));
        assert!(pick_schema(&entry("c"), vec![schema("a"), schema("b")]).is_none());
        let single = pick_schema(&entry("other"), vec![schema("a")]);
        assert_eq!(single.map(|s| s.name), Some("a".to_string()));
    }

    #[test]
    fn test_unknown_task() {
        let host = TaskHost::default();
        let err = host.run("nope", &TaskInputs::new()).unwrap_err();
        assert!(matches!(err, WorkflowError::UnknownTask(ref name) if name == "nope"));
    }
}
