//! Several tasks in one program.
//!
//! Tasks are registered first and dispatched once, so the whole set is
//! known before any argument is parsed. A leading argument that is not a
//! flag names the task; without one the last registered task runs.

use std::io::{self, Write};

use scout_task_core::{FunctionSchema, FunctionSignature};
use tracing::debug;

use crate::error::{RegistryError, RunError, TaskError};
use crate::grammar::Arguments;
use crate::invoke::{Task, check_schema, env_args, report, run_task};
use crate::options::RunnerOptions;
use crate::output::Output;

/// Ordered set of named tasks.
///
/// # Examples
///
/// ```
/// use scout_task_core::FunctionSignature;
/// use scout_task_runner::{Output, TaskRegistry};
///
/// let mut registry = TaskRegistry::new();
/// registry
///     .register(&FunctionSignature::new("hello"), |_| Ok(Output::text("hi")))
///     .unwrap()
///     .register(&FunctionSignature::new("answer"), |_| Ok(Output::integer(42)))
///     .unwrap();
///
/// let (mut stdout, mut stderr) = (Vec::new(), Vec::new());
/// let argv = ["demo", "hello"].map(String::from);
/// assert_eq!(registry.dispatch(&argv, &mut stdout, &mut stderr), 0);
/// assert_eq!(stdout, b"hi\n");
///
/// // No task name: the last registered task runs.
/// let mut stdout = Vec::new();
/// assert_eq!(registry.dispatch(&["demo".to_string()], &mut stdout, &mut stderr), 0);
/// assert_eq!(stdout, b"42\n");
/// ```
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: Vec<Task>,
    options: RunnerOptions,
}

impl TaskRegistry {
    /// Creates an empty registry with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry with custom options.
    pub fn with_options(options: RunnerOptions) -> Self {
        Self {
            tasks: Vec::new(),
            options,
        }
    }

    /// Options used for every task.
    pub fn options(&self) -> &RunnerOptions {
        &self.options
    }

    /// Derives the schema for `signature` and registers `callable` under
    /// its name.
    ///
    /// # Errors
    ///
    /// Fails when the schema does not validate or the name is taken.
    pub fn register<F>(
        &mut self,
        signature: &FunctionSignature,
        callable: F,
    ) -> Result<&mut Self, RegistryError>
    where
        F: Fn(&Arguments) -> Result<Output, TaskError> + Send + Sync + 'static,
    {
        self.insert(Task::new(signature, callable))?;
        Ok(self)
    }

    /// Registers a prepared task.
    pub fn insert(&mut self, task: Task) -> Result<(), RegistryError> {
        check_schema(task.schema(), &self.options)?;
        if self.get(task.name()).is_some() {
            return Err(RegistryError::DuplicateTask(task.name().to_string()));
        }
        debug!(task = %task.name(), params = task.schema().params.len(), "registered task");
        self.tasks.push(task);
        Ok(())
    }

    /// Finds a task by name.
    pub fn get(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.name() == name)
    }

    /// Schemas in registration order.
    pub fn schemas(&self) -> impl Iterator<Item = &FunctionSchema> {
        self.tasks.iter().map(Task::schema)
    }

    /// Number of registered tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` when no task is registered.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Selects a task from a full argument vector (program name first), runs
    /// it and returns the process exit code.
    pub fn dispatch(&self, argv: &[String], stdout: &mut dyn Write, stderr: &mut dyn Write) -> i32 {
        let bin = self.options.program_name(argv.first().map(String::as_str));
        let args = argv.get(1..).unwrap_or_default();
        let result = self.route(&bin, args, stdout);
        report(result, &self.options, stdout, stderr)
    }

    /// Dispatches with the process arguments and standard streams.
    pub fn dispatch_env(&self) -> i32 {
        let argv = env_args();
        self.dispatch(&argv, &mut io::stdout().lock(), &mut io::stderr().lock())
    }

    fn route(&self, bin: &str, args: &[String], stdout: &mut dyn Write) -> Result<(), RunError> {
        match args.split_first() {
            Some((name, rest)) if !name.starts_with('-') => {
                let task = self
                    .get(name)
                    .ok_or_else(|| RunError::UnknownTask(name.clone()))?;
                run_task(task, &self.options, format!("{bin} {name}"), rest, stdout)
            }
            _ if self.options.wants_metadata(args) && self.tasks.len() > 1 => {
                let schemas: Vec<&FunctionSchema> = self.schemas().collect();
                writeln!(stdout, "{}", serde_json::to_string(&schemas)?)?;
                Ok(())
            }
            _ => {
                let task = self.tasks.last().ok_or(RunError::NoTasks)?;
                run_task(task, &self.options, bin.to_string(), args, stdout)
            }
        }
    }
}
