//! Task invocation: parse, call, write, report.

use std::fmt;
use std::io::{self, Write};

use scout_task_core::{FunctionSchema, FunctionSignature, build_schema, validate_schema};
use tracing::debug;

use crate::error::{RegistryError, RunError, TaskError};
use crate::grammar::{ArgumentGrammar, Arguments};
use crate::options::RunnerOptions;
use crate::output::{Output, write_output_file};

/// Signature of a task callable.
pub type TaskFn = dyn Fn(&Arguments) -> Result<Output, TaskError> + Send + Sync;

/// A function paired with the schema derived from its signature.
pub struct Task {
    schema: FunctionSchema,
    callable: Box<TaskFn>,
}

impl Task {
    /// Derives the schema from `signature` and wraps `callable`.
    pub fn new<F>(signature: &FunctionSignature, callable: F) -> Self
    where
        F: Fn(&Arguments) -> Result<Output, TaskError> + Send + Sync + 'static,
    {
        Self::from_schema(build_schema(signature), callable)
    }

    /// Wraps `callable` with a prepared schema.
    pub fn from_schema<F>(schema: FunctionSchema, callable: F) -> Self
    where
        F: Fn(&Arguments) -> Result<Output, TaskError> + Send + Sync + 'static,
    {
        Self {
            schema,
            callable: Box::new(callable),
        }
    }

    /// Task name.
    pub fn name(&self) -> &str {
        &self.schema.name
    }

    /// Schema of the wrapped function.
    pub fn schema(&self) -> &FunctionSchema {
        &self.schema
    }

    /// Calls the function with parsed arguments.
    pub fn call(&self, args: &Arguments) -> Result<Output, TaskError> {
        (self.callable)(args)
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// Runs a single task as a whole program.
#[derive(Debug)]
pub struct Runner {
    task: Task,
    options: RunnerOptions,
}

impl Runner {
    /// Creates a runner with default options.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidSchema`] when the task schema cannot
    /// be expressed as a command line.
    pub fn new(task: Task) -> Result<Self, RegistryError> {
        Self::with_options(task, RunnerOptions::default())
    }

    /// Creates a runner with custom options.
    pub fn with_options(task: Task, options: RunnerOptions) -> Result<Self, RegistryError> {
        check_schema(task.schema(), &options)?;
        Ok(Self { task, options })
    }

    /// The wrapped task.
    pub fn task(&self) -> &Task {
        &self.task
    }

    /// Runs the task for a full argument vector (program name first) and
    /// returns the process exit code.
    pub fn run(&self, argv: &[String], stdout: &mut dyn Write, stderr: &mut dyn Write) -> i32 {
        let program = self.options.program_name(argv.first().map(String::as_str));
        let args = argv.get(1..).unwrap_or_default();
        let result = run_task(&self.task, &self.options, program, args, stdout);
        report(result, &self.options, stdout, stderr)
    }

    /// Runs the task with the process arguments and standard streams.
    pub fn run_env(&self) -> i32 {
        let argv = env_args();
        self.run(&argv, &mut io::stdout().lock(), &mut io::stderr().lock())
    }
}

pub(crate) fn env_args() -> Vec<String> {
    std::env::args_os()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect()
}

pub(crate) fn check_schema(
    schema: &FunctionSchema,
    options: &RunnerOptions,
) -> Result<(), RegistryError> {
    let errors = validate_schema(schema, &options.reserved);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(RegistryError::InvalidSchema {
            name: schema.name.clone(),
            errors,
        })
    }
}

/// Runs one task for `args` (program name excluded).
pub(crate) fn run_task(
    task: &Task,
    options: &RunnerOptions,
    program: String,
    args: &[String],
    stdout: &mut dyn Write,
) -> Result<(), RunError> {
    if options.wants_metadata(args) {
        debug!(task = %task.name(), "printing metadata");
        writeln!(stdout, "{}", task.schema().to_metadata_json()?)?;
        return Ok(());
    }

    let mut grammar = ArgumentGrammar::compile(task.schema(), options, program.clone());
    let arguments = grammar.parse(std::iter::once(program).chain(args.iter().cloned()))?;

    debug!(task = %task.name(), args = arguments.len(), "invoking task");
    let output = task.call(&arguments).map_err(RunError::Invocation)?;

    match arguments.output() {
        Some(path) => write_output_file(path, &output).map_err(|source| RunError::OutputFile {
            path: path.to_path_buf(),
            source,
        })?,
        None => output.write_to(stdout)?,
    }
    Ok(())
}

/// Reports the outcome of a run and returns its exit code.
pub(crate) fn report(
    result: Result<(), RunError>,
    options: &RunnerOptions,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> i32 {
    let err = match result {
        Ok(()) => return 0,
        Err(err) => err,
    };

    let written = match &err {
        RunError::Usage(usage) if usage.use_stderr() => write!(stderr, "{}", usage.render()),
        RunError::Usage(usage) => write!(stdout, "{}", usage.render()),
        RunError::UnknownTask(_) | RunError::NoTasks => {
            writeln!(stderr, "{} {err}", options.error_tag())
        }
        _ => writeln!(stderr, "{} Error: {err}", options.error_tag()),
    };
    if let Err(e) = written {
        debug!(error = %e, "failed to report run error");
    }

    err.exit_code()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use scout_task_core::ValidationError;

    use super::*;

    fn count_task() -> Task {
        let signature = FunctionSignature::new("count")
            .param("count", "int")
            .param_default("label", "str", "x")
            .returns("str")
            .doc("Computes.\n\nParameters\n----------\ncount : number of items");
        Task::new(&signature, |args| {
            let count = args.get_i64("count").unwrap_or(0);
            if count < 0 {
                return Err(format!("count must not be negative, got {count}").into());
            }
            let label = args.get_str("label").unwrap_or_default();
            Ok(Output::text(label.repeat(count as usize)))
        })
    }

    fn run(args: &[&str]) -> (i32, String, String) {
        let runner = Runner::new(count_task()).unwrap();
        let argv: Vec<String> = std::iter::once("count")
            .chain(args.iter().copied())
            .map(String::from)
            .collect();
        let (mut stdout, mut stderr) = (Vec::new(), Vec::new());
        let code = runner.run(&argv, &mut stdout, &mut stderr);
        (
            code,
            String::from_utf8(stdout).unwrap(),
            String::from_utf8(stderr).unwrap(),
        )
    }

    #[test]
    fn test_success() {
        assert_eq!(run(&["--count", "3"]), (0, "xxx\n".to_string(), String::new()));
        assert_eq!(run(&["--count", "2", "--label", "ab"]).1, "abab\n");
    }

    #[test]
    fn test_metadata_short_circuits() {
        let (code, stdout, _) = run(&["--scout-metadata"]);
        assert_eq!(code, 0);
        let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
        assert_eq!(json["name"], "count");
        assert_eq!(json["description"], "Computes.");
        assert_eq!(json["params"][0]["help"], "number of items");
        assert_eq!(json["params"][1]["default"], "x");
    }

    #[test]
    fn test_usage_errors_exit_2() {
        let (code, stdout, stderr) = run(&[]);
        assert_eq!(code, 2);
        assert!(stdout.is_empty());
        assert!(stderr.contains("--count"), "{stderr}");

        assert_eq!(run(&["--count", "many"]).0, 2);
        assert_eq!(run(&["--count", "1", "--nope"]).0, 2);
    }

    #[test]
    fn test_help_goes_to_stdout() {
        let (code, stdout, stderr) = run(&["--help"]);
        assert_eq!(code, 0);
        assert!(stdout.contains("number of items"));
        assert!(stdout.contains("--scout-output"));
        assert!(stderr.is_empty());
    }

    #[test]
    fn test_task_failure_exits_1_with_tag() {
        let (code, stdout, stderr) = run(&["--count", "-1"]);
        assert_eq!(code, 1);
        assert!(stdout.is_empty());
        assert_eq!(stderr, "[scout.task] Error: count must not be negative, got -1\n");
    }

    #[test]
    fn test_output_file_suppresses_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub/out.txt");
        let (code, stdout, _) = run(&["--count", "2", "--scout-output", path.to_str().unwrap()]);
        assert_eq!(code, 0);
        assert!(stdout.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "xx");
    }

    #[test]
    fn test_output_file_failure_exits_1() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "").unwrap();
        let target = blocker.join("out.txt");
        let (code, _, stderr) = run(&["--count", "1", "--scout-output", target.to_str().unwrap()]);
        assert_eq!(code, 1);
        assert!(stderr.starts_with("[scout.task] Error: failed to write output file"));
    }

    #[test]
    fn test_custom_reserved_prefix() {
        let options = RunnerOptions::new("job").with_program("counter");
        let runner = Runner::with_options(count_task(), options).unwrap();
        let argv = ["ignored", "--count", "1", "--job-metadata"].map(String::from);
        let (mut stdout, mut stderr) = (Vec::new(), Vec::new());
        assert_eq!(runner.run(&argv, &mut stdout, &mut stderr), 0);
        assert!(String::from_utf8(stdout).unwrap().starts_with("{\"name\":\"count\""));

        let argv = ["ignored", "--count", "-2"].map(String::from);
        let (mut stdout, mut stderr) = (Vec::new(), Vec::new());
        assert_eq!(runner.run(&argv, &mut stdout, &mut stderr), 1);
        assert!(String::from_utf8(stderr).unwrap().starts_with("[job.task] Error:"));
    }

    #[test]
    fn test_invalid_schema_is_rejected() {
        let signature = FunctionSignature::new("bad").param("scout-output", "str");
        let err = Runner::new(Task::new(&signature, |_| Ok(Output::none()))).unwrap_err();
        assert_eq!(
            err,
            RegistryError::InvalidSchema {
                name: "bad".to_string(),
                errors: vec![ValidationError::ReservedParameter("scout-output".to_string())],
            }
        );
    }
}
