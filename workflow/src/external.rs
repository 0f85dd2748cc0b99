//! Running a task executable as a child process.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::Duration;

use scout_task_core::{DEFAULT_RESERVED_NAME, FunctionSchema};
use tracing::debug;
use wait_timeout::ChildExt;

use crate::argv::{TaskInputs, build_argv};
use crate::error::{Result, WorkflowError};

/// An executable that exposes one or more tasks through the runner's
/// command line.
///
/// `prefix_args` come before everything else; for a multi-task program this
/// is usually the task name.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use scout_task_workflow::{ExternalTask, TaskInputs};
///
/// let task = ExternalTask::new("./scout-demo")
///     .with_args(["count"])
///     .with_timeout(Duration::from_secs(30));
/// let schema = task.read_schema().unwrap();
/// let stdout = task.run(&schema, &TaskInputs::new().with("count", 3)).unwrap();
/// assert_eq!(stdout, b"xxx\n");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalTask {
    program: PathBuf,
    prefix_args: Vec<String>,
    timeout: Option<Duration>,
    reserved: String,
}

/// Exit status and captured streams of one run.
#[derive(Debug)]
struct Captured {
    status: ExitStatus,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl ExternalTask {
    /// Creates a task for `program` with no prefix arguments and no timeout.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            prefix_args: Vec::new(),
            timeout: None,
            reserved: DEFAULT_RESERVED_NAME.to_string(),
        }
    }

    /// Sets the arguments placed before the task flags.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prefix_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Kills the process when it runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the reserved flag prefix the executable was built with.
    pub fn with_reserved(mut self, reserved: impl Into<String>) -> Self {
        self.reserved = reserved.into();
        self
    }

    /// Path of the executable.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments placed before the task flags.
    pub fn prefix_args(&self) -> &[String] {
        &self.prefix_args
    }

    /// Configured timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Asks the executable for its metadata.
    ///
    /// A program with one task answers with a schema object, a multi-task
    /// program without a task name answers with an array; both are returned
    /// as a list.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::Metadata`] when the program exits unsuccessfully,
    /// [`WorkflowError::Json`] when its output is not a schema document.
    pub fn read_metadata(&self) -> Result<Vec<FunctionSchema>> {
        let flag = format!("--{}-metadata", self.reserved);
        let captured = self.execute(&self.label(), std::slice::from_ref(&flag))?;
        if !captured.status.success() {
            return Err(WorkflowError::Metadata {
                program: self.program.clone(),
                message: String::from_utf8_lossy(&captured.stderr).trim().to_string(),
            });
        }

        let document: serde_json::Value = serde_json::from_slice(&captured.stdout)?;
        let schemas: Vec<FunctionSchema> = if document.is_array() {
            serde_json::from_value(document)?
        } else {
            vec![serde_json::from_value(document)?]
        };
        Ok(schemas)
    }

    /// Asks the executable for the metadata of exactly one task.
    pub fn read_schema(&self) -> Result<FunctionSchema> {
        let mut schemas = self.read_metadata()?;
        match schemas.len() {
            1 => Ok(schemas.remove(0)),
            n => Err(WorkflowError::Metadata {
                program: self.program.clone(),
                message: format!("expected one task schema, got {n}"),
            }),
        }
    }

    /// Runs the task with `inputs` and returns its stdout.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::TaskFailed`] on a non-zero exit (usage errors
    /// included), [`WorkflowError::Timeout`] when the timeout expires.
    pub fn run(&self, schema: &FunctionSchema, inputs: &TaskInputs) -> Result<Vec<u8>> {
        let args = build_argv(&schema.params, inputs)?;
        let captured = self.execute(&schema.name, &args)?;
        check_status(&schema.name, captured)
    }

    /// Runs the task and has it write its result to `path`.
    pub fn run_to_file(&self, schema: &FunctionSchema, inputs: &TaskInputs, path: &Path) -> Result<()> {
        let mut args = build_argv(&schema.params, inputs)?;
        args.push(format!("--{}-output", self.reserved));
        args.push(path.to_string_lossy().into_owned());
        let captured = self.execute(&schema.name, &args)?;
        check_status(&schema.name, captured).map(|_| ())
    }

    fn label(&self) -> String {
        self.program.display().to_string()
    }

    fn execute(&self, name: &str, args: &[String]) -> Result<Captured> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.prefix_args)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        debug!(program = %self.program.display(), args = ?args, "spawning task");

        let mut child = command.spawn()?;
        // Both pipes are drained while waiting so a chatty child cannot block
        // on a full buffer.
        let stdout_thread = child.stdout.take().map(drain);
        let stderr_thread = child.stderr.take().map(drain);

        let status = match self.wait(&mut child) {
            Ok(Some(status)) => status,
            Ok(None) => {
                let timeout = self.timeout.unwrap_or_default();
                debug!(task = %name, timeout = ?timeout, "task timed out, killing process");
                let _ = child.kill();
                let _ = child.wait();
                return Err(WorkflowError::Timeout {
                    name: name.to_string(),
                    timeout,
                });
            }
            Err(e) => {
                debug!(task = %name, error = %e, "failed to wait on task");
                let _ = child.kill();
                let _ = child.wait();
                return Err(e.into());
            }
        };

        Ok(Captured {
            status,
            stdout: collect(stdout_thread)?,
            stderr: collect(stderr_thread)?,
        })
    }

    fn wait(&self, child: &mut Child) -> std::io::Result<Option<ExitStatus>> {
        match self.timeout {
            Some(timeout) => child.wait_timeout(timeout),
            None => child.wait().map(Some),
        }
    }
}

type Drain = JoinHandle<std::io::Result<Vec<u8>>>;

fn drain(mut pipe: impl Read + Send + 'static) -> Drain {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

fn collect(thread: Option<Drain>) -> Result<Vec<u8>> {
    match thread.map(JoinHandle::join) {
        Some(Ok(result)) => Ok(result?),
        Some(Err(_)) => Err(std::io::Error::other("pipe reader thread panicked").into()),
        None => Ok(Vec::new()),
    }
}

fn check_status(name: &str, captured: Captured) -> Result<Vec<u8>> {
    if captured.status.success() {
        debug!(task = %name, bytes = captured.stdout.len(), "task finished");
        return Ok(captured.stdout);
    }
    Err(WorkflowError::TaskFailed {
        name: name.to_string(),
        code: captured.status.code(),
        stderr: String::from_utf8_lossy(&captured.stderr).trim().to_string(),
    })
}

#[cfg(all(test, unix))]
mod tests {
    use std::fs;

    use super::*;

    /// Runs `body` through `/bin/sh` so no freshly written file is executed
    /// directly.
    fn shell_task(dir: &Path, body: &str, extra: &[&str]) -> ExternalTask {
        let path = dir.join("task.sh");
        fs::write(&path, format!("{body}\n")).unwrap();
        let mut args = vec![path.to_string_lossy().into_owned()];
        args.extend(extra.iter().map(|arg| arg.to_string()));
        ExternalTask::new("/bin/sh").with_args(args)
    }

    #[test]
    fn test_read_metadata_object_and_array() {
        let dir = tempfile::tempdir().unwrap();
        let body = r#"if [ "$1" = "all" ]; then echo '[{"name":"a"},{"name":"b"}]'; else echo '{"name":"a","params":[]}'; fi"#;

        let single = shell_task(dir.path(), body, &[]).read_metadata().unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].name, "a");

        let all = shell_task(dir.path(), body, &["all"]);
        let names: Vec<_> = all.read_metadata().unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["a", "b"]);
        assert!(matches!(all.read_schema(), Err(WorkflowError::Metadata { .. })));
    }

    #[test]
    fn test_metadata_failure() {
        let dir = tempfile::tempdir().unwrap();
        let task = shell_task(dir.path(), "echo broken >&2; exit 3", &[]);
        match task.read_metadata().unwrap_err() {
            WorkflowError::Metadata { message, .. } => assert_eq!(message, "broken"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_run_passes_flags_and_captures_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let task = shell_task(dir.path(), r#"printf '%s|' "$@""#, &["t"]);
        let schema: FunctionSchema = serde_json::from_str(
            r#"{"name":"t","params":[{"name":"n","type":"integer","required":true}]}"#,
        )
        .unwrap();
        let stdout = task.run(&schema, &TaskInputs::new().with("n", 4)).unwrap();
        assert_eq!(stdout, b"t|--n|4|");
    }

    #[test]
    fn test_run_failure_reports_code_and_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let task = shell_task(dir.path(), "echo '[scout.task] Error: nope' >&2; exit 1", &[]);
        let schema: FunctionSchema = serde_json::from_str(r#"{"name":"t"}"#).unwrap();
        match task.run(&schema, &TaskInputs::new()).unwrap_err() {
            WorkflowError::TaskFailed { name, code, stderr } => {
                assert_eq!(name, "t");
                assert_eq!(code, Some(1));
                assert_eq!(stderr, "[scout.task] Error: nope");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_timeout_kills_the_task() {
        let dir = tempfile::tempdir().unwrap();
        let task = shell_task(dir.path(), "exec sleep 5", &[]).with_timeout(Duration::from_millis(200));
        let schema: FunctionSchema = serde_json::from_str(r#"{"name":"slow"}"#).unwrap();
        let err = task.run(&schema, &TaskInputs::new()).unwrap_err();
        assert!(matches!(err, WorkflowError::Timeout { ref name, .. } if name == "slow"));
    }

    #[test]
    fn test_missing_program() {
        let err = ExternalTask::new("/nonexistent/scout-task").read_metadata().unwrap_err();
        assert!(matches!(err, WorkflowError::Io(_)));
    }
}
