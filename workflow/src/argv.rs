//! Building a task's command line from input values.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use scout_task_core::{ParameterSpec, TypeKind, Value};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Input values for one task run, keyed by parameter name.
///
/// Missing and `Null` values are left off the command line, so the task
/// applies its own defaults.
///
/// # Examples
///
/// ```
/// use scout_task_workflow::TaskInputs;
///
/// let inputs = TaskInputs::new().with("count", 3).with("label", "ab");
/// assert_eq!(inputs.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskInputs(BTreeMap<String, Value>);

impl TaskInputs {
    /// Creates an empty input set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Adds or replaces a value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Returns the value for `name`, ignoring `Null`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|value| !value.is_null())
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when there are no values.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Builds the argument list for `params` from `inputs`.
///
/// - lists take an explicit list, the path of an existing file (one item per
///   line), a comma-separated string or a single value, and emit the flag
///   once followed by every item (nothing for an empty list);
/// - booleans defaulting to `true` emit `--no-<name>` only when false, other
///   booleans emit `--<name>` only when true;
/// - everything else emits `--<name> <value>`.
///
/// # Errors
///
/// Fails only when a list is given as a file that cannot be read.
///
/// # Examples
///
/// ```
/// use scout_task_core::{FunctionSignature, build_schema};
/// use scout_task_workflow::{TaskInputs, build_argv};
///
/// let schema = build_schema(
///     &FunctionSignature::new("t")
///         .param("count", "int")
///         .param_default("color", "bool", true)
///         .param("tags", "list[str]"),
/// );
/// let inputs = TaskInputs::new()
///     .with("count", 2)
///     .with("color", false)
///     .with("tags", "a, b");
/// assert_eq!(
///     build_argv(&schema.params, &inputs).unwrap(),
///     ["--count", "2", "--no-color", "--tags", "a", "b"]
/// );
/// ```
pub fn build_argv(params: &[ParameterSpec], inputs: &TaskInputs) -> Result<Vec<String>> {
    let mut argv = Vec::new();
    for param in params {
        let Some(value) = inputs.get(&param.name) else {
            continue;
        };
        let flag = format!("--{}", param.name);

        match param.kind {
            TypeKind::List(_) => {
                let items = list_items(value)?;
                if !items.is_empty() {
                    argv.push(flag);
                    argv.extend(items);
                }
            }
            TypeKind::Boolean if param.is_negatable() => {
                if !truthy(value) {
                    argv.push(format!("--no-{}", param.name));
                }
            }
            TypeKind::Boolean => {
                if truthy(value) {
                    argv.push(flag);
                }
            }
            _ => {
                argv.push(flag);
                argv.push(value.to_string());
            }
        }
    }
    Ok(argv)
}

fn list_items(value: &Value) -> Result<Vec<String>> {
    let text = match value {
        Value::List(items) => return Ok(items.iter().map(ToString::to_string).collect()),
        Value::String(text) => text.as_str(),
        Value::Path(path) if path.is_file() => return read_lines(path),
        other => return Ok(vec![other.to_string()]),
    };

    let path = Path::new(text);
    if path.is_file() {
        read_lines(path)
    } else if text.contains(',') {
        Ok(text.split(',').map(|item| item.trim().to_string()).collect())
    } else {
        Ok(vec![text.to_string()])
    }
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path)?;
    Ok(contents.lines().map(str::to_string).collect())
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Boolean(b) => *b,
        Value::String(s) => !matches!(s.trim().to_ascii_lowercase().as_str(), "" | "false" | "no" | "0"),
        Value::Integer(n) => *n != 0,
        Value::Null => false,
        _ => true,
    }
}
