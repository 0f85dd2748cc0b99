//! Demonstration program: a handful of sample functions exposed as tasks.
//!
//! ```text
//! scout-demo [task] [--<param> <value> ...] [--scout-output <path>] [--scout-metadata]
//! ```
//!
//! Without a task name the last registered task, `count`, runs.

use std::collections::BTreeMap;

use scout_task_core::{FunctionSignature, Value};
use scout_task_runner::{Arguments, Output, RegistryError, TaskError, TaskRegistry};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() {
    // Logs go to stderr so task output on stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let registry = match build_registry() {
        Ok(registry) => registry,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    debug!(tasks = registry.len(), "dispatching");
    std::process::exit(registry.dispatch_env());
}

fn build_registry() -> Result<TaskRegistry, RegistryError> {
    let mut registry = TaskRegistry::new();
    registry
        .register(&inspect_signature(), inspect)?
        .register(&items_signature(), items)?
        .register(&blob_signature(), blob)?
        .register(&stats_signature(), stats)?
        .register(&fail_signature(), fail)?
        .register(&count_signature(), count)?;
    Ok(registry)
}

fn inspect_signature() -> FunctionSignature {
    FunctionSignature::new("inspect")
        .param("path", "Path")
        .param_default("ratio", "float", 1.5)
        .param_default("color", "bool", true)
        .param("verbose", "bool")
        .param("tags", "Optional[list[str]]")
        .param_default("nums", "list[int]", vec![1, 2])
        .param("payload", "Optional[bytes]")
        .returns("dict")
        .doc(
            "Report the parsed arguments.

            Parameters
            ----------
            path : Path
                file or directory to look at
            ratio : scaling factor
            color : colorize the report
            verbose : include details
            tags : labels to attach
            nums : numbers to carry along
            payload : raw bytes
            ",
        )
}

/// Echoes every parsed argument back as JSON.
fn inspect(args: &Arguments) -> Result<Output, TaskError> {
    let report: BTreeMap<String, Value> = args
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect();
    Ok(Output::structured(report))
}

fn items_signature() -> FunctionSignature {
    FunctionSignature::new("items")
        .param("n", "int")
        .param_default("prefix", "str", "item")
        .returns("list[str]")
        .doc("List numbered items.\n\nParameters\n----------\nn : how many items\nprefix : text before each number")
}

fn items(args: &Arguments) -> Result<Output, TaskError> {
    let n = args.get_i64("n").unwrap_or(0);
    let prefix = args.get_str("prefix").unwrap_or_default();
    Ok(Output::lines((0..n).map(|i| format!("{prefix}-{i}"))))
}

fn blob_signature() -> FunctionSignature {
    FunctionSignature::new("blob")
        .param_default("size", "int", 4)
        .returns("bytes")
        .doc("Emit raw bytes 0, 1, 2, ... wrapping at 256.")
}

fn blob(args: &Arguments) -> Result<Output, TaskError> {
    let size = usize::try_from(args.get_i64("size").unwrap_or(0))?;
    Ok(Output::bytes((0..size).map(|i| (i % 256) as u8).collect::<Vec<u8>>()))
}

fn stats_signature() -> FunctionSignature {
    FunctionSignature::new("stats")
        .param("values", "list[float]")
        .returns("Dict[str, float]")
        .doc("Summarize numbers.\n\nParameters\n----------\nvalues : numbers to summarize")
}

#[derive(Debug, Serialize)]
struct Summary {
    count: usize,
    sum: f64,
    mean: Option<f64>,
}

fn stats(args: &Arguments) -> Result<Output, TaskError> {
    let values: Vec<f64> = args
        .get_list("values")
        .unwrap_or_default()
        .iter()
        .filter_map(Value::as_f64)
        .collect();
    let sum: f64 = values.iter().sum();
    let mean = (!values.is_empty()).then(|| sum / values.len() as f64);
    Ok(Output::structured(Summary {
        count: values.len(),
        sum,
        mean,
    }))
}

fn fail_signature() -> FunctionSignature {
    FunctionSignature::new("fail")
        .param_default("message", "str", "boom")
        .doc("Always fail with the given message.")
}

fn fail(args: &Arguments) -> Result<Output, TaskError> {
    Err(args.get_str("message").unwrap_or_default().to_string().into())
}

fn count_signature() -> FunctionSignature {
    FunctionSignature::new("count")
        .param("count", "int")
        .param_default("label", "str", "x")
        .returns("str")
        .doc("Computes.\n\nParameters\n----------\ncount : number of items")
}

fn count(args: &Arguments) -> Result<Output, TaskError> {
    let count = usize::try_from(args.get_i64("count").unwrap_or(0))?;
    let label = args.get_str("label").unwrap_or_default();
    Ok(Output::text(label.repeat(count)))
}
