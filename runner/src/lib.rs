//! Run a described function as a command-line task.
//!
//! The pipeline compiles a [`FunctionSchema`] into a `clap` grammar
//! ([`ArgumentGrammar`]), parses process arguments into [`Arguments`], calls
//! the task and writes its tagged [`Output`] to stdout or to the file named
//! by `--scout-output`. `--scout-metadata` prints the schema instead.
//!
//! - [`Runner`]: one function, one program.
//! - [`TaskRegistry`]: several functions in one program, selected by a
//!   leading task name.
//!
//! # Example
//!
//! ```
//! use scout_task_core::FunctionSignature;
//! use scout_task_runner::{Output, Runner, Task};
//!
//! let signature = FunctionSignature::new("count")
//!     .param("count", "int")
//!     .param_default("label", "str", "x")
//!     .returns("str");
//! let task = Task::new(&signature, |args| {
//!     let count = args.get_i64("count").unwrap_or(0);
//!     let label = args.get_str("label").unwrap_or_default();
//!     Ok(Output::text(label.repeat(count as usize)))
//! });
//!
//! let argv = ["count", "--count", "3"].map(String::from);
//! let (mut stdout, mut stderr) = (Vec::new(), Vec::new());
//! let runner = Runner::new(task).unwrap();
//! let code = runner.run(&argv, &mut stdout, &mut stderr);
//! assert_eq!(code, 0);
//! assert_eq!(String::from_utf8(stdout).unwrap(), "xxx\n");
//! ```
//!
//! [`FunctionSchema`]: scout_task_core::FunctionSchema

mod error;
mod grammar;
mod invoke;
mod options;
mod output;
mod registry;

pub use error::{CastError, RegistryError, RunError, TaskError};
pub use grammar::{ArgumentGrammar, Arguments, cast_value, normalize_path};
pub use invoke::{Runner, Task, TaskFn};
pub use options::RunnerOptions;
pub use output::{Item, Output, Scalar, StructuredValue, write_output_file};
pub use registry::TaskRegistry;
