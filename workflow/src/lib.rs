//! Drive scout task executables from a host program.
//!
//! The host side of the task protocol: ask an executable for its schema with
//! `--scout-metadata`, turn input values into flags with [`build_argv`], run
//! it and collect its stdout. [`WorkflowConfig`] lists executables in YAML
//! and [`TaskHost`] loads them all.
//!
//! # Example
//!
//! ```
//! use scout_task_core::{FunctionSignature, build_schema};
//! use scout_task_workflow::{TaskInputs, build_argv};
//!
//! let schema = build_schema(
//!     &FunctionSignature::new("count")
//!         .param("count", "int")
//!         .param_default("label", "str", "x"),
//! );
//! let argv = build_argv(&schema.params, &TaskInputs::new().with("count", 3)).unwrap();
//! assert_eq!(argv, ["--count", "3"]);
//! ```

mod argv;
mod config;
mod error;
mod external;
mod host;

pub use argv::{TaskInputs, build_argv};
pub use config::{TaskEntry, WorkflowConfig};
pub use error::{Result, WorkflowError};
pub use external::ExternalTask;
pub use host::{HostedTask, TaskHost};
