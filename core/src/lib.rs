//! Core schema types for exposing plain functions as command-line tasks.
//!
//! Rust has no runtime signature reflection, so a task author describes each
//! function once with a [`FunctionSignature`] table. This crate turns that
//! table into a normalized [`FunctionSchema`]:
//!
//! - [`map_type`]: maps a [`TypeAnnotation`] to one of the closed set of
//!   [`TypeKind`]s. Total: unknown annotations degrade to `string`.
//! - [`parse_parameter_docs`] / [`description`]: extract per-parameter help
//!   text and the one-line description from a numpydoc-style docstring.
//! - [`FunctionSchema::from_signature`]: combines both into the schema that
//!   drives argument parsing and the metadata dump.
//!
//! Validation ([`validate_schema`]) catches structural problems such as
//! duplicate parameters or names that collide with the runner's own flags.
//!
//! # Example
//!
//! ```
//! use scout_task_core::*;
//!
//! let signature = FunctionSignature::new("count")
//!     .param("count", "int")
//!     .param_default("label", "str", "x")
//!     .returns("str")
//!     .doc("Computes.\n\nParameters\n----------\ncount : number of items");
//!
//! let schema = FunctionSchema::from_signature(&signature);
//! assert_eq!(schema.description, "Computes.");
//! assert_eq!(schema.params[0].kind, TypeKind::Integer);
//! assert!(schema.params[0].required);
//! assert_eq!(schema.params[0].help, "number of items");
//! assert!(!schema.params[1].required);
//! assert!(validate_schema(&schema, DEFAULT_RESERVED_NAME).is_empty());
//! ```

mod annotation;
mod docstring;
mod schema;
mod types;
mod validate;

pub use annotation::{TypeAnnotation, map_type};
pub use docstring::{clean_doc, description, parse_parameter_docs};
pub use schema::{FunctionSchema, FunctionSignature, ParamDecl, ParameterSpec, build_schema};
pub use types::*;
pub use validate::{ValidationError, reserved_parameter_names, validate_schema};

/// Prefix of the runner's own flags (`--scout-output`, `--scout-metadata`).
pub const DEFAULT_RESERVED_NAME: &str = "scout";
