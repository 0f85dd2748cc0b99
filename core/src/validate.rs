//! Schema validation.
//!
//! Catches schemas that cannot be turned into an unambiguous command line:
//! empty or malformed names, duplicate parameters, parameters that collide
//! with the runner's own flags, and defaults that do not fit their kind.
//!
//! # Examples
//!
//! ```
//! use scout_task_core::*;
//!
//! let schema = build_schema(&FunctionSignature::new("ok").param("count", "int"));
//! assert!(validate_schema(&schema, "scout").is_empty());
//!
//! // `help` is taken by `-h/--help`.
//! let bad = build_schema(&FunctionSignature::new("bad").param("help", "str"));
//! assert_eq!(
//!     validate_schema(&bad, "scout"),
//!     vec![ValidationError::ReservedParameter("help".to_string())]
//! );
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::schema::FunctionSchema;
use crate::types::TypeKind;

/// Schema validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Function name is empty or whitespace-only.
    #[error("function name cannot be empty")]
    EmptyFunctionName,
    /// Parameter name is empty, contains whitespace or `=`, or starts with `-`.
    #[error("invalid parameter name: {0:?}")]
    InvalidParameterName(String),
    /// Two parameters share a name.
    #[error("duplicate parameter: {0}")]
    DuplicateParameter(String),
    /// Parameter name is one of the runner's own flags.
    #[error("parameter name is reserved: {0}")]
    ReservedParameter(String),
    /// Parameter `no-<x>` collides with the negation flag of boolean `x`.
    #[error("parameter {0} collides with a boolean negation flag")]
    NegationConflict(String),
    /// Declared default does not fit the parameter kind.
    #[error("default for parameter {name} does not fit type {kind}")]
    DefaultKindMismatch {
        /// Parameter name.
        name: String,
        /// Declared kind.
        kind: TypeKind,
    },
    /// Parameter is marked required but carries a default.
    #[error("required parameter {0} cannot have a default")]
    RequiredWithDefault(String),
}

/// Returns the parameter names a schema may not use for a given reserved
/// flag prefix.
///
/// # Examples
///
/// ```
/// use scout_task_core::reserved_parameter_names;
///
/// assert!(reserved_parameter_names("scout").contains(&"scout-output".to_string()));
/// ```
pub fn reserved_parameter_names(reserved: &str) -> Vec<String> {
    vec![
        "help".to_string(),
        "h".to_string(),
        format!("{reserved}-output"),
        format!("{reserved}-metadata"),
    ]
}

/// Validates a function schema against a reserved flag prefix.
///
/// Returns every problem found, in parameter order.
pub fn validate_schema(schema: &FunctionSchema, reserved: &str) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if schema.name.trim().is_empty() {
        errors.push(ValidationError::EmptyFunctionName);
        return errors;
    }

    let reserved_names = reserved_parameter_names(reserved);
    let negations: HashSet<String> = schema
        .params
        .iter()
        .filter(|p| p.is_negatable())
        .map(|p| format!("no-{}", p.name))
        .collect();
    let mut seen: HashSet<&str> = HashSet::new();

    for param in &schema.params {
        let name = param.name.as_str();
        if !is_valid_flag_name(name) {
            errors.push(ValidationError::InvalidParameterName(name.to_string()));
            continue;
        }
        if !seen.insert(name) {
            errors.push(ValidationError::DuplicateParameter(name.to_string()));
        }
        if reserved_names.iter().any(|r| r == name) {
            errors.push(ValidationError::ReservedParameter(name.to_string()));
        }
        if negations.contains(name) {
            errors.push(ValidationError::NegationConflict(name.to_string()));
        }
        if param.required && param.default.is_some() {
            errors.push(ValidationError::RequiredWithDefault(name.to_string()));
        }
        if param.default.as_ref().is_some_and(|d| !d.fits(param.kind)) {
            errors.push(ValidationError::DefaultKindMismatch {
                name: name.to_string(),
                kind: param.kind,
            });
        }
    }

    errors
}

fn is_valid_flag_name(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('-') && !name.contains(|c: char| c.is_whitespace() || c == '=')
}
