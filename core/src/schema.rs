//! Signature tables and the normalized function schema built from them.

use serde::{Deserialize, Serialize};

use crate::annotation::{TypeAnnotation, map_type};
use crate::docstring::{description, parse_parameter_docs};
use crate::types::{TypeKind, Value};

/// One declared parameter: name, annotation and optional default.
///
/// # Examples
///
/// ```
/// use scout_task_core::{ParamDecl, TypeAnnotation, Value};
///
/// let decl = ParamDecl::new("label", "str").with_default("x");
/// assert_eq!(decl.annotation, TypeAnnotation::Str);
/// assert_eq!(decl.default, Some(Value::from("x")));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDecl {
    /// Parameter name; also the long flag name.
    pub name: String,
    /// Declared type.
    pub annotation: TypeAnnotation,
    /// Declared default, if any.
    pub default: Option<Value>,
}

impl ParamDecl {
    /// Creates a parameter without a default.
    pub fn new(name: impl Into<String>, annotation: impl Into<TypeAnnotation>) -> Self {
        Self {
            name: name.into(),
            annotation: annotation.into(),
            default: None,
        }
    }

    /// Sets the declared default.
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Explicit description of a function's callable interface.
///
/// Stands in for runtime reflection: the author lists parameters in
/// declaration order with their annotations and defaults, plus the return
/// annotation and the docstring.
///
/// # Examples
///
/// ```
/// use scout_task_core::FunctionSignature;
///
/// let sig = FunctionSignature::new("resize")
///     .param("image", "Path")
///     .param_default("scale", "float", 1.0)
///     .param("tags", "Optional[list[str]]")
///     .returns("bytes")
///     .doc("Resizes an image.");
///
/// assert_eq!(sig.params.len(), 3);
/// assert_eq!(sig.params[1].name, "scale");
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FunctionSignature {
    /// Function (and task) name.
    pub name: String,
    /// Parameters in declaration order.
    pub params: Vec<ParamDecl>,
    /// Declared return type.
    pub returns: TypeAnnotation,
    /// Numpydoc-style documentation.
    pub doc: String,
}

impl FunctionSignature {
    /// Creates an empty signature for `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Appends a parameter without a default.
    pub fn param(self, name: impl Into<String>, annotation: impl Into<TypeAnnotation>) -> Self {
        self.with_param(ParamDecl::new(name, annotation))
    }

    /// Appends a parameter with a default.
    pub fn param_default(
        self,
        name: impl Into<String>,
        annotation: impl Into<TypeAnnotation>,
        default: impl Into<Value>,
    ) -> Self {
        self.with_param(ParamDecl::new(name, annotation).with_default(default))
    }

    /// Appends a prepared parameter declaration.
    pub fn with_param(mut self, param: ParamDecl) -> Self {
        self.params.push(param);
        self
    }

    /// Sets the return annotation.
    pub fn returns(mut self, annotation: impl Into<TypeAnnotation>) -> Self {
        self.returns = annotation.into();
        self
    }

    /// Sets the docstring.
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }
}

/// Normalized description of one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Parameter name.
    pub name: String,
    /// Semantic kind.
    #[serde(rename = "type")]
    pub kind: TypeKind,
    /// Whether the flag must be given. Never `true` when a default exists.
    pub required: bool,
    /// Declared default.
    #[serde(default)]
    pub default: Option<Value>,
    /// One-line help text, empty when undocumented.
    #[serde(default)]
    pub help: String,
}

impl ParameterSpec {
    /// Derives the parameter description for one declaration.
    fn from_decl(decl: &ParamDecl, help: Option<&String>) -> Self {
        Self {
            name: decl.name.clone(),
            kind: map_type(&decl.annotation),
            required: decl.default.is_none() && !decl.annotation.is_optional(),
            default: decl.default.clone(),
            help: help.cloned().unwrap_or_default(),
        }
    }

    /// Returns `true` for a boolean whose default is `true`, which gets a
    /// `--no-<name>` negation flag.
    pub fn is_negatable(&self) -> bool {
        self.kind == TypeKind::Boolean && self.default == Some(Value::Boolean(true))
    }
}

/// Normalized, language-agnostic description of a function.
///
/// Serializes to the metadata document printed by `--scout-metadata`:
///
/// ```
/// use scout_task_core::{FunctionSchema, FunctionSignature};
///
/// let schema = FunctionSchema::from_signature(
///     &FunctionSignature::new("count")
///         .param("count", "int")
///         .param_default("label", "str", "x")
///         .returns("str")
///         .doc("Computes.\n\nParameters\n----------\ncount : number of items"),
/// );
/// let json: serde_json::Value = serde_json::to_value(&schema).unwrap();
/// assert_eq!(
///     json["params"][0],
///     serde_json::json!({
///         "name": "count",
///         "type": "integer",
///         "required": true,
///         "default": null,
///         "help": "number of items"
///     })
/// );
/// assert_eq!(json["returns"], "string");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSchema {
    /// Function name.
    pub name: String,
    /// First paragraph of the docstring.
    #[serde(default)]
    pub description: String,
    /// Kind of the returned value.
    #[serde(default)]
    pub returns: TypeKind,
    /// Parameters in declaration order.
    #[serde(default)]
    pub params: Vec<ParameterSpec>,
}

impl FunctionSchema {
    /// Builds the schema for a signature table.
    pub fn from_signature(signature: &FunctionSignature) -> Self {
        let docs = parse_parameter_docs(&signature.doc);
        Self {
            name: signature.name.clone(),
            description: description(&signature.doc),
            returns: map_type(&signature.returns),
            params: signature
                .params
                .iter()
                .map(|decl| ParameterSpec::from_decl(decl, docs.get(&decl.name)))
                .collect(),
        }
    }

    /// Finds a parameter by name.
    pub fn param(&self, name: &str) -> Option<&ParameterSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Encodes the schema as the compact JSON metadata document.
    pub fn to_metadata_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Builds the schema for a signature table.
///
/// Same as [`FunctionSchema::from_signature`].
pub fn build_schema(signature: &FunctionSignature) -> FunctionSchema {
    FunctionSchema::from_signature(signature)
}
