//! Compiles a function schema into a `clap` argument grammar.
//!
//! Every parameter becomes a `--<name>` flag. Lists take one or more values,
//! booleans defaulting to `true` get a `--no-<name>` twin, other booleans are
//! presence switches, and everything else takes a single value passed through
//! a per-kind caster. The runner adds `--<reserved>-output` and documents
//! `--<reserved>-metadata`.

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use clap::builder::ValueParser;
use clap::{Arg, ArgAction, ArgMatches, Command};
use scout_task_core::{ElementKind, FunctionSchema, ParameterSpec, TypeKind, Value};
use tracing::debug;

use crate::error::CastError;
use crate::options::RunnerOptions;

/// Parsed parameter values in schema order, plus the optional output path.
///
/// Absent optional parameters hold [`Value::Null`].
///
/// # Examples
///
/// ```
/// use scout_task_runner::Arguments;
///
/// let args = Arguments::new().with("count", 3).with("label", "x");
/// assert_eq!(args.get_i64("count"), Some(3));
/// assert_eq!(args.get_str("label"), Some("x"));
/// assert_eq!(args.get_str("missing"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: Vec<(String, Value)>,
    output: Option<PathBuf>,
}

impl Arguments {
    /// Creates an empty argument set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a value.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name.into(), value.into());
        self
    }

    /// Sets the output path.
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    fn insert(&mut self, name: String, value: Value) {
        match self.values.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.values.push((name, value)),
        }
    }

    /// Returns the value for `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    /// Returns a string or path value as text.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Returns an integer value.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    /// Returns a float value; integers are widened.
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    /// Returns a boolean value.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    /// Returns a path value.
    pub fn get_path(&self, name: &str) -> Option<&Path> {
        self.get(name).and_then(Value::as_path)
    }

    /// Returns the bytes of a binary or string value.
    pub fn get_bytes(&self, name: &str) -> Option<&[u8]> {
        self.get(name).and_then(Value::as_bytes)
    }

    /// Returns the items of a list value.
    pub fn get_list(&self, name: &str) -> Option<&[Value]> {
        self.get(name).and_then(Value::as_list)
    }

    /// Output path given with `--<reserved>-output`.
    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    /// Iterates over `(name, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of parameter values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when there are no parameter values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Command-line grammar compiled from a [`FunctionSchema`].
#[derive(Debug)]
pub struct ArgumentGrammar<'a> {
    schema: &'a FunctionSchema,
    command: Command,
    output_id: String,
}

impl<'a> ArgumentGrammar<'a> {
    /// Compiles the grammar for `schema`. `program` is the name shown in
    /// usage output.
    pub fn compile(
        schema: &'a FunctionSchema,
        options: &RunnerOptions,
        program: impl Into<String>,
    ) -> Self {
        let output_id = options.output_flag();
        let metadata_id = options.metadata_flag();

        let mut command = Command::new(program.into())
            .args_override_self(true)
            .disable_version_flag(true);
        if !schema.description.is_empty() {
            command = command.about(schema.description.clone());
        }
        for param in &schema.params {
            command = command.args(param_args(param));
        }
        command = command
            .arg(
                Arg::new(output_id.clone())
                    .long(output_id.clone())
                    .value_name("PATH")
                    .value_parser(clap::value_parser!(PathBuf))
                    .help("Optional output file path for the result"),
            )
            .arg(
                Arg::new(metadata_id.clone())
                    .long(metadata_id)
                    .action(ArgAction::SetTrue)
                    .help("Print the task schema as JSON and exit"),
            );

        debug!(task = %schema.name, params = schema.params.len(), "compiled argument grammar");

        Self {
            schema,
            command,
            output_id,
        }
    }

    /// The underlying `clap` command.
    pub fn command(&self) -> &Command {
        &self.command
    }

    /// Renders the usage text.
    pub fn render_help(&mut self) -> String {
        self.command.render_help().to_string()
    }

    /// Parses a full argument vector; the first item is the program name.
    ///
    /// # Errors
    ///
    /// Returns the `clap` error for unknown flags, missing required flags,
    /// values that fail their caster, and `--help` requests.
    pub fn parse<I, T>(&mut self, args: I) -> Result<Arguments, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self.command.try_get_matches_from_mut(args)?;
        let mut arguments = Arguments::new();
        for param in &self.schema.params {
            arguments.insert(param.name.clone(), extract(&matches, param));
        }
        arguments.output = matches.get_one::<PathBuf>(&self.output_id).cloned();
        Ok(arguments)
    }
}

fn negation_id(param: &ParameterSpec) -> String {
    format!("no-{}", param.name)
}

fn param_args(param: &ParameterSpec) -> Vec<Arg> {
    let name = param.name.clone();
    let mut arg = Arg::new(name.clone()).long(name.clone());
    if !param.help.is_empty() {
        arg = arg.help(param.help.clone());
    }

    match param.kind {
        TypeKind::Boolean if param.is_negatable() => {
            let negation = negation_id(param);
            vec![
                arg.action(ArgAction::SetTrue).overrides_with(negation.clone()),
                Arg::new(negation.clone())
                    .long(negation)
                    .action(ArgAction::SetTrue)
                    .overrides_with(name.clone())
                    .help(format!("Disable --{name}")),
            ]
        }
        TypeKind::Boolean => vec![arg.action(ArgAction::SetTrue)],
        TypeKind::List(element) => vec![
            arg.action(ArgAction::Set)
                .num_args(1..)
                .value_name(name.to_uppercase())
                .allow_negative_numbers(true)
                .required(param.required)
                .value_parser(caster(element)),
        ],
        scalar => vec![
            arg.action(ArgAction::Set)
                .value_name(name.to_uppercase())
                .allow_negative_numbers(true)
                .required(param.required)
                .value_parser(caster(scalar.element())),
        ],
    }
}

fn caster(element: ElementKind) -> ValueParser {
    ValueParser::new(move |raw: &str| cast_value(element, raw))
}

fn extract(matches: &ArgMatches, param: &ParameterSpec) -> Value {
    match param.kind {
        TypeKind::Boolean if param.is_negatable() => {
            Value::Boolean(!matches.get_flag(&negation_id(param)))
        }
        TypeKind::Boolean => {
            let declared = param.default.as_ref().and_then(Value::as_bool).unwrap_or(false);
            Value::Boolean(matches.get_flag(&param.name) || declared)
        }
        TypeKind::List(_) => matches
            .get_many::<Value>(&param.name)
            .map(|values| Value::List(values.cloned().collect()))
            .unwrap_or_else(|| declared_default(param)),
        _ => matches
            .get_one::<Value>(&param.name)
            .cloned()
            .unwrap_or_else(|| declared_default(param)),
    }
}

fn declared_default(param: &ParameterSpec) -> Value {
    param.default.clone().unwrap_or_default()
}

/// Casts one command-line value to `element`.
///
/// # Examples
///
/// ```
/// use scout_task_core::{ElementKind, Value};
/// use scout_task_runner::cast_value;
///
/// assert_eq!(cast_value(ElementKind::Integer, "42").unwrap(), Value::Integer(42));
/// assert_eq!(cast_value(ElementKind::Float, "2.5").unwrap(), Value::Float(2.5));
/// assert!(cast_value(ElementKind::Integer, "4.2").is_err());
/// ```
pub fn cast_value(element: ElementKind, raw: &str) -> Result<Value, CastError> {
    match element {
        ElementKind::String => Ok(Value::String(raw.to_string())),
        ElementKind::Binary => Ok(Value::Binary(raw.as_bytes().to_vec())),
        ElementKind::Integer => Ok(Value::Integer(raw.trim().parse()?)),
        ElementKind::Float => Ok(Value::Float(raw.trim().parse()?)),
        ElementKind::Path => Ok(Value::Path(normalize_path(raw))),
        ElementKind::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(Value::Boolean(true)),
            "false" | "no" | "0" => Ok(Value::Boolean(false)),
            _ => Err(CastError::Boolean(raw.to_string())),
        },
    }
}

/// Normalizes a path lexically: repeated separators, `.` components and
/// trailing separators are dropped. `..` is kept and nothing is resolved
/// against the filesystem.
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use scout_task_runner::normalize_path;
///
/// assert_eq!(normalize_path("a//b/./c/"), PathBuf::from("a/b/c"));
/// assert_eq!(normalize_path("./x"), PathBuf::from("x"));
/// assert_eq!(normalize_path(""), PathBuf::from("."));
/// ```
pub fn normalize_path(raw: &str) -> PathBuf {
    let normalized: PathBuf = Path::new(raw)
        .components()
        .filter(|component| *component != Component::CurDir)
        .collect();
    if normalized.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        normalized
    }
}
