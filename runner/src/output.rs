//! Task results and how they are written.
//!
//! A task returns one tagged [`Output`]. On stdout, binary results are
//! written raw, scalars get a trailing newline, sequences print one element
//! per line and structured results print as compact JSON. With an output
//! path, the result goes to that file instead.

use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

/// Single-valued result.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Scalar {
    /// No value; prints as an empty line.
    #[default]
    None,
    /// Text.
    Text(String),
    /// Integer.
    Integer(i64),
    /// Float; always printed with a fractional part.
    Float(f64),
    /// `true` or `false`.
    Boolean(bool),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::None => Ok(()),
            Scalar::Text(text) => f.write_str(text),
            Scalar::Integer(value) => write!(f, "{value}"),
            Scalar::Float(value) => write!(f, "{value:?}"),
            Scalar::Boolean(value) => write!(f, "{value}"),
        }
    }
}

/// One element of a sequence result.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// Empty line.
    None,
    /// Raw bytes followed by a newline.
    Binary(Vec<u8>),
    /// Textual form followed by a newline.
    Scalar(Scalar),
}

impl Item {
    fn write_line(&self, out: &mut dyn Write) -> io::Result<()> {
        match self {
            Item::None => out.write_all(b"\n"),
            Item::Binary(bytes) => {
                out.write_all(bytes)?;
                out.write_all(b"\n")
            }
            Item::Scalar(scalar) => writeln!(out, "{scalar}"),
        }
    }

    fn text(&self) -> Cow<'_, str> {
        match self {
            Item::None => Cow::Borrowed(""),
            Item::Binary(bytes) => String::from_utf8_lossy(bytes),
            Item::Scalar(scalar) => Cow::Owned(scalar.to_string()),
        }
    }
}

impl From<Scalar> for Item {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::None => Item::None,
            other => Item::Scalar(other),
        }
    }
}

impl From<&str> for Item {
    fn from(text: &str) -> Self {
        Item::Scalar(Scalar::Text(text.to_string()))
    }
}

impl From<String> for Item {
    fn from(text: String) -> Self {
        Item::Scalar(Scalar::Text(text))
    }
}

impl From<i64> for Item {
    fn from(value: i64) -> Self {
        Item::Scalar(Scalar::Integer(value))
    }
}

impl From<f64> for Item {
    fn from(value: f64) -> Self {
        Item::Scalar(Scalar::Float(value))
    }
}

impl From<bool> for Item {
    fn from(value: bool) -> Self {
        Item::Scalar(Scalar::Boolean(value))
    }
}

impl From<Vec<u8>> for Item {
    fn from(bytes: Vec<u8>) -> Self {
        Item::Binary(bytes)
    }
}

impl<T: Into<Item>> From<Option<T>> for Item {
    fn from(value: Option<T>) -> Self {
        value.map_or(Item::None, Into::into)
    }
}

/// A structured result: anything that can be encoded as JSON.
///
/// Implemented for every `Serialize + Debug` type. The `Debug` text is the
/// fallback when encoding fails.
pub trait StructuredValue: fmt::Debug {
    /// Encodes the value as compact JSON.
    fn to_json(&self) -> serde_json::Result<String>;
}

impl<T: Serialize + fmt::Debug> StructuredValue for T {
    fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// The tagged value a task returns.
///
/// # Examples
///
/// ```
/// use scout_task_runner::Output;
///
/// let mut stdout = Vec::new();
/// Output::lines(["a", "b"]).write_to(&mut stdout).unwrap();
/// assert_eq!(stdout, b"a\nb\n");
///
/// assert_eq!(Output::float(3.0).to_text(), "3.0");
/// assert_eq!(Output::boolean(false).to_text(), "false");
/// ```
#[derive(Debug)]
pub enum Output {
    /// Raw bytes.
    Binary(Vec<u8>),
    /// A single value.
    Scalar(Scalar),
    /// An ordered collection, one line per element.
    Sequence(Vec<Item>),
    /// A mapping or record, encoded as JSON.
    Structured(Box<dyn StructuredValue>),
}

impl Output {
    /// Text result.
    pub fn text(text: impl Into<String>) -> Self {
        Output::Scalar(Scalar::Text(text.into()))
    }

    /// Integer result.
    pub fn integer(value: i64) -> Self {
        Output::Scalar(Scalar::Integer(value))
    }

    /// Float result.
    pub fn float(value: f64) -> Self {
        Output::Scalar(Scalar::Float(value))
    }

    /// Boolean result.
    pub fn boolean(value: bool) -> Self {
        Output::Scalar(Scalar::Boolean(value))
    }

    /// Empty result; prints an empty line.
    pub fn none() -> Self {
        Output::Scalar(Scalar::None)
    }

    /// Binary result.
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Output::Binary(bytes.into())
    }

    /// Sequence result.
    pub fn lines<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Item>,
    {
        Output::Sequence(items.into_iter().map(Into::into).collect())
    }

    /// Structured result.
    pub fn structured(value: impl Serialize + fmt::Debug + 'static) -> Self {
        Output::Structured(Box::new(value))
    }

    /// Writes the result in its stdout form.
    pub fn write_to(&self, out: &mut dyn Write) -> io::Result<()> {
        match self {
            Output::Binary(bytes) => out.write_all(bytes)?,
            Output::Scalar(scalar) => writeln!(out, "{scalar}")?,
            Output::Sequence(items) => {
                for item in items {
                    item.write_line(out)?;
                }
            }
            Output::Structured(value) => writeln!(out, "{}", structured_text(value.as_ref()))?,
        }
        out.flush()
    }

    /// Textual form used for file output of non-binary results.
    ///
    /// Scalars have no trailing newline; sequence elements each end with one.
    pub fn to_text(&self) -> String {
        match self {
            Output::Binary(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            Output::Scalar(scalar) => scalar.to_string(),
            Output::Sequence(items) => items.iter().fold(String::new(), |mut text, item| {
                text.push_str(&item.text());
                text.push('\n');
                text
            }),
            Output::Structured(value) => structured_text(value.as_ref()),
        }
    }

    fn file_contents(&self) -> Cow<'_, [u8]> {
        match self {
            Output::Binary(bytes) => Cow::Borrowed(bytes),
            other => Cow::Owned(other.to_text().into_bytes()),
        }
    }
}

fn structured_text(value: &dyn StructuredValue) -> String {
    match value.to_json() {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "structured result is not JSON-encodable, using debug text");
            format!("{value:?}")
        }
    }
}

impl From<Scalar> for Output {
    fn from(scalar: Scalar) -> Self {
        Output::Scalar(scalar)
    }
}

impl From<&str> for Output {
    fn from(text: &str) -> Self {
        Output::text(text)
    }
}

impl From<String> for Output {
    fn from(text: String) -> Self {
        Output::text(text)
    }
}

impl From<i64> for Output {
    fn from(value: i64) -> Self {
        Output::integer(value)
    }
}

impl From<f64> for Output {
    fn from(value: f64) -> Self {
        Output::float(value)
    }
}

impl From<bool> for Output {
    fn from(value: bool) -> Self {
        Output::boolean(value)
    }
}

impl From<Vec<u8>> for Output {
    fn from(bytes: Vec<u8>) -> Self {
        Output::Binary(bytes)
    }
}

impl From<Vec<Item>> for Output {
    fn from(items: Vec<Item>) -> Self {
        Output::Sequence(items)
    }
}

/// Writes `output` to `path`, creating parent directories.
///
/// An existing file is truncated and keeps its permissions; a new file gets
/// the process default mode. Symlinks are followed.
pub fn write_output_file(path: &Path, output: &Output) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let contents = output.file_contents();
    fs::write(path, &contents)?;

    debug!(path = %path.display(), bytes = contents.len(), "wrote output file");
    Ok(())
}
