//! Value and type definitions shared by every stage of the pipeline.
//!
//! [`TypeKind`] is the closed set of semantic categories a parameter or
//! return value can have. [`Value`] carries typed values: declared defaults
//! and parsed command-line arguments. Both serialize to the plain JSON shapes
//! used by the metadata document.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Element kind of a list parameter.
///
/// The same set as [`TypeKind`] minus `List`, which makes nested lists
/// unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ElementKind {
    /// Text (the default).
    #[default]
    String,
    /// Base-10 whole number.
    Integer,
    /// Decimal number.
    Float,
    /// Logical value.
    Boolean,
    /// Raw bytes.
    Binary,
    /// Filesystem path.
    Path,
}

impl ElementKind {
    /// Returns the textual form used in metadata documents.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Binary => "binary",
            Self::Path => "path",
        }
    }
}

/// Semantic kind of a parameter or return value.
///
/// # Examples
///
/// ```
/// use scout_task_core::{ElementKind, TypeKind};
///
/// assert_eq!(TypeKind::default(), TypeKind::String);
/// assert_eq!(TypeKind::List(ElementKind::Integer).to_string(), "list[integer]");
/// assert_eq!("path".parse::<TypeKind>().unwrap(), TypeKind::Path);
/// assert!("list[list[integer]]".parse::<TypeKind>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum TypeKind {
    /// Text (the default and the fallback for unknown annotations).
    #[default]
    String,
    /// Base-10 whole number.
    Integer,
    /// Decimal number.
    Float,
    /// Logical value.
    Boolean,
    /// Raw bytes.
    Binary,
    /// Filesystem path.
    Path,
    /// One level of list over a scalar kind.
    List(ElementKind),
}

impl TypeKind {
    /// Returns the scalar kind, or the element kind for lists.
    pub fn element(self) -> ElementKind {
        match self {
            Self::String => ElementKind::String,
            Self::Integer => ElementKind::Integer,
            Self::Float => ElementKind::Float,
            Self::Boolean => ElementKind::Boolean,
            Self::Binary => ElementKind::Binary,
            Self::Path => ElementKind::Path,
            Self::List(element) => element,
        }
    }

    /// Returns `true` for `list[...]` kinds.
    pub fn is_list(self) -> bool {
        matches!(self, Self::List(_))
    }
}

impl From<ElementKind> for TypeKind {
    fn from(element: ElementKind) -> Self {
        match element {
            ElementKind::String => Self::String,
            ElementKind::Integer => Self::Integer,
            ElementKind::Float => Self::Float,
            ElementKind::Boolean => Self::Boolean,
            ElementKind::Binary => Self::Binary,
            ElementKind::Path => Self::Path,
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List(element) => write!(f, "list[{element}]"),
            scalar => f.write_str(scalar.element().as_str()),
        }
    }
}

/// Error returned when a textual type kind is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown type kind: {0}")]
pub struct ParseKindError(pub String);

impl FromStr for ElementKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "string" => Ok(Self::String),
            "integer" => Ok(Self::Integer),
            "float" => Ok(Self::Float),
            "boolean" => Ok(Self::Boolean),
            "binary" => Ok(Self::Binary),
            "path" => Ok(Self::Path),
            other => Err(ParseKindError(other.to_string())),
        }
    }
}

impl FromStr for TypeKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(inner) = s.strip_prefix("list[").and_then(|rest| rest.strip_suffix(']')) {
            // `list[]` is what an unresolved inner type looks like on the wire.
            if inner.trim().is_empty() {
                return Ok(Self::List(ElementKind::String));
            }
            return inner
                .parse::<ElementKind>()
                .map(Self::List)
                .map_err(|_| ParseKindError(s.to_string()));
        }
        s.parse::<ElementKind>().map(Self::from)
    }
}

impl From<TypeKind> for String {
    fn from(kind: TypeKind) -> Self {
        kind.to_string()
    }
}

impl TryFrom<String> for TypeKind {
    type Error = ParseKindError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A typed value: a declared default or a parsed argument.
///
/// # Examples
///
/// ```
/// use scout_task_core::Value;
///
/// let v = Value::from(3);
/// assert_eq!(v.as_i64(), Some(3));
/// assert_eq!(v.as_f64(), Some(3.0));
/// assert_eq!(Value::from(2.5).to_string(), "2.5");
/// assert_eq!(Value::Null.to_string(), "");
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// No value.
    #[default]
    Null,
    /// Text.
    String(String),
    /// Whole number.
    Integer(i64),
    /// Decimal number.
    Float(f64),
    /// Logical value.
    Boolean(bool),
    /// Raw bytes.
    Binary(Vec<u8>),
    /// Filesystem path.
    Path(PathBuf),
    /// Ordered list of scalar values.
    List(Vec<Value>),
}

impl Value {
    /// Wraps raw bytes.
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Binary(bytes.into())
    }

    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the text of a string or path value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Path(p) => p.to_str(),
            _ => None,
        }
    }

    /// Returns the integer value.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the value as a float; integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(n) => Some(*n),
            Self::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Returns the logical value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the value as a path; string values are accepted.
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Self::Path(p) => Some(p),
            Self::String(s) => Some(Path::new(s)),
            _ => None,
        }
    }

    /// Returns the bytes of a binary or string value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Binary(b) => Some(b),
            Self::String(s) => Some(s.as_bytes()),
            _ => None,
        }
    }

    /// Returns the items of a list value.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Checks whether this value can stand for a parameter of `kind`.
    ///
    /// `Null` fits every kind. Integers fit `float`, strings fit `path` and
    /// `binary`, and list items must fit the element kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use scout_task_core::{ElementKind, TypeKind, Value};
    ///
    /// assert!(Value::from(1).fits(TypeKind::Float));
    /// assert!(!Value::from("x").fits(TypeKind::Integer));
    /// let list = Value::List(vec![Value::from(1), Value::from(2)]);
    /// assert!(list.fits(TypeKind::List(ElementKind::Integer)));
    /// ```
    pub fn fits(&self, kind: TypeKind) -> bool {
        match (self, kind) {
            (Self::Null, _) => true,
            (Self::List(items), TypeKind::List(element)) => {
                items.iter().all(|item| item.fits(element.into()))
            }
            (Self::List(_), _) | (_, TypeKind::List(_)) => false,
            (Self::String(_), TypeKind::String | TypeKind::Binary | TypeKind::Path) => true,
            (Self::Binary(_), TypeKind::Binary | TypeKind::String) => true,
            (Self::Path(_), TypeKind::Path | TypeKind::String) => true,
            (Self::Integer(_), TypeKind::Integer | TypeKind::Float) => true,
            (Self::Float(_), TypeKind::Float) => true,
            (Self::Boolean(_), TypeKind::Boolean) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::String(s) => f.write_str(s),
            Self::Integer(n) => write!(f, "{n}"),
            // Debug keeps the fractional part: 3.0 rather than 3.
            Self::Float(n) => write!(f, "{n:?}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Binary(b) => f.write_str(&String::from_utf8_lossy(b)),
            Self::Path(p) => write!(f, "{}", p.display()),
            Self::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Integer(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<PathBuf> for Value {
    fn from(p: PathBuf) -> Self {
        Self::Path(p)
    }
}

impl From<&Path> for Value {
    fn from(p: &Path) -> Self {
        Self::Path(p.to_path_buf())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            object @ serde_json::Value::Object(_) => Self::String(object.to_string()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::String(s) => serializer.serialize_str(s),
            Self::Integer(n) => serializer.serialize_i64(*n),
            Self::Float(n) => serializer.serialize_f64(*n),
            Self::Boolean(b) => serializer.serialize_bool(*b),
            Self::Binary(b) => serializer.serialize_str(&String::from_utf8_lossy(b)),
            Self::Path(p) => serializer.serialize_str(&p.to_string_lossy()),
            Self::List(items) => serializer.collect_seq(items),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Self::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_kind_textual_forms() {
        let kinds = [
            (TypeKind::String, "string"),
            (TypeKind::Integer, "integer"),
            (TypeKind::Float, "float"),
            (TypeKind::Boolean, "boolean"),
            (TypeKind::Binary, "binary"),
            (TypeKind::Path, "path"),
            (TypeKind::List(ElementKind::Path), "list[path]"),
        ];
        for (kind, text) in kinds {
            assert_eq!(kind.to_string(), text);
            assert_eq!(text.parse::<TypeKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_type_kind_rejects_unknown_text() {
        assert_eq!(
            "dict".parse::<TypeKind>(),
            Err(ParseKindError("dict".to_string()))
        );
        assert!("list[list[string]]".parse::<TypeKind>().is_err());
    }

    #[test]
    fn test_empty_list_inner_defaults_to_string() {
        assert_eq!(
            "list[]".parse::<TypeKind>().unwrap(),
            TypeKind::List(ElementKind::String)
        );
    }

    #[test]
    fn test_type_kind_serializes_as_text() {
        let json = serde_json::to_string(&TypeKind::List(ElementKind::Float)).unwrap();
        assert_eq!(json, "\"list[float]\"");
        let kind: TypeKind = serde_json::from_str("\"boolean\"").unwrap();
        assert_eq!(kind, TypeKind::Boolean);
    }

    #[test]
    fn test_value_json_shapes() {
        let value = Value::List(vec![
            Value::from(1),
            Value::from(1.5),
            Value::from(true),
            Value::from("a"),
            Value::Path(PathBuf::from("dir/file")),
            Value::Null,
        ]);
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json, serde_json::json!([1, 1.5, true, "a", "dir/file", null]));

        let back: Value = serde_json::from_value(json).unwrap();
        assert_eq!(back.as_list().map(<[Value]>::len), Some(6));
        assert_eq!(back.as_list().unwrap()[0], Value::Integer(1));
    }

    #[test]
    fn test_value_display_keeps_float_fraction() {
        assert_eq!(Value::from(3.0).to_string(), "3.0");
        assert_eq!(Value::from(vec![1, 2, 3]).to_string(), "1,2,3");
    }

    #[test]
    fn test_value_fits_kinds() {
        assert!(Value::Null.fits(TypeKind::Integer));
        assert!(Value::from("p").fits(TypeKind::Path));
        assert!(!Value::from(1.5).fits(TypeKind::Integer));
        assert!(!Value::from(vec!["a"]).fits(TypeKind::String));
        assert!(!Value::from(vec!["a"]).fits(TypeKind::List(ElementKind::Integer)));
    }
}
