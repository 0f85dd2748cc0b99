//! Type annotations and the total mapping onto [`TypeKind`].
//!
//! A [`TypeAnnotation`] describes the declared type of a parameter the way
//! the author wrote it. Annotations can be built directly or parsed from
//! text; both Python-style (`Optional[int]`, `list[str]`) and Rust-style
//! (`Option<i64>`, `Vec<String>`) spellings are understood.

use std::convert::Infallible;
use std::str::FromStr;

use crate::types::{ElementKind, TypeKind};

/// Declared type of a parameter or return value.
///
/// # Examples
///
/// ```
/// use scout_task_core::TypeAnnotation;
///
/// let ann: TypeAnnotation = "Optional[int]".parse().unwrap();
/// assert_eq!(ann, TypeAnnotation::Optional(Box::new(TypeAnnotation::Int)));
/// assert!(ann.is_optional());
///
/// let ann: TypeAnnotation = "Vec<PathBuf>".parse().unwrap();
/// assert_eq!(ann, TypeAnnotation::Sequence(Some(Box::new(TypeAnnotation::Path))));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TypeAnnotation {
    /// No annotation given.
    #[default]
    Absent,
    /// The "no value" type (`None`, `()`).
    NoneType,
    /// Text.
    Str,
    /// Raw bytes.
    Bytes,
    /// Whole number.
    Int,
    /// Decimal number.
    Float,
    /// Logical value.
    Bool,
    /// Filesystem path.
    Path,
    /// `Optional[X]` / `Option<X>`.
    Optional(Box<TypeAnnotation>),
    /// `Union[A, B, ...]` / `A | B`.
    Union(Vec<TypeAnnotation>),
    /// Homogeneous sequence, with the element type when declared.
    Sequence(Option<Box<TypeAnnotation>>),
    /// Anything else, kept verbatim.
    Other(String),
}

impl TypeAnnotation {
    /// Returns `true` when the annotation admits "no value": an `Optional`,
    /// or a union with a `None` arm.
    pub fn is_optional(&self) -> bool {
        match self {
            Self::Optional(_) => true,
            Self::Union(arms) => arms.iter().any(|arm| *arm == Self::NoneType),
            _ => false,
        }
    }
}

/// Maps an annotation onto its [`TypeKind`].
///
/// Never fails: anything unrecognized maps to [`TypeKind::String`].
///
/// # Examples
///
/// ```
/// use scout_task_core::{map_type, ElementKind, TypeAnnotation, TypeKind};
///
/// assert_eq!(map_type(&TypeAnnotation::Absent), TypeKind::String);
/// assert_eq!(map_type(&"Optional[float]".parse().unwrap()), TypeKind::Float);
/// assert_eq!(map_type(&"Union[int, str]".parse().unwrap()), TypeKind::String);
/// assert_eq!(
///     map_type(&"list[int]".parse().unwrap()),
///     TypeKind::List(ElementKind::Integer)
/// );
/// assert_eq!(map_type(&"dict[str, int]".parse().unwrap()), TypeKind::String);
/// ```
pub fn map_type(annotation: &TypeAnnotation) -> TypeKind {
    match annotation {
        TypeAnnotation::Absent => TypeKind::String,
        TypeAnnotation::Optional(inner) => map_type(inner),
        TypeAnnotation::Union(arms) => {
            let mut present = arms.iter().filter(|arm| **arm != TypeAnnotation::NoneType);
            match (present.next(), present.next()) {
                (Some(only), None) => map_type(only),
                _ => TypeKind::String,
            }
        }
        TypeAnnotation::Sequence(inner) => {
            let element = match inner.as_deref().map(map_type) {
                // One level of nesting only: an inner list degrades to text.
                Some(TypeKind::List(_)) | None => ElementKind::String,
                Some(kind) => kind.element(),
            };
            TypeKind::List(element)
        }
        TypeAnnotation::Path => TypeKind::Path,
        TypeAnnotation::Str => TypeKind::String,
        TypeAnnotation::Bytes => TypeKind::Binary,
        TypeAnnotation::Int => TypeKind::Integer,
        TypeAnnotation::Float => TypeKind::Float,
        TypeAnnotation::Bool => TypeKind::Boolean,
        TypeAnnotation::NoneType | TypeAnnotation::Other(_) => TypeKind::String,
    }
}

impl FromStr for TypeAnnotation {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(parse_annotation(s))
    }
}

impl From<&str> for TypeAnnotation {
    fn from(s: &str) -> Self {
        parse_annotation(s)
    }
}

fn parse_annotation(text: &str) -> TypeAnnotation {
    let text = text.trim();
    if text.is_empty() {
        return TypeAnnotation::Absent;
    }

    let arms = split_top_level(text, '|');
    if arms.len() > 1 {
        return TypeAnnotation::Union(arms.into_iter().map(parse_annotation).collect());
    }

    if let Some(inner) = text.strip_prefix("&[").and_then(|rest| rest.strip_suffix(']')) {
        return sequence_of(inner);
    }

    if let Some((head, args)) = split_generic(text) {
        let head = strip_module(head);
        return match head {
            "Optional" | "Option" => match args.as_slice() {
                [inner] => TypeAnnotation::Optional(Box::new(parse_annotation(inner))),
                _ => TypeAnnotation::Other(text.to_string()),
            },
            "Union" => TypeAnnotation::Union(args.into_iter().map(parse_annotation).collect()),
            "list" | "List" | "Vec" | "Sequence" => match args.as_slice() {
                [inner] => sequence_of(inner),
                [] => TypeAnnotation::Sequence(None),
                _ => TypeAnnotation::Other(text.to_string()),
            },
            _ => TypeAnnotation::Other(text.to_string()),
        };
    }

    match strip_module(text) {
        "None" | "NoneType" | "()" => TypeAnnotation::NoneType,
        "str" | "String" | "&str" | "char" => TypeAnnotation::Str,
        "bytes" | "bytearray" => TypeAnnotation::Bytes,
        "int" | "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32"
        | "u64" | "u128" | "usize" => TypeAnnotation::Int,
        "float" | "f32" | "f64" => TypeAnnotation::Float,
        "bool" => TypeAnnotation::Bool,
        "Path" | "PathBuf" | "&Path" => TypeAnnotation::Path,
        "list" | "List" | "Vec" | "Sequence" => TypeAnnotation::Sequence(None),
        _ => TypeAnnotation::Other(text.to_string()),
    }
}

fn sequence_of(inner: &str) -> TypeAnnotation {
    // `Vec<u8>` and `&[u8]` are byte buffers, not lists of numbers.
    if inner.trim() == "u8" {
        return TypeAnnotation::Bytes;
    }
    match parse_annotation(inner) {
        TypeAnnotation::Absent => TypeAnnotation::Sequence(None),
        other => TypeAnnotation::Sequence(Some(Box::new(other))),
    }
}

/// Drops `typing.` / `pathlib.` / `std::path::` style qualifiers.
fn strip_module(name: &str) -> &str {
    let name = name.rsplit("::").next().unwrap_or(name);
    if name.contains('[') || name.contains('<') {
        return name;
    }
    name.rsplit('.').next().unwrap_or(name)
}

/// Splits `Head[a, b]` or `Head<a, b>` into the head and its arguments.
fn split_generic(text: &str) -> Option<(&str, Vec<&str>)> {
    let (open, close) = if text.ends_with(']') {
        ('[', ']')
    } else if text.ends_with('>') {
        ('<', '>')
    } else {
        return None;
    };
    let start = text.find(open)?;
    let head = text[..start].trim();
    if head.is_empty() {
        return None;
    }
    let inner = &text[start + 1..text.len() - close.len_utf8()];
    let args = if inner.trim().is_empty() {
        Vec::new()
    } else {
        split_top_level(inner, ',')
    };
    Some((head, args))
}

/// Splits on `separator` outside of any bracket pair.
fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '[' | '<' | '(' => depth += 1,
            ']' | '>' | ')' => depth = depth.saturating_sub(1),
            c if c == separator && depth == 0 => {
                parts.push(text[start..i].trim());
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(text[start..].trim());
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(text: &str) -> TypeKind {
        map_type(&text.parse().unwrap())
    }

    #[test]
    fn test_primitive_annotations() {
        assert_eq!(kind("str"), TypeKind::String);
        assert_eq!(kind("bytes"), TypeKind::Binary);
        assert_eq!(kind("int"), TypeKind::Integer);
        assert_eq!(kind("float"), TypeKind::Float);
        assert_eq!(kind("bool"), TypeKind::Boolean);
        assert_eq!(kind("pathlib.Path"), TypeKind::Path);
    }

    #[test]
    fn test_rust_spellings() {
        assert_eq!(kind("u32"), TypeKind::Integer);
        assert_eq!(kind("f64"), TypeKind::Float);
        assert_eq!(kind("std::path::PathBuf"), TypeKind::Path);
        assert_eq!(kind("Vec<u8>"), TypeKind::Binary);
        assert_eq!(kind("&[u8]"), TypeKind::Binary);
        assert_eq!(kind("Vec<String>"), TypeKind::List(ElementKind::String));
        assert_eq!(kind("Option<i64>"), TypeKind::Integer);
    }

    #[test]
    fn test_optional_and_union() {
        assert_eq!(kind("typing.Optional[int]"), TypeKind::Integer);
        assert_eq!(kind("Union[None, float]"), TypeKind::Float);
        assert_eq!(kind("int | None"), TypeKind::Integer);
        assert_eq!(kind("int | str | None"), TypeKind::String);
        assert_eq!(kind("Union[int, str]"), TypeKind::String);
    }

    #[test]
    fn test_sequences() {
        assert_eq!(kind("list"), TypeKind::List(ElementKind::String));
        assert_eq!(kind("List[float]"), TypeKind::List(ElementKind::Float));
        assert_eq!(kind("list[Optional[int]]"), TypeKind::List(ElementKind::Integer));
        assert_eq!(kind("list[Path]"), TypeKind::List(ElementKind::Path));
        assert_eq!(kind("list[list[int]]"), TypeKind::List(ElementKind::String));
        assert_eq!(kind("list[Unknown]"), TypeKind::List(ElementKind::String));
    }

    #[test]
    fn test_unknown_annotations_degrade_to_string() {
        for text in ["dict[str, int]", "MyClass", "None", "tuple[int, int]", "Callable[[], int]"] {
            assert_eq!(kind(text), TypeKind::String, "{text}");
        }
        assert_eq!(kind(""), TypeKind::String);
    }

    #[test]
    fn test_is_optional() {
        assert!(TypeAnnotation::from("Optional[int]").is_optional());
        assert!(TypeAnnotation::from("Union[int, None]").is_optional());
        assert!(TypeAnnotation::from("str | None").is_optional());
        assert!(!TypeAnnotation::from("int").is_optional());
        assert!(!TypeAnnotation::from("None").is_optional());
        assert!(!TypeAnnotation::Absent.is_optional());
    }

    #[test]
    fn test_mapping_is_total_over_constructed_annotations() {
        let samples = vec![
            TypeAnnotation::Absent,
            TypeAnnotation::NoneType,
            TypeAnnotation::Union(vec![]),
            TypeAnnotation::Union(vec![TypeAnnotation::NoneType]),
            TypeAnnotation::Optional(Box::new(TypeAnnotation::Sequence(None))),
            TypeAnnotation::Sequence(Some(Box::new(TypeAnnotation::Sequence(Some(Box::new(
                TypeAnnotation::Int,
            )))))),
            TypeAnnotation::Other(String::new()),
        ];
        for ann in &samples {
            let mapped = map_type(ann);
            if let TypeKind::List(element) = mapped {
                assert_ne!(TypeKind::from(element), TypeKind::List(element));
            }
        }
    }
}
