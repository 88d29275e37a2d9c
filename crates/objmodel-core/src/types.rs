//! Runtime type tags and literal type inference.
//!
//! Polymorphic ("mixed") columns store values of varying runtime type; the
//! filter grammar exposes that type through `property.@type` comparisons.
//! This module provides the tag vocabulary and the inference rules that
//! classify a literal into one or more tags. Numeric literals are
//! deliberately ambiguous: without schema knowledge an integer literal may
//! live in an `int`, `float`, or `double` column.

use crate::value::Value;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Symbolic label for a polymorphic column's runtime value kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    Null,
    Bool,
    Int,
    Float,
    Double,
    String,
    Date,
    Data,
    ObjectId,
    Decimal128,
    Uuid,
    Object,
    List,
}

impl TypeTag {
    /// The tag spelling used by the filter grammar.
    pub const fn as_str(self) -> &'static str {
        match self {
            TypeTag::Null => "null",
            TypeTag::Bool => "bool",
            TypeTag::Int => "int",
            TypeTag::Float => "float",
            TypeTag::Double => "double",
            TypeTag::String => "string",
            TypeTag::Date => "date",
            TypeTag::Data => "data",
            TypeTag::ObjectId => "objectId",
            TypeTag::Decimal128 => "decimal128",
            TypeTag::Uuid => "uuid",
            TypeTag::Object => "object",
            TypeTag::List => "list",
        }
    }

    /// Parse a tag spelling back into a tag.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "null" => Some(TypeTag::Null),
            "bool" => Some(TypeTag::Bool),
            "int" => Some(TypeTag::Int),
            "float" => Some(TypeTag::Float),
            "double" => Some(TypeTag::Double),
            "string" => Some(TypeTag::String),
            "date" => Some(TypeTag::Date),
            "data" => Some(TypeTag::Data),
            "objectId" => Some(TypeTag::ObjectId),
            "decimal128" => Some(TypeTag::Decimal128),
            "uuid" => Some(TypeTag::Uuid),
            "object" => Some(TypeTag::Object),
            "list" => Some(TypeTag::List),
            _ => None,
        }
    }

    /// The runtime tag of a concrete value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => TypeTag::Null,
            Value::Bool(_) => TypeTag::Bool,
            Value::Int(_) => TypeTag::Int,
            Value::Double(_) => TypeTag::Double,
            Value::Text(s) => {
                if is_date_like(s) {
                    TypeTag::Date
                } else {
                    TypeTag::String
                }
            }
            Value::List(_) => TypeTag::List,
            Value::Record(_) => TypeTag::Object,
        }
    }

    /// Classify a literal into the tag set it could belong to.
    ///
    /// Rules, in priority order: a string that is already a tag spelling
    /// passes through unchanged; numeric literals return the ambiguous
    /// `{int, float, double}` set; date-like strings return `date`;
    /// any other string returns `string`. Lists classify element-wise
    /// and flatten.
    pub fn infer(value: &Value) -> Vec<TypeTag> {
        match value {
            Value::Text(s) => {
                if let Some(tag) = TypeTag::parse(s) {
                    vec![tag]
                } else if is_date_like(s) {
                    vec![TypeTag::Date]
                } else {
                    vec![TypeTag::String]
                }
            }
            Value::Int(_) | Value::Double(_) => {
                vec![TypeTag::Int, TypeTag::Float, TypeTag::Double]
            }
            Value::Bool(_) => vec![TypeTag::Bool],
            Value::Null => vec![TypeTag::Null],
            Value::List(items) => {
                let mut tags = Vec::new();
                for item in items {
                    for tag in TypeTag::infer(item) {
                        if !tags.contains(&tag) {
                            tags.push(tag);
                        }
                    }
                }
                tags
            }
            Value::Record(_) => vec![TypeTag::Object],
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type constraint input: explicit tag(s), or a literal to infer from.
///
/// This is the tagged-variant form of the original "tag name, list of tags,
/// or sample value" overload set; one normalization path
/// ([`TypeSpec::tags`]) serves every variant.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeSpec {
    /// A single explicit tag
    Tag(TypeTag),
    /// Several explicit tags
    Tags(Vec<TypeTag>),
    /// A literal value to classify via [`TypeTag::infer`]
    Literal(Value),
}

impl TypeSpec {
    /// Normalize to the concrete tag set.
    pub fn tags(&self) -> Vec<TypeTag> {
        match self {
            TypeSpec::Tag(tag) => vec![*tag],
            TypeSpec::Tags(tags) => tags.clone(),
            TypeSpec::Literal(value) => TypeTag::infer(value),
        }
    }
}

impl From<TypeTag> for TypeSpec {
    fn from(tag: TypeTag) -> Self {
        TypeSpec::Tag(tag)
    }
}

impl From<Vec<TypeTag>> for TypeSpec {
    fn from(tags: Vec<TypeTag>) -> Self {
        TypeSpec::Tags(tags)
    }
}

impl From<&str> for TypeSpec {
    fn from(s: &str) -> Self {
        TypeSpec::Literal(Value::from(s))
    }
}

impl From<i64> for TypeSpec {
    fn from(v: i64) -> Self {
        TypeSpec::Literal(Value::Int(v))
    }
}

impl From<i32> for TypeSpec {
    fn from(v: i32) -> Self {
        TypeSpec::Literal(Value::from(v))
    }
}

impl From<f64> for TypeSpec {
    fn from(v: f64) -> Self {
        TypeSpec::Literal(Value::Double(v))
    }
}

impl From<Value> for TypeSpec {
    fn from(v: Value) -> Self {
        TypeSpec::Literal(v)
    }
}

fn date_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\d{1,4}[/-]\d{1,4}[/-]\d{1,4}( \d{2}:\d{2}:\d{2})?$").expect("hardcoded regex")
    })
}

/// Check whether a string looks like a date literal
/// (`D{1,4}[/-]D{1,4}[/-]D{1,4}`, optional ` HH:MM:SS` tail).
pub fn is_date_like(s: &str) -> bool {
    date_pattern().is_match(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_literal_is_ambiguous() {
        assert_eq!(
            TypeTag::infer(&Value::Int(42)),
            vec![TypeTag::Int, TypeTag::Float, TypeTag::Double]
        );
        assert_eq!(
            TypeTag::infer(&Value::Double(1.5)),
            vec![TypeTag::Int, TypeTag::Float, TypeTag::Double]
        );
    }

    #[test]
    fn test_date_like_strings() {
        assert_eq!(
            TypeTag::infer(&Value::from("2012/12/12 12:12:12")),
            vec![TypeTag::Date]
        );
        assert_eq!(TypeTag::infer(&Value::from("12/12/12")), vec![TypeTag::Date]);
        assert_eq!(TypeTag::infer(&Value::from("2012-01-31")), vec![TypeTag::Date]);
    }

    #[test]
    fn test_plain_string() {
        assert_eq!(TypeTag::infer(&Value::from("hello")), vec![TypeTag::String]);
    }

    #[test]
    fn test_tag_spelling_passes_through() {
        assert_eq!(TypeTag::infer(&Value::from("date")), vec![TypeTag::Date]);
        assert_eq!(TypeTag::infer(&Value::from("objectId")), vec![TypeTag::ObjectId]);
    }

    #[test]
    fn test_list_classifies_elementwise_and_flattens() {
        let tags = TypeTag::infer(&Value::from(vec![
            Value::Int(1),
            Value::Text("hello".into()),
        ]));
        assert_eq!(
            tags,
            vec![TypeTag::Int, TypeTag::Float, TypeTag::Double, TypeTag::String]
        );
    }

    #[test]
    fn test_not_date_like() {
        assert!(!is_date_like("12/12"));
        assert!(!is_date_like("hello/world/now"));
        assert!(!is_date_like("2012/12/12 9:9:9"));
    }

    #[test]
    fn test_type_spec_normalization() {
        assert_eq!(TypeSpec::from(TypeTag::Date).tags(), vec![TypeTag::Date]);
        assert_eq!(
            TypeSpec::from(42_i64).tags(),
            vec![TypeTag::Int, TypeTag::Float, TypeTag::Double]
        );
        assert_eq!(TypeSpec::from("string").tags(), vec![TypeTag::String]);
    }
}
