//! Schema naming conventions.
//!
//! Relationship key names are rarely spelled out: a `categories` collection
//! is joined through a `category_id` foreign key and attached under the
//! singular name `category`. These helpers encode that convention; callers
//! can always override the derived names explicitly.

use regex::Regex;
use std::sync::OnceLock;

fn plural_ies() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"ies\b").expect("hardcoded regex"))
}

fn plural_s() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"s\b").expect("hardcoded regex"))
}

/// Derive the conventional foreign-key name for a schema.
///
/// # Examples
///
/// ```
/// use objmodel_core::naming::schema_to_id;
///
/// assert_eq!(schema_to_id("categories"), "category_id");
/// assert_eq!(schema_to_id("brands"), "brand_id");
/// ```
pub fn schema_to_id(schema: &str) -> String {
    let singular = plural_ies().replace_all(schema, "y_id");
    plural_s().replace_all(&singular, "_id").into_owned()
}

/// Derive the singular "title" form of a schema name.
///
/// # Examples
///
/// ```
/// use objmodel_core::naming::schema_to_title;
///
/// assert_eq!(schema_to_title("categories"), "category");
/// assert_eq!(schema_to_title("brands"), "brand");
/// ```
pub fn schema_to_title(schema: &str) -> String {
    let singular = plural_ies().replace_all(schema, "y");
    plural_s().replace_all(&singular, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_to_id_ies_plural() {
        assert_eq!(schema_to_id("categories"), "category_id");
    }

    #[test]
    fn test_schema_to_id_s_plural() {
        assert_eq!(schema_to_id("brands"), "brand_id");
    }

    #[test]
    fn test_schema_to_id_non_plural_passthrough() {
        // No trailing plural, nothing to rewrite.
        assert_eq!(schema_to_id("data"), "data");
    }

    #[test]
    fn test_schema_to_title() {
        assert_eq!(schema_to_title("categories"), "category");
        assert_eq!(schema_to_title("brands"), "brand");
    }

    #[test]
    fn test_word_boundary_only_hits_trailing_plural() {
        // An interior 's' is not a plural suffix.
        assert_eq!(schema_to_id("users"), "user_id");
        assert_eq!(schema_to_title("users"), "user");
    }
}
