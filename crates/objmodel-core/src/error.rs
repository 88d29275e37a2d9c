//! Error types for ObjModel operations.

use std::fmt;

/// The primary error type for all ObjModel operations.
#[derive(Debug)]
pub enum Error {
    /// A terminal lookup (`find_or_fail`, `first_or_fail`) matched no record
    NotFound,
    /// Query construction or evaluation errors
    Query(QueryError),
    /// Storage collaborator errors
    Store(StoreError),
    /// Configuration errors
    Config(ConfigError),
    /// Custom error with message
    Custom(String),
}

/// Error raised while evaluating a rendered predicate.
///
/// The builder never validates predicates at build time; malformed chains
/// (unbalanced groups, bad raw fragments) surface here, from the filter
/// evaluator, when the rendered string is consumed.
#[derive(Debug)]
pub struct QueryError {
    pub kind: QueryErrorKind,
    /// The predicate string that was being evaluated, if available
    pub predicate: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorKind {
    /// Predicate failed to parse
    Syntax,
    /// Predicate referenced an operator or construct the evaluator does not know
    Unsupported,
}

/// Error raised by the storage collaborator.
#[derive(Debug)]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// Named collection does not exist in the store
    UnknownSchema,
    /// Insert with `UpdateMode::Never` hit an existing primary key
    DuplicateKey,
}

/// Configuration error (store acquisition, default-handle setup).
#[derive(Debug)]
pub struct ConfigError {
    pub message: String,
}

impl Error {
    /// Build a predicate syntax error.
    pub fn syntax(predicate: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Query(QueryError {
            kind: QueryErrorKind::Syntax,
            predicate: Some(predicate.into()),
            message: message.into(),
        })
    }

    /// Build an unsupported-construct query error.
    pub fn unsupported(predicate: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Query(QueryError {
            kind: QueryErrorKind::Unsupported,
            predicate: Some(predicate.into()),
            message: message.into(),
        })
    }

    /// Build an unknown-schema store error.
    pub fn unknown_schema(schema: &str) -> Self {
        Error::Store(StoreError {
            kind: StoreErrorKind::UnknownSchema,
            message: format!("unknown schema '{schema}'"),
        })
    }

    /// Build a duplicate-key store error.
    pub fn duplicate_key(schema: &str, key: impl fmt::Display) -> Self {
        Error::Store(StoreError {
            kind: StoreErrorKind::DuplicateKey,
            message: format!("duplicate primary key {key} in schema '{schema}'"),
        })
    }

    /// Build a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(ConfigError {
            message: message.into(),
        })
    }

    /// Build a custom error.
    pub fn custom(message: impl Into<String>) -> Self {
        Error::Custom(message.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotFound => write!(f, "object not found"),
            Error::Query(e) => {
                if let Some(predicate) = &e.predicate {
                    write!(f, "Query error in '{}': {}", predicate, e.message)
                } else {
                    write!(f, "Query error: {}", e.message)
                }
            }
            Error::Store(e) => write!(f, "Store error: {}", e.message),
            Error::Config(e) => write!(f, "Configuration error: {}", e.message),
            Error::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        Error::Query(err)
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        Error::Store(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

/// Convenient Result type alias for ObjModel operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        assert_eq!(Error::NotFound.to_string(), "object not found");
    }

    #[test]
    fn test_syntax_error_carries_predicate() {
        let err = Error::syntax("id == ", "unexpected end of input");
        match &err {
            Error::Query(q) => {
                assert_eq!(q.kind, QueryErrorKind::Syntax);
                assert_eq!(q.predicate.as_deref(), Some("id == "));
            }
            other => panic!("expected query error, got {other:?}"),
        }
        assert!(err.to_string().contains("id == "));
    }

    #[test]
    fn test_unknown_schema_display() {
        let err = Error::unknown_schema("ghosts");
        assert!(err.to_string().contains("ghosts"));
    }
}
