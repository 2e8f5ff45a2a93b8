//! Error types for the structural object model

use thiserror::Error;

/// Construction, schema and configuration errors.
///
/// Every validation variant names the offending field (or, for
/// [`Error::EmptyElement`], the element type) and describes the violated
/// constraint. `build()` reports exactly one of them: the first check that
/// fails in the type's declared order.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Missing required element: '{field}'")]
    MissingRequiredField { field: String },

    #[error("Invalid type: {found} for choice element: '{field}' must be one of: [{allowed}]")]
    InvalidChoiceType {
        field: String,
        found: String,
        allowed: String,
    },

    #[error("Invalid element in repeating element: '{field}': {reason}")]
    InvalidListElement { field: String, reason: String },

    #[error("Missing required element: '{field}' must contain at least one entry")]
    EmptyRequiredList { field: String },

    #[error("Resource type found in {source_kind}: '{target}' for element: '{field}' must be one of: [{allowed}]")]
    DisallowedReferenceTargetType {
        field: String,
        target: String,
        allowed: String,
        source_kind: ReferenceSource,
    },

    #[error("Element of type '{type_name}' must have an id, an extension or at least one populated element")]
    EmptyElement { type_name: String },

    #[error("Invalid type: {found} for element: '{field}' must be: {expected}")]
    InvalidFieldType {
        field: String,
        found: String,
        expected: String,
    },

    #[error("Element: '{field}' is prohibited")]
    ProhibitedField { field: String },

    #[error("Repeating element: '{field}' has {count} entries, maximum allowed is {max}")]
    TooManyElements { field: String, count: usize, max: u32 },

    #[error("Element: '{field}' does not repeat; use set() instead of add()")]
    NotRepeating { field: String },

    #[error("Unknown element: '{field}' for type '{type_name}'")]
    UnknownField { type_name: String, field: String },

    #[error("Invalid value for element: '{field}': {reason}")]
    InvalidLeafValue { field: String, reason: String },

    #[error("Invalid reference for element: '{field}': {reason}")]
    InvalidReference { field: String, reason: String },

    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(String),
}

/// Where a disallowed reference target type was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceSource {
    /// The inline `Reference.type` hint.
    TypeHint,
    /// The resource type parsed out of the `Reference.reference` locator.
    Literal,
}

impl std::fmt::Display for ReferenceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferenceSource::TypeHint => write!(f, "Reference.type"),
            ReferenceSource::Literal => write!(f, "reference value"),
        }
    }
}

impl Error {
    /// The field (or element type, for `EmptyElement`) a validation error refers to.
    pub fn field(&self) -> Option<&str> {
        match self {
            Error::MissingRequiredField { field }
            | Error::InvalidChoiceType { field, .. }
            | Error::InvalidListElement { field, .. }
            | Error::EmptyRequiredList { field }
            | Error::DisallowedReferenceTargetType { field, .. }
            | Error::InvalidFieldType { field, .. }
            | Error::ProhibitedField { field }
            | Error::TooManyElements { field, .. }
            | Error::NotRepeating { field }
            | Error::UnknownField { field, .. }
            | Error::InvalidLeafValue { field, .. }
            | Error::InvalidReference { field, .. } => Some(field),
            Error::EmptyElement { type_name } => Some(type_name),
            Error::UnknownType(_) | Error::InvalidSchema(_) | Error::Config(_) | Error::Json(_) => {
                None
            }
        }
    }

    /// Whether this error was raised by structural validation in `build()`.
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            Error::UnknownType(_) | Error::InvalidSchema(_) | Error::Config(_) | Error::Json(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
