use thiserror::Error;

use super::types::CollectorCategory;

/// Misuse of the collector update path. These indicate a caller bug
/// (wrong id, or mutating something that has no input).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CollectorError {
    /// No collector with the given id exists on the current node
    #[error("Collector not found: {0}")]
    NotFound(String),

    /// Action and read-only collectors have no working value
    #[error("Collector is read-only: {0}")]
    ReadOnly(String),

    /// The value's shape does not fit the collector category
    #[error("Invalid value for {category:?} {id}: {reason}")]
    InvalidShape {
        id: String,
        category: CollectorCategory,
        reason: String,
    },

    /// No value was supplied at all
    #[error("Value for collector {0} cannot be undefined")]
    UndefinedValue(String),

    /// Validation was requested on a collector without rules
    #[error("Collector has no validation rules: {0}")]
    NotValidated(String),
}
