//! Error types for aggregate assembly
//!
//! - [`DecodingError`]: a stored value cannot be converted; fatal to the request
//! - [`FetchError`]: raised by the row fetch layer, passed through unchanged
//! - [`AssemblyError`]: what `get_aggregates` returns to its caller

use crate::mapper::EntityKind;
use std::time::Duration;
use thiserror::Error;

/// Why a single column could not be decoded
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeFault {
    #[error("column is missing from the row")]
    MissingColumn,

    #[error("required value is null")]
    NullValue,

    #[error("expected {expected}, found {found}")]
    IncompatibleType {
        expected: &'static str,
        found: &'static str,
    },

    #[error("unparseable timestamp '{0}'")]
    InvalidTimestamp(String),

    #[error("unrecognized value '{0}'")]
    UnknownValue(String),

    #[error("malformed geometry: {0}")]
    InvalidGeometry(String),

    #[error("invalid relationship item: {0}")]
    InvalidRelationshipItem(String),
}

/// A row value that cannot be converted to its target type
///
/// Identifies the entity kind, the row position within its result set, the
/// parent key (once decoded) and the column.
#[derive(Debug, Clone, PartialEq, Error)]
#[error(
    "failed to decode {kind} row {row}{} column '{column}': {fault}",
    .key.as_ref().map(|k| format!(" (key {})", k)).unwrap_or_default()
)]
pub struct DecodingError {
    pub kind: EntityKind,
    pub row: usize,
    pub key: Option<String>,
    pub column: String,
    pub fault: DecodeFault,
}

impl DecodingError {
    /// Attach the parent key the failing row was grouped under
    pub fn with_key(mut self, key: &str) -> Self {
        self.key = Some(key.to_string());
        self
    }
}

/// Failure reported by a [`RowFetcher`](crate::fetch::RowFetcher)
#[derive(Debug, Error)]
pub enum FetchError {
    /// The actor may not see the requested data (raised upstream)
    #[error("Access scope violation: {0}")]
    ScopeViolation(String),

    #[error("No fetch query configured for {0}")]
    MissingQuery(EntityKind),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Fetch timed out after {0:?}")]
    Timeout(Duration),

    #[error("Fetch failed: {0}")]
    Other(String),
}

/// Error returned by aggregate assembly
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error(transparent)]
    Decoding(#[from] DecodingError),

    #[error("{kind} fetch failed: {source}")]
    Fetch {
        kind: EntityKind,
        #[source]
        source: FetchError,
    },
}

impl AssemblyError {
    pub fn is_scope_violation(&self) -> bool {
        matches!(
            self,
            AssemblyError::Fetch {
                source: FetchError::ScopeViolation(_),
                ..
            }
        )
    }

    /// HTTP status the web layer reports for this error
    ///
    /// Scope violations are the caller's problem (403); stored data that
    /// cannot be decoded is ours (500); timeouts map to 504.
    pub fn status_code(&self) -> u16 {
        match self {
            AssemblyError::Decoding(_) => 500,
            AssemblyError::Fetch { source, .. } => match source {
                FetchError::ScopeViolation(_) => 403,
                FetchError::Timeout(_) => 504,
                _ => 500,
            },
        }
    }
}

/// Result type for assembly operations
pub type AssemblyResult<T> = Result<T, AssemblyError>;
