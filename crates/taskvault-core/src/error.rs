//! Error taxonomy for the task store.
//!
//! Three distinct failure classes, so the boundary layer can map each to the
//! right external response without string-matching:
//!
//! - [`ValidationError`]: malformed input, rejected before any backend call.
//! - [`BackendError`]: the key-value backend is unreachable or an operation
//!   against it failed.
//! - [`CodecError`]: a stored record holds a field the codec cannot decode.
//!
//! "Not found" is never an error here. Lookups return `Option`, mutations
//! return `bool`.

use thiserror::Error;

/// Malformed input detected before any backend mutation is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// User id is empty or only whitespace.
    #[error("user id cannot be empty")]
    EmptyUserId,

    /// User id exceeds the maximum allowed length.
    #[error("user id too long: {length} characters (max {max})")]
    UserIdTooLong { length: usize, max: usize },

    /// User id contains whitespace or control characters.
    #[error("user id contains invalid characters: '{input}'")]
    InvalidUserIdChars { input: String },

    /// Description is empty or only whitespace.
    #[error("description cannot be empty")]
    EmptyDescription,

    /// Description exceeds the maximum allowed length.
    #[error("description too long: {length} characters (max {max})")]
    DescriptionTooLong { length: usize, max: usize },

    /// Status token is not one of the known status values.
    #[error("unknown status '{input}' (expected 'pending' or 'completed')")]
    InvalidStatus { input: String },

    /// Task id is not a well-formed identifier.
    #[error("invalid task id '{input}'")]
    InvalidTaskId { input: String },

    /// Due-time text could not be resolved to an epoch timestamp.
    #[error("could not resolve due time from '{input}'")]
    UnresolvableDueTime { input: String },
}

/// Failure talking to the key-value backend.
///
/// The core never retries these; they surface immediately as a failed
/// operation.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// Could not establish or keep a connection to the backend.
    #[error("backend connection failed: {reason}")]
    Connection { reason: String },

    /// A single backend operation failed.
    #[error("backend {op} failed for key '{key}': {reason}")]
    Operation {
        op: &'static str,
        key: String,
        reason: String,
    },
}

/// A stored record holds a field value the codec cannot decode.
///
/// Distinct from [`BackendError`] because the backend round-trip succeeded;
/// the data itself is corrupt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// A required record field is absent.
    #[error("record '{key}' is missing field '{field}'")]
    MissingField { key: String, field: &'static str },

    /// A record field holds a value that does not parse.
    #[error("record '{key}' field '{field}' holds invalid value '{value}'")]
    InvalidField {
        key: String,
        field: &'static str,
        value: String,
    },
}

/// Umbrella error for task store operations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Result type alias for task store operations.
pub type StoreResult<T> = Result<T, StoreError>;
