//! Cosmic API error types

use thiserror::Error;

/// Server error code for an invalid parameter value.
///
/// Returned instead of an empty list when an `id` filter names an entity
/// that does not exist (or is not a well-formed identifier).
pub const INVALID_PARAMETER_ERROR: i64 = 431;

/// Cosmic API errors
#[derive(Error, Debug)]
pub enum CosmicError {
    #[error("Transport error{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Transport {
        /// HTTP status, when a response was received
        status: Option<u16>,
        /// Structured `errorcode` from the error body
        error_code: Option<i64>,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Timeout waiting for async job {job_id}; the job may still complete on the server")]
    AsyncTimeout { job_id: String },

    #[error("Async job {job_id} failed: {message}")]
    JobFailed { job_id: String, message: String },

    #[error("No match found for {id}")]
    NotFound { id: String },

    #[error("There is more than one result ({count}) for id {id}")]
    AmbiguousMatch { id: String, count: usize },

    #[error("Inconsistent pagination: {0}")]
    InconsistentPagination(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Coarse error taxonomy callers branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Decode,
    AsyncTimeout,
    JobFailed,
    NotFound,
    AmbiguousMatch,
    InvalidCommand,
    InvalidConfig,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Transport => write!(f, "transport"),
            ErrorKind::Decode => write!(f, "decode"),
            ErrorKind::AsyncTimeout => write!(f, "async-timeout"),
            ErrorKind::JobFailed => write!(f, "job-failed"),
            ErrorKind::NotFound => write!(f, "not-found"),
            ErrorKind::AmbiguousMatch => write!(f, "ambiguous-match"),
            ErrorKind::InvalidCommand => write!(f, "invalid-command"),
            ErrorKind::InvalidConfig => write!(f, "invalid-config"),
        }
    }
}

impl CosmicError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CosmicError::Transport { .. } | CosmicError::Http(_) => ErrorKind::Transport,
            CosmicError::Decode(_)
            | CosmicError::Json(_)
            | CosmicError::InconsistentPagination(_) => ErrorKind::Decode,
            CosmicError::AsyncTimeout { .. } => ErrorKind::AsyncTimeout,
            CosmicError::JobFailed { .. } => ErrorKind::JobFailed,
            CosmicError::NotFound { .. } => ErrorKind::NotFound,
            CosmicError::AmbiguousMatch { .. } => ErrorKind::AmbiguousMatch,
            CosmicError::InvalidCommand(_) => ErrorKind::InvalidCommand,
            CosmicError::InvalidConfig(_) => ErrorKind::InvalidConfig,
        }
    }

    /// The entity is gone (or never existed) on the remote side
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// We stopped watching a job that was still running
    pub fn is_timeout(&self) -> bool {
        self.kind() == ErrorKind::AsyncTimeout
    }

    pub(crate) fn decode(message: impl Into<String>) -> Self {
        CosmicError::Decode(message.into())
    }
}

pub type Result<T> = std::result::Result<T, CosmicError>;
