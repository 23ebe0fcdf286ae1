//! Error types for the summer school client.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=db, 4=validation, 5=auth, 6=remote, ...)
//! - Retryability flags
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers

use thiserror::Error;

use crate::net::TransportError;
use crate::pipeline::PipelineError;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Database (exit 2)
    DatabaseError,

    // Validation (exit 4)
    InvalidArgument,
    InvalidLoginCode,

    // Authentication (exit 5)
    CodeRejected,
    NotAuthenticated,

    // Remote (exit 6)
    TransportError,
    InvalidPayload,
    SchoolInfoIncomplete,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::DatabaseError => "DATABASE_ERROR",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::InvalidLoginCode => "INVALID_LOGIN_CODE",
            Self::CodeRejected => "CODE_REJECTED",
            Self::NotAuthenticated => "NOT_AUTHENTICATED",
            Self::TransportError => "TRANSPORT_ERROR",
            Self::InvalidPayload => "INVALID_PAYLOAD",
            Self::SchoolInfoIncomplete => "SCHOOL_INFO_INCOMPLETE",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
        }
    }

    /// Category-based exit code (2-8).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::DatabaseError => 2,
            Self::InvalidArgument | Self::InvalidLoginCode => 4,
            Self::CodeRejected | Self::NotAuthenticated => 5,
            Self::TransportError | Self::InvalidPayload | Self::SchoolInfoIncomplete => 6,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether retrying with corrected input (or later) can succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument
                | Self::InvalidLoginCode
                | Self::CodeRejected
                | Self::TransportError
                | Self::DatabaseError
        )
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in client operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid login code: {reason}")]
    InvalidLoginCode { reason: String },

    #[error("Login code rejected by server (HTTP {status})")]
    CodeRejected { status: u16 },

    #[error("Not logged in")]
    NotAuthenticated,

    #[error("Request failed: {0}")]
    Transport(#[from] TransportError),

    #[error("Invalid response: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("School {school_id} has no usable information")]
    SchoolInfoIncomplete { school_id: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::InvalidLoginCode { .. } => ErrorCode::InvalidLoginCode,
            Self::CodeRejected { .. } => ErrorCode::CodeRejected,
            Self::NotAuthenticated => ErrorCode::NotAuthenticated,
            Self::Transport(_) => ErrorCode::TransportError,
            Self::Pipeline(_) => ErrorCode::InvalidPayload,
            Self::SchoolInfoIncomplete { .. } => ErrorCode::SchoolInfoIncomplete,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::InvalidLoginCode { .. } => Some(
                "Login codes are letters and digits only, e.g. `summer login AB12CD34`".to_string(),
            ),

            Self::CodeRejected { .. } => {
                Some("Check the code printed on your welcome letter and try again".to_string())
            }

            Self::NotAuthenticated => {
                Some("Log in first: summer login <code>".to_string())
            }

            Self::Transport(TransportError::Unreachable(_) | TransportError::Timeout) => Some(
                "The server could not be reached. Cached data is still available via `summer list`."
                    .to_string(),
            ),

            Self::InvalidArgument(msg) => {
                if msg.contains("collection") {
                    Some(
                        "Valid collections: announcements, info, events, lecturers, forum"
                            .to_string(),
                    )
                } else {
                    None
                }
            }

            Self::Config(_) => Some(
                "Check --api-url / SUMMER_API_URL and the settings file path".to_string(),
            ),

            Self::Database(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Transport(_)
            | Self::Pipeline(_)
            | Self::SchoolInfoIncomplete { .. } => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    ///
    /// Includes error code, message, retryability, exit code, and
    /// optional recovery hint.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}
