use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// A single rejected input field, reported back to the caller verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Name of the offending query/body/path parameter
    pub field: String,
    /// Human-readable reason
    pub message: String,
}

impl FieldError {
    /// Builds a field error from anything string-like.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every failure the admin backend can report.
#[derive(Debug, Error)]
pub enum Error {
    /// Settings could not be loaded or are inconsistent
    #[error("Configuration error: {message}")]
    Config {
        /// What is wrong
        message: String,
    },

    /// Query or connection failure from `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// File or socket failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// One or more request fields were rejected
    #[error("Invalid input data")]
    Validation {
        /// Every rejected field, in the order it was checked
        errors: Vec<FieldError>,
    },

    /// No record with the given id
    #[error("{entity} '{id}' not found")]
    NotFound {
        /// Kind of record, e.g. `"Transaction"`
        entity: &'static str,
        /// Id that was looked up
        id: String,
    },

    /// A unique value is already taken
    #[error("{entity} already exists: {key}")]
    AlreadyExists {
        /// Kind of record
        entity: &'static str,
        /// The duplicated value
        key: String,
    },

    /// The transaction lifecycle forbids this status change
    #[error("Cannot move transaction from {from} to {to}")]
    InvalidTransition {
        /// Current status
        from: String,
        /// Requested status
        to: String,
    },

    /// The record is not in a state that allows the operation
    #[error("{message}")]
    InvalidState {
        /// What the record is missing
        message: String,
    },

    /// The code is wrong, expired, used, or out of attempts
    #[error("Invalid or expired verification code")]
    InvalidVerificationCode,

    /// The mail API refused or could not be reached
    #[error("Failed to send email: {message}")]
    Mail {
        /// Reason reported by the mailer
        message: String,
    },

    /// Outbound HTTP failure
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// A stored row holds a value the domain model cannot represent
    #[error("Corrupt record: {message}")]
    CorruptRecord {
        /// Which column and value
        message: String,
    },
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Shorthand for a validation failure on one field.
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            errors: vec![FieldError::new(field, message)],
        }
    }

    const fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::InvalidVerificationCode => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::AlreadyExists { .. }
            | Self::InvalidTransition { .. }
            | Self::InvalidState { .. } => StatusCode::CONFLICT,
            Self::Mail { .. }
            | Self::Http(_)
            | Self::Config { .. }
            | Self::Database(_)
            | Self::Io(_)
            | Self::CorruptRecord { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error half of the `{response, error}` envelope.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Display text of the [`Error`]
    pub message: String,
    /// Machine-readable class, e.g. `VALIDATION_ERROR`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    /// Rejected fields for validation errors
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<FieldError>,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    response: Option<()>,
    error: ErrorBody,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        let message = self.to_string();
        let (code, details) = match self {
            Self::Validation { errors } => (Some("VALIDATION_ERROR"), errors),
            Self::NotFound { .. } => (Some("NOT_FOUND"), Vec::new()),
            Self::AlreadyExists { .. }
            | Self::InvalidTransition { .. }
            | Self::InvalidState { .. } => (Some("CONFLICT"), Vec::new()),
            _ => (None, Vec::new()),
        };

        let body = ErrorEnvelope {
            response: None,
            error: ErrorBody {
                message,
                code,
                details,
            },
        };
        (status, Json(body)).into_response()
    }
}
