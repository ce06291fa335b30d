//! Error types for the command gateway

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Code reported when the process ran but exited non-zero
pub const COMMAND_FAILED_CODE: u32 = 2003;

/// Which bound a timed out invocation hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutStage {
    /// No data arrived on stdout or stderr within the read timeout
    Read,
    /// The whole invocation exceeded the execution ceiling
    Execution,
}

impl TimeoutStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeoutStage::Read => "read",
            TimeoutStage::Execution => "execution",
        }
    }
}

impl std::fmt::Display for TimeoutStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Broad failure category of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Rejected,
    Execution,
    Timeout,
}

/// Main error type for the command gateway
#[derive(Debug, Error)]
pub enum Error {
    // Rejected requests (1000-1999)
    #[error("Method not allowed. Use POST to send commands")]
    MethodNotAllowed,

    #[error("No input data received")]
    EmptyBody,

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("No command specified")]
    MissingCommand,

    #[error("Command not allowed: {0}")]
    ActionNotAllowed(String),

    #[error("Invalid container id. Only letters, digits, hyphens and underscores are allowed")]
    InvalidArgument,

    #[error("Command {0} does not take an argument")]
    UnexpectedArgument(String),

    // Execution errors (2000-2999)
    #[error("Failed to start process for {action}: {message}")]
    ExecutionFailed { action: String, message: String },

    #[error("Command {action} timed out ({stage} limit of {limit:?})")]
    Timeout {
        action: String,
        stage: TimeoutStage,
        limit: Duration,
    },
}

impl Error {
    /// Get the error code
    pub fn code(&self) -> u32 {
        match self {
            Error::MethodNotAllowed => 1001,
            Error::EmptyBody => 1002,
            Error::InvalidJson(_) => 1003,
            Error::MissingCommand => 1004,
            Error::ActionNotAllowed(_) => 1005,
            Error::InvalidArgument => 1006,
            Error::UnexpectedArgument(_) => 1007,

            Error::ExecutionFailed { .. } => 2001,
            Error::Timeout { .. } => 2002,
        }
    }

    /// Get the failure category
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ExecutionFailed { .. } => ErrorKind::Execution,
            Error::Timeout { .. } => ErrorKind::Timeout,
            _ => ErrorKind::Rejected,
        }
    }

    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Error::ExecutionFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Action the error belongs to, once the request got past validation
    pub fn action(&self) -> Option<&str> {
        match self {
            Error::ExecutionFailed { action, .. } | Error::Timeout { action, .. } => {
                Some(action)
            }
            _ => None,
        }
    }

    /// Message safe to echo back to the caller.
    ///
    /// Spawn failures carry OS and path details that stay in the server log.
    pub fn public_message(&self) -> String {
        match self {
            Error::ExecutionFailed { .. } => {
                "Could not start the process to run the command".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Failure envelope returned to callers
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub code: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl From<&Error> for ErrorResponse {
    fn from(err: &Error) -> Self {
        Self {
            success: false,
            code: err.code(),
            command: err.action().map(str::to_string),
            error: err.public_message(),
            details: None,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse::from(&self);

        (status, Json(body)).into_response()
    }
}
