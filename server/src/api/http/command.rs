//! Command gateway HTTP handlers

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::listing::{Listing, ListingKind};
use crate::domain::types::InvocationResult;
use crate::error::{ErrorKind, ErrorResponse, COMMAND_FAILED_CODE};
use crate::{AppState, Error, Result};

/// Run command request
#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    #[serde(default)]
    pub command: Option<String>,
}

/// Successful command response
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub success: bool,
    pub command: String,
    pub output: String,
    /// Parsed table for `ps` and `images`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing: Option<Listing>,
}

/// Run an allow-listed command
pub async fn run_command(State(state): State<AppState>, body: Bytes) -> Result<Response> {
    let raw = parse_body(&body).inspect_err(log_rejection)?;
    let result = state
        .gateway
        .execute(&raw)
        .await
        .inspect_err(log_rejection)?;

    Ok(result_response(result))
}

/// CORS preflight, answered the same way whatever the request carries
pub async fn preflight() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "POST, GET, OPTIONS"),
            (
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                "Content-Type, X-Requested-With",
            ),
        ],
    )
}

pub async fn method_not_allowed() -> Error {
    let err = Error::MethodNotAllowed;
    log_rejection(&err);
    err
}

fn parse_body(body: &[u8]) -> Result<String> {
    if body.is_empty() {
        return Err(Error::EmptyBody);
    }

    let req: CommandRequest =
        serde_json::from_slice(body).map_err(|e| Error::InvalidJson(e.to_string()))?;

    match req.command {
        Some(command) if !command.trim().is_empty() => Ok(command),
        _ => Err(Error::MissingCommand),
    }
}

/// Execution failures and timeouts are already logged by the gateway
fn log_rejection(err: &Error) {
    if err.kind() == ErrorKind::Rejected {
        warn!("Rejected request: {}", err);
    }
}

fn result_response(result: InvocationResult) -> Response {
    if result.succeeded {
        let listing = ListingKind::for_action(&result.action)
            .map(|kind| Listing::parse(kind, &result.stdout));

        return Json(CommandResponse {
            success: true,
            command: result.action,
            output: result.stdout,
            listing,
        })
        .into_response();
    }

    let body = ErrorResponse {
        success: false,
        code: COMMAND_FAILED_CODE,
        command: Some(result.action),
        error: "Error executing the command".to_string(),
        details: Some(result.stderr),
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
