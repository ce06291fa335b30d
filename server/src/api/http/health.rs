//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub actions: Vec<String>,
    pub read_timeout_secs: u64,
    pub execution_timeout_secs: u64,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        actions: state
            .gateway
            .table()
            .actions()
            .into_iter()
            .map(str::to_string)
            .collect(),
        read_timeout_secs: state.config.read_timeout,
        execution_timeout_secs: state.config.execution_timeout,
    })
}
