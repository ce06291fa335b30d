//! HTTP API handlers

mod command;
mod health;

use axum::{
    http::{header, HeaderName, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::GET, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-requested-with"),
        ]);

    let command_route = post(command::run_command)
        .options(command::preflight)
        .fallback(command::method_not_allowed);

    let api_routes = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Command gateway
        .route("/docker", command_route.clone());

    Router::new()
        .nest("/api", api_routes)
        // Path the browser front end posts to
        .route("/docker-api", command_route)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
