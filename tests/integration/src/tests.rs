//! Integration tests for the Command Gateway
//!
//! These tests require a running server with access to a container runtime.
//! Run with: GATEWAY_TEST_URL=http://127.0.0.1:8080 cargo test -- --ignored

use integration_tests::*;
use reqwest::{Method, StatusCode};

async fn post_command(config: &TestConfig, command: &str) -> (StatusCode, CommandEnvelope) {
    let response = config
        .client
        .post(config.api_url("/docker"))
        .json(&CommandRequest::new(command))
        .send()
        .await
        .expect("Failed to send command request");

    let status = response.status();
    let envelope: CommandEnvelope = response
        .json()
        .await
        .expect("Failed to parse command response");
    (status, envelope)
}

// ============================================================================
// Health Tests
// ============================================================================

#[tokio::test]
#[ignore = "requires a running gateway"]
async fn test_health_check() {
    let config = TestConfig::new();

    let response = config
        .client
        .get(config.api_url("/health"))
        .send()
        .await
        .expect("Failed to send health request");

    assert!(
        response.status().is_success(),
        "Health check failed with status: {}",
        response.status()
    );

    let health: HealthResponse = response.json().await.expect("Failed to parse health response");
    assert_eq!(health.status, "healthy");
    assert_eq!(health.actions, vec!["ps", "images", "restart"]);
}

// ============================================================================
// Command Tests
// ============================================================================

#[tokio::test]
#[ignore = "requires a running gateway"]
async fn test_ps() {
    let config = TestConfig::new();

    let (status, envelope) = post_command(&config, "ps").await;
    assert_eq!(status, StatusCode::OK, "ps failed: {:?}", envelope);
    assert!(envelope.success);
    assert_eq!(envelope.command.as_deref(), Some("ps"));
    assert!(envelope.listing.is_some());
}

#[tokio::test]
#[ignore = "requires a running gateway"]
async fn test_images_is_stable() {
    let config = TestConfig::new();

    let (_, first) = post_command(&config, "images").await;
    let (_, second) = post_command(&config, "images").await;
    assert!(first.success);
    assert_eq!(first.output, second.output);
}

#[tokio::test]
#[ignore = "requires a running gateway"]
async fn test_restart_unknown_container() {
    let config = TestConfig::new();

    let (status, envelope) = post_command(&config, "restart no-such-container-0000").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!envelope.success);
    assert_eq!(envelope.command.as_deref(), Some("restart"));
    assert!(envelope.details.is_some());
}

#[tokio::test]
#[ignore = "requires a running gateway"]
async fn test_injection_rejected() {
    let config = TestConfig::new();

    for command in ["restart abc;rm -rf /", "restart $(id)", "restart a|b", "rm -rf /"] {
        let (status, envelope) = post_command(&config, command).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{command} was not rejected");
        assert!(!envelope.success);
        assert!(envelope.command.is_none());
        assert!(envelope.error.is_some());
    }
}

#[tokio::test]
#[ignore = "requires a running gateway"]
async fn test_preflight() {
    let config = TestConfig::new();

    let response = config
        .client
        .request(Method::OPTIONS, config.api_url("/docker"))
        .send()
        .await
        .expect("Failed to send preflight");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
    assert!(response.text().await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires a running gateway"]
async fn test_get_not_allowed() {
    let config = TestConfig::new();

    let response = config
        .client
        .get(config.api_url("/docker"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let envelope: CommandEnvelope = response.json().await.unwrap();
    assert!(!envelope.success);
    assert_eq!(envelope.code, Some(1001));
}
