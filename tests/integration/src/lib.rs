//! Integration test library - common utilities

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Test configuration
pub struct TestConfig {
    pub base_url: String,
    pub client: Client,
}

impl TestConfig {
    pub fn new() -> Self {
        let base_url = std::env::var("GATEWAY_TEST_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8080".to_string());

        // Must outlast the server's execution ceiling
        let timeout_secs: u64 = std::env::var("GATEWAY_TEST_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(40);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self { base_url, client }
    }

    pub fn api_url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }
}

impl Default for TestConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Command request body
#[derive(Debug, Serialize)]
pub struct CommandRequest {
    pub command: String,
}

impl CommandRequest {
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
        }
    }
}

/// Success or failure envelope
#[derive(Debug, Deserialize)]
pub struct CommandEnvelope {
    pub success: bool,
    pub code: Option<u32>,
    pub command: Option<String>,
    pub output: Option<String>,
    pub error: Option<String>,
    pub details: Option<String>,
    pub listing: Option<serde_json::Value>,
}

/// Health response
#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub actions: Vec<String>,
}
