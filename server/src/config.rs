//! Server configuration

use std::time::Duration;

use serde::Deserialize;

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// HTTP server host
    #[serde(default = "default_http_host")]
    pub http_host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Invocation prefix for the container runtime CLI, split on whitespace
    /// (e.g. "sudo docker", "podman")
    #[serde(default = "default_runtime_command")]
    pub runtime_command: String,

    /// Inactivity bound for reading stdout/stderr, in seconds
    #[serde(default = "default_read_timeout")]
    pub read_timeout: u64,

    /// Ceiling for a whole invocation, in seconds
    #[serde(default = "default_execution_timeout")]
    pub execution_timeout: u64,

    /// Append-only diagnostic log file. Empty disables the file sink.
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

fn default_http_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_runtime_command() -> String {
    "sudo docker".to_string()
}

fn default_read_timeout() -> u64 {
    20
}

fn default_execution_timeout() -> u64 {
    30
}

fn default_log_file() -> String {
    "docker-api-errors.log".to_string()
}

impl Config {
    /// Load configuration from environment variables
    pub fn load() -> anyhow::Result<Self> {
        Ok(Self::from_lookup(|key| std::env::var(key).ok()))
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(val) = lookup("GATEWAY_HTTP_HOST") {
            config.http_host = val;
        }
        if let Some(val) = lookup("GATEWAY_HTTP_PORT") {
            if let Ok(port) = val.parse() {
                config.http_port = port;
            }
        }
        if let Some(val) = lookup("GATEWAY_RUNTIME_COMMAND") {
            if !val.trim().is_empty() {
                config.runtime_command = val;
            }
        }
        if let Some(val) = lookup("GATEWAY_READ_TIMEOUT") {
            if let Ok(secs) = val.parse() {
                config.read_timeout = secs;
            }
        }
        if let Some(val) = lookup("GATEWAY_EXECUTION_TIMEOUT") {
            if let Ok(secs) = val.parse() {
                config.execution_timeout = secs;
            }
        }
        if let Some(val) = lookup("GATEWAY_LOG_FILE") {
            config.log_file = val;
        }

        config
    }

    /// Runtime invocation prefix as an argument vector
    pub fn runtime_argv(&self) -> Vec<String> {
        self.runtime_command
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout)
    }

    pub fn execution_timeout(&self) -> Duration {
        Duration::from_secs(self.execution_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_host: default_http_host(),
            http_port: default_http_port(),
            runtime_command: default_runtime_command(),
            read_timeout: default_read_timeout(),
            execution_timeout: default_execution_timeout(),
            log_file: default_log_file(),
        }
    }
}
