//! Common domain types

use serde::{Deserialize, Serialize};

/// Raw capture of a finished child process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Outcome of one gateway invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationResult {
    pub succeeded: bool,
    pub action: String,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl InvocationResult {
    /// Build from a process capture. Both streams are trimmed.
    pub fn from_output(action: &str, output: ProcessOutput) -> Self {
        Self {
            succeeded: output.exit_code == 0,
            action: action.to_string(),
            stdout: output.stdout.trim().to_string(),
            stderr: output.stderr.trim().to_string(),
            exit_code: output.exit_code,
        }
    }
}
