//! Command gateway service

use std::sync::Arc;

use tracing::{error, info};
use uuid::Uuid;

use crate::domain::command::{CommandTable, InvocationRequest};
use crate::domain::types::InvocationResult;
use crate::error::Result;
use crate::infra::process::{Limits, ProcessRunner};

/// Validates requests against the allow-list and runs them
pub struct CommandGateway {
    table: CommandTable,
    runner: Arc<dyn ProcessRunner>,
    limits: Limits,
}

impl CommandGateway {
    /// Create a new gateway
    pub fn new(table: CommandTable, runner: Arc<dyn ProcessRunner>, limits: Limits) -> Self {
        Self {
            table,
            runner,
            limits,
        }
    }

    pub fn table(&self) -> &CommandTable {
        &self.table
    }

    /// Parse a raw `"<action> [argument]"` string and handle it
    pub async fn execute(&self, raw_command: &str) -> Result<InvocationResult> {
        let request = InvocationRequest::parse(raw_command)?;
        self.handle(request).await
    }

    /// Run one request.
    ///
    /// Rejected requests never reach the runner. A non-zero exit code comes
    /// back as an unsuccessful result, not as an error.
    pub async fn handle(&self, request: InvocationRequest) -> Result<InvocationResult> {
        let invocation = self.table.resolve(&request)?;
        let request_id = Uuid::new_v4();

        info!(
            "[{}] Executing command {}: {}",
            request_id,
            invocation.action,
            invocation.display()
        );

        let output = match self.runner.run(&invocation, &self.limits).await {
            Ok(output) => output,
            Err(e) => {
                error!("[{}] {}", request_id, e);
                return Err(e);
            }
        };

        let result = InvocationResult::from_output(&invocation.action, output);
        if !result.succeeded {
            error!(
                "[{}] Command {} failed ({}): {}",
                request_id, result.action, result.exit_code, result.stderr
            );
        }

        Ok(result)
    }
}
