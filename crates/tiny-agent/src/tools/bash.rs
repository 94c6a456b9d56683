use std::process::Stdio;
use std::time::Duration;

use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;
use tiny_agent_core::tool::{Error as ToolError, Tool, ToolResult};
use tokio::process::Command;
use tokio::time::timeout;

#[derive(Deserialize, JsonSchema)]
pub struct BashToolParameters {
    #[schemars(description = "The command to execute")]
    command: String,
}

/// A tool for running shell commands.
///
/// Commands run with `sh -c` in the current working directory, without any
/// sandboxing. Standard output is returned when the command exits with
/// status 0, standard error otherwise.
pub struct BashTool {
    parameter_schema: Value,
    timeout: Option<Duration>,
}

impl BashTool {
    /// Creates a new bash tool without a timeout.
    #[inline]
    pub fn new() -> Self {
        BashTool {
            parameter_schema: schema_for!(BashToolParameters).to_value(),
            timeout: None,
        }
    }

    /// Kills commands running longer than `timeout`.
    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for BashTool {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for BashTool {
    type Input = BashToolParameters;

    fn name(&self) -> &str {
        "Bash"
    }

    fn description(&self) -> &str {
        "Execute a shell command"
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        input: BashToolParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let limit = self.timeout;
        async move { run_command(&input.command, limit).await }
    }
}

async fn run_command(command: &str, limit: Option<Duration>) -> ToolResult {
    let child = Command::new("sh")
        .arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    let output = match limit {
        // The child is killed when the timed out future is dropped.
        Some(limit) => match timeout(limit, child.wait_with_output()).await {
            Ok(output) => output?,
            Err(_) => {
                warn!("command timed out after {limit:?}: {command}");
                return Err(ToolError::execution_error().with_reason(format!(
                    "command timed out after {} seconds and was killed",
                    limit.as_secs_f64()
                )));
            }
        },
        None => child.wait_with_output().await?,
    };

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        debug!("command exited with {}: {command}", output.status);
        Ok(String::from_utf8_lossy(&output.stderr).into_owned())
    }
}
