use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;
use tiny_agent_core::tool::{Error as ToolError, Tool, ToolResult};
use tokio::fs;

#[derive(Deserialize, JsonSchema)]
pub struct ReadToolParameters {
    #[schemars(description = "The path to the file to read")]
    file_path: String,
}

/// A tool that returns the full text of a file.
pub struct ReadTool {
    parameter_schema: Value,
}

impl ReadTool {
    /// Creates a new read tool.
    #[inline]
    pub fn new() -> Self {
        ReadTool {
            parameter_schema: schema_for!(ReadToolParameters).to_value(),
        }
    }
}

impl Default for ReadTool {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for ReadTool {
    type Input = ReadToolParameters;

    fn name(&self) -> &str {
        "Read"
    }

    fn description(&self) -> &str {
        "Read and return the contents of a file"
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        input: ReadToolParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        async move {
            fs::read_to_string(&input.file_path).await.map_err(|err| {
                ToolError::io().with_reason(format!("{}: {err}", input.file_path))
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tiny_agent_core::tool::ErrorKind;

    use super::*;

    fn read(path: &str) -> ReadToolParameters {
        ReadToolParameters {
            file_path: path.to_owned(),
        }
    }

    #[tokio::test]
    async fn test_read_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "first\n\nthird\n").unwrap();
        let path = path.to_str().unwrap();

        let tool = ReadTool::new();
        let first = tool.execute(read(path)).await.unwrap();
        let second = tool.execute(read(path)).await.unwrap();

        assert_eq!(first, "first\n\nthird\n");
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.txt");
        let path = path.to_str().unwrap();

        let err = ReadTool::new().execute(read(path)).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.reason().starts_with(path));
    }
}
