use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;
use tiny_agent_core::tool::{Error as ToolError, Tool, ToolResult};
use tokio::fs;

#[derive(Deserialize, JsonSchema)]
pub struct WriteToolParameters {
    #[schemars(description = "The path of the file to write to")]
    file_path: String,
    #[schemars(description = "The content to write to the file")]
    content: String,
}

/// A tool that creates or overwrites a file.
///
/// On success the written content is echoed back as confirmation.
pub struct WriteTool {
    parameter_schema: Value,
}

impl WriteTool {
    /// Creates a new write tool.
    #[inline]
    pub fn new() -> Self {
        WriteTool {
            parameter_schema: schema_for!(WriteToolParameters).to_value(),
        }
    }
}

impl Default for WriteTool {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for WriteTool {
    type Input = WriteToolParameters;

    fn name(&self) -> &str {
        "Write"
    }

    fn description(&self) -> &str {
        "Write content to a file"
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        input: WriteToolParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        async move {
            let WriteToolParameters { file_path, content } = input;
            match fs::write(&file_path, &content).await {
                Ok(()) => Ok(content),
                Err(err) => Err(ToolError::io()
                    .with_reason(format!("{file_path}: {err}"))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tiny_agent_core::tool::ErrorKind;

    use super::*;
    use crate::tools::ReadTool;

    fn write(path: &str, content: &str) -> WriteToolParameters {
        WriteToolParameters {
            file_path: path.to_owned(),
            content: content.to_owned(),
        }
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.txt");
        let path = path.to_str().unwrap();
        let input = serde_json::json!({ "file_path": path });

        let tool = WriteTool::new();
        let echoed = tool.execute(write(path, "old")).await.unwrap();
        assert_eq!(echoed, "old");
        // Overwrites, never appends.
        let content = "line 1\nline 2 ünïcode\n";
        let echoed = tool.execute(write(path, content)).await.unwrap();
        assert_eq!(echoed, content);

        let read_back = ReadTool::new()
            .execute(serde_json::from_value(input).unwrap())
            .await
            .unwrap();
        assert_eq!(read_back, content);
    }

    #[tokio::test]
    async fn test_write_into_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no/such/dir/file.txt");
        let path = path.to_str().unwrap();

        let err = WriteTool::new().execute(write(path, "x")).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.reason().starts_with(path));
    }
}
