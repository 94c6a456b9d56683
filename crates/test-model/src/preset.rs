use serde::{Deserialize, Serialize};
use tiny_agent_model::ToolCallRequest;

/// The preset response for an assistant step.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresetResponse {
    /// The text content of the assistant turn.
    #[serde(default)]
    pub content: Option<String>,
    /// Tool calls requested in the assistant turn.
    #[serde(default)]
    pub tool_calls: Vec<ToolCallRequest>,
    /// If `true`, the response carries no choice at all.
    #[serde(default)]
    pub no_choices: bool,
    /// If set, the request will fail in the first `failures` attempts.
    /// `Some(0)` means the request will fail infinitely.
    #[serde(default)]
    pub failures: Option<u64>,
}

impl PresetResponse {
    /// Creates a `PresetResponse` with a plain message.
    #[inline]
    pub fn with_message<S: Into<String>>(content: S) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    /// Creates a `PresetResponse` that requests the given tools.
    #[inline]
    pub fn with_tool_calls(
        tool_calls: impl Into<Vec<ToolCallRequest>>,
    ) -> Self {
        Self {
            tool_calls: tool_calls.into(),
            ..Default::default()
        }
    }

    /// Creates a choice with neither text nor tool calls.
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a response without any choice.
    #[inline]
    pub fn no_choices() -> Self {
        Self {
            no_choices: true,
            ..Default::default()
        }
    }

    /// Sets failure times before a successful response. `0` means the
    /// response will always be a failure.
    #[inline]
    pub fn with_failures(mut self, failures: u64) -> Self {
        self.failures = Some(failures);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_json() {
        let preset: PresetResponse = serde_json::from_str(
            r#"{
                "tool_calls": [
                    {
                        "id": "call_1",
                        "name": "Write",
                        "arguments": "{\"file_path\":\"message.txt\",\"content\":\"Hello\"}"
                    }
                ],
                "failures": 2
            }"#,
        )
        .unwrap();

        assert_eq!(preset.content, None);
        assert!(!preset.no_choices);
        assert_eq!(preset.failures, Some(2));
        assert_eq!(preset.tool_calls[0].name, "Write");
        assert_eq!(
            preset,
            PresetResponse::with_tool_calls([ToolCallRequest::new(
                "call_1",
                "Write",
                r#"{"file_path":"message.txt","content":"Hello"}"#,
            )])
            .with_failures(2)
        );
    }
}
