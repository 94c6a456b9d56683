use serde::{Deserialize, Serialize};

use crate::OpaqueMessage;

/// A complete response from the model provider.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ModelResponse {
    /// Candidate completions. The agent only looks at the first one, and a
    /// response without any choice violates the provider contract.
    pub choices: Vec<ModelChoice>,
}

/// One candidate assistant turn.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ModelChoice {
    /// The text content of the turn, if any.
    pub content: Option<String>,
    /// Tool calls requested by the model, in the order it listed them.
    pub tool_calls: Vec<ToolCallRequest>,
    /// Why the model stopped generating.
    pub finish_reason: Option<ModelFinishReason>,
    /// The provider's verbatim form of this turn.
    pub opaque: Option<OpaqueMessage>,
}

impl ModelChoice {
    /// Creates a text-only choice.
    #[inline]
    pub fn with_content<S: Into<String>>(content: S) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: vec![],
            finish_reason: Some(ModelFinishReason::Stop),
            opaque: None,
        }
    }

    /// Creates a choice that only requests tools.
    #[inline]
    pub fn with_tool_calls(tool_calls: impl Into<Vec<ToolCallRequest>>) -> Self {
        Self {
            content: None,
            tool_calls: tool_calls.into(),
            finish_reason: Some(ModelFinishReason::ToolCalls),
            opaque: None,
        }
    }
}

/// The reason why a model response has finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelFinishReason {
    /// The model needs to call a tool.
    ToolCalls,
    /// The model has finished generating text.
    Stop,
    /// The output was cut by a token limit.
    Length,
    /// Any reason the provider reports that has no dedicated variant.
    Other,
}

/// Describes a tool call request from the model.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// The unique identifier for the tool call request.
    pub id: String,
    /// The name of the tool to call.
    pub name: String,
    /// The arguments in their serialized form, normally a JSON object.
    pub arguments: String,
}

impl ToolCallRequest {
    /// Creates a tool call request.
    #[inline]
    pub fn new<ID, N, A>(id: ID, name: N, arguments: A) -> Self
    where
        ID: Into<String>,
        N: Into<String>,
        A: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}
