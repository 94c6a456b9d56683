use serde_json::Value;

use crate::{OpaqueMessage, ToolCallRequest};

/// A request to be sent to the model provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModelRequest {
    /// The input messages, oldest first.
    pub messages: Vec<ModelMessage>,
    /// Tools that are available to the model.
    pub tools: Vec<ModelTool>,
}

/// A complete message.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ModelMessage {
    /// The system instructions.
    System(String),
    /// A user input text.
    User(String),
    /// An assistant turn rebuilt from parsed fields.
    Assistant(AssistantMessage),
    /// A tool call result.
    Tool(ToolCallResult),
    /// An assistant turn exactly as the provider produced it.
    Opaque(OpaqueMessage),
}

/// An assistant turn in its parsed form.
///
/// Providers should prefer replaying their own [`OpaqueMessage`] when one
/// is available.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct AssistantMessage {
    /// The text content, absent for turns that only request tools.
    pub content: Option<String>,
    /// Tool calls requested in this turn.
    pub tool_calls: Vec<ToolCallRequest>,
}

/// The result of calling a tool.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ToolCallResult {
    /// The id of the tool call request this result answers.
    pub id: String,
    /// The textual output of the tool, or its failure description.
    pub content: String,
}

/// Describes a tool that can be used by the model.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModelTool {
    /// Name of the tool.
    pub name: String,
    /// Description of the tool.
    pub description: String,
    /// Parameters definition of the tool, as a JSON schema object.
    pub parameters: Value,
}
