use serde::{Deserialize, Serialize};
use serde_json::Value;
use tiny_agent_model::{
    ModelChoice, ModelFinishReason, ModelMessage, ModelRequest, ModelResponse,
    ModelTool, OpaqueMessage, ToolCallRequest,
};

use crate::OpenAIConfig;

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionToolCall {
    pub name: String,
    pub arguments: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(default = "function_type")]
    pub r#type: String,
    pub function: FunctionToolCall,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct ChatCompletion {
    pub id: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
    pub finish_reason: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
    pub tool_calls: Option<Vec<ToolCall>>,
    pub reasoning_content: Option<String>,
}

fn function_type() -> String {
    "function".to_owned()
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
struct FunctionTool {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
struct Tool {
    r#type: &'static str,
    function: FunctionTool,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        content: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tool_calls: Option<Vec<ToolCall>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        reasoning_content: Option<String>,
    },
    Tool {
        tool_call_id: String,
        content: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

// -----------
// Conversions
// -----------

#[inline]
pub fn create_request(
    req: &ModelRequest,
    config: &OpenAIConfig,
) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: config.model.clone(),
        messages: req.messages.iter().map(create_message).collect(),
        tools: req.tools.iter().map(create_tool).collect(),
    }
}

fn create_message(msg: &ModelMessage) -> Message {
    match msg {
        ModelMessage::System(content) => Message::System {
            content: content.clone(),
        },
        ModelMessage::User(content) => Message::User {
            content: content.clone(),
        },
        ModelMessage::Assistant(assistant) => {
            let tool_calls: Vec<_> = assistant
                .tool_calls
                .iter()
                .map(|call| ToolCall {
                    id: call.id.clone(),
                    r#type: function_type(),
                    function: FunctionToolCall {
                        name: call.name.clone(),
                        arguments: call.arguments.clone(),
                    },
                })
                .collect();
            Message::Assistant {
                content: assistant.content.clone(),
                tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
                reasoning_content: None,
            }
        }
        ModelMessage::Tool(result) => Message::Tool {
            tool_call_id: result.id.clone(),
            content: result.content.clone(),
        },
        ModelMessage::Opaque(opaque_message) => {
            // Opaque messages from this provider always have `Message` type.
            match opaque_message.to_raw::<Message>() {
                Some(msg) => msg.clone(),
                None => {
                    warn!("foreign opaque message: {opaque_message:?}");
                    Message::Assistant {
                        content: None,
                        tool_calls: None,
                        reasoning_content: None,
                    }
                }
            }
        }
    }
}

#[inline]
fn create_tool(tool: &ModelTool) -> Tool {
    Tool {
        r#type: "function",
        function: FunctionTool {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: tool.parameters.clone(),
        },
    }
}

pub fn parse_response(completion: ChatCompletion) -> ModelResponse {
    let ChatCompletion { id, choices } = completion;
    let choices = choices
        .into_iter()
        .enumerate()
        .map(|(idx, choice)| parse_choice(&id, idx, choice))
        .collect();
    ModelResponse { choices }
}

fn parse_choice(completion_id: &str, idx: usize, choice: Choice) -> ModelChoice {
    let ResponseMessage {
        content,
        tool_calls,
        reasoning_content,
    } = choice.message;
    let requests = tool_calls
        .iter()
        .flatten()
        .map(|call| {
            ToolCallRequest::new(
                &call.id,
                &call.function.name,
                &call.function.arguments,
            )
        })
        .collect();
    let finish_reason =
        choice.finish_reason.as_deref().map(|reason| match reason {
            "tool_calls" => ModelFinishReason::ToolCalls,
            "stop" => ModelFinishReason::Stop,
            "length" => ModelFinishReason::Length,
            _ => ModelFinishReason::Other,
        });
    let raw = Message::Assistant {
        content: content.clone(),
        tool_calls,
        reasoning_content,
    };
    ModelChoice {
        content,
        tool_calls: requests,
        finish_reason,
        opaque: Some(OpaqueMessage::new(format!("{completion_id}:{idx}"), raw)),
    }
}
