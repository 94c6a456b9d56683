//! Conversation-related types.

use std::collections::VecDeque;
use std::fmt::{self, Display, Write as _};

use tiny_agent_model::{
    AssistantMessage, ModelChoice, ModelMessage, OpaqueMessage,
    ToolCallRequest, ToolCallResult,
};

use crate::Error;

/// The author of a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// The human on the other side of the session.
    User,
    /// The model.
    Assistant,
    /// A tool run on behalf of the model.
    Tool,
}

impl Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Assistant => f.write_str("assistant"),
            Role::Tool => f.write_str("tool"),
        }
    }
}

/// One entry in the conversation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Turn {
    /// A user input.
    User {
        /// The input text.
        content: String,
    },
    /// An assistant turn as returned by the provider.
    Assistant {
        /// The text content, absent for turns that only request tools.
        content: Option<String>,
        /// Tool calls requested in this turn.
        tool_calls: Vec<ToolCallRequest>,
        /// The provider's verbatim form of this turn, replayed on later
        /// requests instead of a reconstruction.
        raw: Option<OpaqueMessage>,
    },
    /// The outcome of one tool call.
    Tool {
        /// Id of the tool call this turn answers.
        correlation_id: String,
        /// Output or failure description of the tool.
        content: String,
    },
}

impl Turn {
    /// Returns the role of this turn.
    #[inline]
    pub fn role(&self) -> Role {
        match self {
            Turn::User { .. } => Role::User,
            Turn::Assistant { .. } => Role::Assistant,
            Turn::Tool { .. } => Role::Tool,
        }
    }

    /// Returns the text content, empty for tool-only assistant turns.
    #[inline]
    pub fn content(&self) -> &str {
        match self {
            Turn::User { content } | Turn::Tool { content, .. } => content,
            Turn::Assistant { content, .. } => {
                content.as_deref().unwrap_or("")
            }
        }
    }

    /// Returns the id of the tool call answered by a tool turn.
    #[inline]
    pub fn correlation_id(&self) -> Option<&str> {
        match self {
            Turn::Tool { correlation_id, .. } => Some(correlation_id),
            _ => None,
        }
    }

    fn to_message(&self) -> ModelMessage {
        match self {
            Turn::User { content } => ModelMessage::User(content.clone()),
            Turn::Assistant {
                raw: Some(raw), ..
            } => ModelMessage::Opaque(raw.clone()),
            Turn::Assistant {
                content,
                tool_calls,
                raw: None,
            } => ModelMessage::Assistant(AssistantMessage {
                content: content.clone(),
                tool_calls: tool_calls.clone(),
            }),
            Turn::Tool {
                correlation_id,
                content,
            } => ModelMessage::Tool(ToolCallResult {
                id: correlation_id.clone(),
                content: content.clone(),
            }),
        }
    }
}

/// The ordered transcript of a session.
///
/// It only grows. A tool turn is accepted only when it answers the next
/// tool call of the latest assistant turn that is still unanswered.
#[derive(Clone, Default, Debug)]
pub struct Conversation {
    turns: Vec<Turn>,
    pending_tool_calls: VecDeque<String>,
}

impl Conversation {
    /// Appends a user turn.
    #[inline]
    pub fn push_user<S: Into<String>>(&mut self, content: S) {
        self.turns.push(Turn::User {
            content: content.into(),
        });
    }

    /// Appends an assistant turn exactly as the provider returned it.
    pub fn push_assistant(&mut self, choice: &ModelChoice) {
        if !self.pending_tool_calls.is_empty() {
            warn!(
                "assistant turn appended with {} unanswered tool calls",
                self.pending_tool_calls.len()
            );
        }
        self.pending_tool_calls =
            choice.tool_calls.iter().map(|c| c.id.clone()).collect();
        self.turns.push(Turn::Assistant {
            content: choice.content.clone(),
            tool_calls: choice.tool_calls.clone(),
            raw: choice.opaque.clone(),
        });
    }

    /// Appends a tool turn.
    pub fn push_tool_result(
        &mut self,
        result: ToolCallResult,
    ) -> Result<(), Error> {
        if self.pending_tool_calls.front() != Some(&result.id) {
            return Err(Error::UncorrelatedToolResult(result.id));
        }
        self.pending_tool_calls.pop_front();
        self.turns.push(Turn::Tool {
            correlation_id: result.id,
            content: result.content,
        });
        Ok(())
    }

    /// Returns the ids of tool calls still waiting for a result.
    #[inline]
    pub fn pending_tool_calls(&self) -> impl Iterator<Item = &str> {
        self.pending_tool_calls.iter().map(String::as_str)
    }

    /// Returns all turns, oldest first.
    #[inline]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Returns the number of turns.
    #[inline]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Returns `true` if the conversation has no turn.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Converts the turns to the messages sent to the provider.
    pub fn to_messages(&self) -> Vec<ModelMessage> {
        self.turns.iter().map(Turn::to_message).collect()
    }

    /// Renders a human readable transcript, one line per turn.
    ///
    /// The transcript is meant for logs and export. It is not enough to
    /// reconstruct the conversation.
    pub fn transcript(&self) -> String {
        let mut transcript = String::new();
        for turn in &self.turns {
            let prefix = match turn {
                Turn::Tool { correlation_id, .. } => {
                    format!("tool ({correlation_id})")
                }
                _ => turn.role().to_string(),
            };
            transcript.push_str(&prefix);
            transcript.push_str(": ");
            transcript.push_str(turn.content());
            if let Turn::Assistant { tool_calls, .. } = turn {
                for call in tool_calls {
                    write!(
                        transcript,
                        " [{}: {}({})]",
                        call.id, call.name, call.arguments
                    )
                    .ok();
                }
            }
            transcript.push('\n');
        }
        transcript
    }
}
