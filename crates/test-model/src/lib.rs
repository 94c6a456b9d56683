//! A local fake model for testing purpose.

mod preset;

use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tiny_agent_model::{
    ErrorKind, ModelChoice, ModelFinishReason, ModelMessage, ModelProvider,
    ModelProviderError, ModelRequest, ModelResponse, OpaqueMessage,
};
use tokio::time::sleep;

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    message: &'static str,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.kind)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

#[derive(Clone, Debug)]
enum ConversationStep {
    UserInput,
    ToolResult,
    AssistantResponse(PresetResponse),
}

#[derive(Default)]
struct Records {
    requests: Vec<ModelRequest>,
    attempts: HashMap<usize, u64>,
}

/// A local fake model for testing purpose.
///
/// Before sending requests, you need to setup the conversation script, which
/// is how the model should respond to a request. The step is selected by the
/// number of non-system messages in the request: a request carrying `n` such
/// messages is answered by step `n`, which must be an assistant response. If
/// there are no enough steps in the script, an error will be returned.
///
/// Every request is recorded and can be inspected with [`Self::requests`].
/// Clones share the records.
///
/// # Note
///
/// This type is not optimized for production use, there are heavy memory
/// copies involved. You should only use it for testing.
#[derive(Clone, Default)]
pub struct TestModelProvider {
    conversation_script: Vec<ConversationStep>,
    delay: Option<Duration>,
    records: Arc<Mutex<Records>>,
}

impl TestModelProvider {
    #[inline]
    pub fn add_assistant_response_step(&mut self, preset: PresetResponse) {
        self.conversation_script
            .push(ConversationStep::AssistantResponse(preset));
    }

    #[inline]
    pub fn add_user_input_step(&mut self) {
        self.conversation_script.push(ConversationStep::UserInput);
    }

    /// Adds `count` steps, one per tool result message.
    #[inline]
    pub fn add_tool_result_steps(&mut self, count: usize) {
        for _ in 0..count {
            self.conversation_script.push(ConversationStep::ToolResult);
        }
    }

    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    /// Returns all requests received so far, oldest first.
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.records
            .lock()
            .expect("test model records are poisoned")
            .requests
            .clone()
    }

    fn respond(&self, req: &ModelRequest) -> Result<ModelResponse, Error> {
        let mut records =
            self.records.lock().expect("test model records are poisoned");
        records.requests.push(req.clone());

        let step_idx = req
            .messages
            .iter()
            .filter(|msg| !matches!(msg, ModelMessage::System(_)))
            .count();
        let Some(step) = self.conversation_script.get(step_idx) else {
            return Err(Error {
                message: "no enough steps",
                kind: ErrorKind::Other,
            });
        };
        let preset = match step {
            ConversationStep::AssistantResponse(preset) => preset,
            ConversationStep::UserInput | ConversationStep::ToolResult => {
                return Err(Error {
                    message: "not an assistant response step",
                    kind: ErrorKind::Moderated,
                });
            }
        };

        let attempts = records.attempts.entry(step_idx).or_default();
        *attempts += 1;
        if let Some(failures) = preset.failures {
            if failures == 0 || *attempts <= failures {
                return Err(Error {
                    message: "preset failure",
                    kind: ErrorKind::RateLimitExceeded,
                });
            }
        }

        if preset.no_choices {
            return Ok(ModelResponse { choices: vec![] });
        }
        let finish_reason = if preset.tool_calls.is_empty() {
            ModelFinishReason::Stop
        } else {
            ModelFinishReason::ToolCalls
        };
        let choice = ModelChoice {
            content: preset.content.clone(),
            tool_calls: preset.tool_calls.clone(),
            finish_reason: Some(finish_reason),
            opaque: Some(OpaqueMessage::new(
                format!("msg:{step_idx}"),
                preset.clone(),
            )),
        };
        Ok(ModelResponse {
            choices: vec![choice],
        })
    }
}

impl ModelProvider for TestModelProvider {
    type Error = crate::Error;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<ModelResponse, Self::Error>> + Send + 'static
    {
        let result = self.respond(req);
        let delay = self.delay;
        async move {
            if let Some(delay) = delay {
                sleep(delay).await;
            }
            result
        }
    }
}
