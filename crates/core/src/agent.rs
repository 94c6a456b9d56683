mod builder;

use std::fmt::{self, Debug};

use tiny_agent_model::{ModelMessage, ModelRequest, ToolCallRequest};
use tracing::Instrument;

use crate::Error;
use crate::classify::{Classification, classify, first_choice};
use crate::conversation::Conversation;
use crate::model_client::ModelClient;
use crate::tool::{Registry, ToolDescriptor, dispatch, dispatch_with};
pub use builder::AgentBuilder;

type ToolCallHook = Box<dyn Fn(&ToolCallRequest) + Send + Sync>;

/// The stage an agent is in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AgentStage {
    /// Waiting for the next user turn.
    #[default]
    AwaitUserInput,
    /// Waiting for the provider to answer a request.
    AwaitProvider,
    /// Surfacing a plain message.
    HandleMessage,
    /// Running the tool calls of the latest assistant turn.
    HandleTools,
}

/// The external side of a session: where user turns come from and where
/// plain messages go.
pub trait Interaction {
    /// Waits for the next user turn. `None` ends the session.
    fn next_input(&mut self) -> impl Future<Output = Option<String>>;

    /// Surfaces a plain message of the assistant.
    fn show_message(&mut self, message: &str);
}

/// An agent instance, which owns a conversation, a model client and the
/// tools advertised to the model.
///
/// The agent is strictly sequential: there is at most one outstanding
/// provider request, and tool calls run one at a time.
pub struct Agent {
    model_client: ModelClient,
    registry: Registry,
    conversation: Conversation,
    system_prompt: Option<String>,
    stage: AgentStage,
    ended: bool,
    on_tool_call: Option<ToolCallHook>,
}

impl Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("stage", &self.stage)
            .field("ended", &self.ended)
            .field("turns", &self.conversation.len())
            .finish_non_exhaustive()
    }
}

impl Agent {
    /// Returns the current stage.
    #[inline]
    pub fn stage(&self) -> AgentStage {
        self.stage
    }

    /// Returns the conversation so far.
    #[inline]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Returns `true` once a round failed. An ended agent accepts no more
    /// user input.
    #[inline]
    pub fn has_ended(&self) -> bool {
        self.ended
    }

    /// Returns the registered tools.
    #[inline]
    pub fn tools(&self) -> &Registry {
        &self.registry
    }

    /// Handles one user turn.
    ///
    /// The turn is sent to the provider, and tool rounds are chained until
    /// the provider answers with a plain message, which is returned. Tool
    /// failures are fed back to the provider. Protocol and transport errors
    /// end the session: they are returned, and every later call fails with
    /// [`Error::SessionEnded`].
    pub async fn handle_user_input<S: Into<String>>(
        &mut self,
        input: S,
    ) -> Result<String, Error> {
        let message = self.respond(input).await?;
        self.set_stage(AgentStage::AwaitUserInput);
        Ok(message)
    }

    /// Runs the session until `interaction` has no more input.
    pub async fn run<I: Interaction>(
        &mut self,
        interaction: &mut I,
    ) -> Result<(), Error> {
        while let Some(input) = interaction.next_input().await {
            let message = self.respond(input).await?;
            interaction.show_message(&message);
            self.set_stage(AgentStage::AwaitUserInput);
        }
        debug!("no more user input, session ended");
        Ok(())
    }

    /// Runs a round for `input`, leaving the agent in
    /// [`AgentStage::HandleMessage`] on success.
    async fn respond<S: Into<String>>(
        &mut self,
        input: S,
    ) -> Result<String, Error> {
        if self.ended {
            return Err(Error::SessionEnded);
        }
        if self.stage != AgentStage::AwaitUserInput {
            warn!("user input received while in stage {:?}", self.stage);
        }
        self.conversation.push_user(input);

        let result =
            self.run_round().instrument(debug_span!("agent round")).await;
        if let Err(err) = &result {
            self.ended = true;
            if err.is_protocol_error() {
                error!("provider broke the protocol: {err}");
            } else {
                error!("{err}");
            }
            debug!("transcript:\n{}", self.conversation.transcript());
        }
        result
    }

    async fn run_round(&mut self) -> Result<String, Error> {
        loop {
            self.set_stage(AgentStage::AwaitProvider);
            let req = self.build_model_request();
            let resp = self
                .model_client
                .send_request(req)
                .await
                .map_err(Error::Provider)?;
            let choice = first_choice(resp)?;
            // The assistant turn is recorded before it is classified, so the
            // conversation keeps it even if it breaks the protocol.
            self.conversation.push_assistant(&choice);

            match classify(&choice)? {
                Classification::MessageOnly(message) => {
                    self.set_stage(AgentStage::HandleMessage);
                    return Ok(message);
                }
                Classification::ToolUse(calls) => {
                    self.set_stage(AgentStage::HandleTools);
                    self.handle_tool_calls(&calls).await?;
                }
            }
        }
    }

    async fn handle_tool_calls(
        &mut self,
        calls: &[ToolCallRequest],
    ) -> Result<(), Error> {
        let results = match &self.on_tool_call {
            Some(on_call) => {
                dispatch_with(&self.registry, calls, on_call.as_ref()).await?
            }
            None => dispatch(&self.registry, calls).await?,
        };
        for result in results {
            self.conversation.push_tool_result(result)?;
        }
        Ok(())
    }

    fn build_model_request(&self) -> ModelRequest {
        let mut messages = Vec::with_capacity(self.conversation.len() + 1);
        if let Some(system_prompt) = &self.system_prompt {
            messages.push(ModelMessage::System(system_prompt.clone()));
        }
        messages.extend(self.conversation.to_messages());
        let tools = self
            .registry
            .describe()
            .iter()
            .map(ToolDescriptor::to_model_tool)
            .collect();
        ModelRequest { messages, tools }
    }

    #[inline]
    fn set_stage(&mut self, stage: AgentStage) {
        trace!("stage: {:?} -> {stage:?}", self.stage);
        self.stage = stage;
    }
}
