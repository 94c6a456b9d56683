use tiny_agent_model::{ModelProvider, ToolCallRequest};

use super::{Agent, AgentStage};
use crate::model_client::{ModelClient, RetryPolicy};
use crate::tool::{Registry, Tool};

/// [`Agent`] builder.
pub struct AgentBuilder {
    model_client: ModelClient,
    registry: Registry,
    system_prompt: Option<String>,
    on_tool_call: Option<super::ToolCallHook>,
}

impl AgentBuilder {
    /// Creates a new builder with the specified model provider.
    #[inline]
    pub fn with_model_provider<P: ModelProvider + 'static>(
        provider: P,
    ) -> Self {
        Self {
            model_client: ModelClient::new(provider),
            registry: Registry::default(),
            system_prompt: None,
            on_tool_call: None,
        }
    }

    /// Sets the system prompt sent ahead of the conversation.
    #[inline]
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Registers a tool.
    #[inline]
    pub fn with_tool<T: Tool>(mut self, tool: T) -> Self {
        self.registry.register(tool);
        self
    }

    /// Sets how transient provider failures are retried.
    #[inline]
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.model_client.set_retry_policy(retry_policy);
        self
    }

    /// Attaches a callback to be invoked right before each tool call runs.
    #[inline]
    pub fn on_tool_call(
        mut self,
        on_tool_call: impl Fn(&ToolCallRequest) + Send + Sync + 'static,
    ) -> Self {
        self.on_tool_call = Some(Box::new(on_tool_call));
        self
    }

    /// Builds the agent.
    #[inline]
    pub fn build(self) -> Agent {
        Agent {
            model_client: self.model_client,
            registry: self.registry,
            conversation: Default::default(),
            system_prompt: self.system_prompt,
            stage: AgentStage::default(),
            ended: false,
            on_tool_call: self.on_tool_call,
        }
    }
}
