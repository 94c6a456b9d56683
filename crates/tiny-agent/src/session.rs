use std::time::Duration;

use tiny_agent_core::conversation::Conversation;
use tiny_agent_core::{Agent, AgentBuilder, Error, Interaction, RetryPolicy};
use tiny_agent_model::{ModelProvider, ToolCallRequest};

use crate::tools::*;

/// A session builder.
///
/// See [`Session`].
pub struct SessionBuilder {
    agent_builder: AgentBuilder,
    bash_timeout: Option<Duration>,
}

impl SessionBuilder {
    /// Creates a session builder with a specified model provider.
    pub fn with_model_provider<M: ModelProvider + 'static>(
        provider: M,
    ) -> Self {
        let agent_builder = AgentBuilder::with_model_provider(provider);
        Self {
            agent_builder,
            bash_timeout: None,
        }
    }

    /// Sets the system prompt for the agent.
    #[inline]
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.agent_builder = self.agent_builder.with_system_prompt(prompt);
        self
    }

    /// Kills shell commands running longer than `timeout`.
    #[inline]
    pub fn with_bash_timeout(mut self, timeout: Duration) -> Self {
        self.bash_timeout = Some(timeout);
        self
    }

    /// Sets how rate limited provider requests are retried.
    #[inline]
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.agent_builder = self.agent_builder.with_retry_policy(retry_policy);
        self
    }

    /// Attaches a callback to be invoked right before each tool call runs.
    #[inline]
    pub fn on_tool_call(
        mut self,
        on_tool_call: impl Fn(&ToolCallRequest) + Send + Sync + 'static,
    ) -> Self {
        self.agent_builder = self.agent_builder.on_tool_call(on_tool_call);
        self
    }

    /// Builds a new session.
    pub fn build(self) -> Session {
        let mut bash_tool = BashTool::new();
        if let Some(timeout) = self.bash_timeout {
            bash_tool = bash_tool.with_timeout(timeout);
        }
        let agent = self
            .agent_builder
            .with_tool(ReadTool::new())
            .with_tool(WriteTool::new())
            .with_tool(bash_tool)
            .build();

        Session { agent }
    }
}

/// A chat session, like a window that displays messages and has a input box.
///
/// The session holds a fully configured agent that you can use directly, and it
/// is basically a wrapper around [`Agent`].
pub struct Session {
    agent: Agent,
}

impl Session {
    /// Sends a message to the session and waits for the assistant's reply.
    #[inline]
    pub async fn send_message(&mut self, message: &str) -> Result<String, Error> {
        self.agent.handle_user_input(message).await
    }

    /// Runs the session until `interaction` has no more input.
    #[inline]
    pub async fn run<I: Interaction>(
        &mut self,
        interaction: &mut I,
    ) -> Result<(), Error> {
        self.agent.run(interaction).await
    }

    /// Returns the conversation so far.
    #[inline]
    pub fn conversation(&self) -> &Conversation {
        self.agent.conversation()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;
    use tiny_agent_core::conversation::{Role, Turn};
    use tiny_agent_model::ModelMessage;
    use tiny_agent_test_model::{PresetResponse, TestModelProvider};

    use super::*;

    #[tokio::test]
    async fn test_read_file_round() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foo.txt");
        fs::write(&path, "hello").unwrap();
        let arguments = json!({ "file_path": path }).to_string();

        let mut model_provider = TestModelProvider::default();
        model_provider.add_user_input_step();
        model_provider.add_assistant_response_step(
            PresetResponse::with_tool_calls([ToolCallRequest::new(
                "call_1", "Read", arguments,
            )]),
        );
        model_provider.add_tool_result_steps(1);
        model_provider.add_assistant_response_step(
            PresetResponse::with_message("foo.txt says hello."),
        );

        let mut session =
            SessionBuilder::with_model_provider(model_provider.clone())
                .with_retry_policy(RetryPolicy::none())
                .build();
        let reply = session.send_message("read foo.txt").await.unwrap();

        assert_eq!(reply, "foo.txt says hello.");
        let turns = session.conversation().turns();
        assert_eq!(turns[1].role(), Role::Assistant);
        assert_eq!(
            turns[2],
            Turn::Tool {
                correlation_id: "call_1".to_owned(),
                content: "hello".to_owned(),
            }
        );

        let requests = model_provider.requests();
        assert_eq!(requests.len(), 2);
        let names: Vec<_> =
            requests[0].tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["Read", "Write", "Bash"]);
        assert!(matches!(
            requests[1].messages.last(),
            Some(ModelMessage::Tool(result)) if result.content == "hello"
        ));
    }

    #[tokio::test]
    async fn test_command_failure_is_reported_to_model() {
        let mut model_provider = TestModelProvider::default();
        model_provider.add_user_input_step();
        model_provider.add_assistant_response_step(
            PresetResponse::with_tool_calls([
                ToolCallRequest::new(
                    "call_1",
                    "Bash",
                    r#"{"command":"echo oops >&2; exit 1"}"#,
                ),
                ToolCallRequest::new(
                    "call_2",
                    "Bash",
                    r#"{"command":"sleep 10"}"#,
                ),
            ]),
        );
        model_provider.add_tool_result_steps(2);
        model_provider.add_assistant_response_step(
            PresetResponse::with_message("Both commands failed."),
        );

        let mut session = SessionBuilder::with_model_provider(model_provider)
            .with_retry_policy(RetryPolicy::none())
            .with_bash_timeout(Duration::from_millis(200))
            .build();
        let reply = session.send_message("run things").await.unwrap();

        assert_eq!(reply, "Both commands failed.");
        let turns = session.conversation().turns();
        assert_eq!(turns[2].content(), "oops\n");
        assert!(turns[3].content().contains("timed out"));
    }
}
