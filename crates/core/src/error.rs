use tiny_agent_model::ModelProviderError;

/// An error that ends the agent session.
///
/// Tool failures such as a missing file or a non-zero shell exit are not
/// represented here. They are reported back to the model as tool output
/// (see [`crate::tool::Error`]).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The model provider could not produce a response.
    #[error("model provider failed: {0}")]
    Provider(Box<dyn ModelProviderError>),
    /// The response contains no choice.
    #[error("no choices in response")]
    NoChoices,
    /// The response contains neither text nor tool calls.
    #[error("response carries neither text nor tool calls")]
    EmptyResponse,
    /// The serialized arguments of a tool call are not a JSON object.
    #[error("malformed arguments for tool call `{id}`: {reason}")]
    MalformedArguments {
        /// Id of the offending tool call.
        id: String,
        /// Why the arguments were rejected.
        reason: String,
    },
    /// The model requested a tool that was never advertised.
    #[error("could not find tool `{0}`")]
    UnknownTool(String),
    /// A tool call lacks an argument the tool declares as required.
    #[error("tool `{tool}` is missing required argument `{argument}`")]
    MissingArgument {
        /// Name of the tool.
        tool: String,
        /// Name of the missing argument.
        argument: String,
    },
    /// A tool result does not answer the next pending tool call.
    #[error("tool result `{0}` does not answer the next pending tool call")]
    UncorrelatedToolResult(String),
    /// An earlier round failed, so the session accepts no more input.
    #[error("session has ended after an earlier error")]
    SessionEnded,
}

impl Error {
    /// Returns `true` if the error means the provider broke the protocol,
    /// as opposed to failing to respond at all.
    #[inline]
    pub fn is_protocol_error(&self) -> bool {
        !matches!(self, Error::Provider(_) | Error::SessionEnded)
    }
}
