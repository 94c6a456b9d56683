//! Classification of provider responses.

use tiny_agent_model::{ModelChoice, ModelResponse, ToolCallRequest};

use crate::Error;

/// What the agent should do with an assistant turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Classification {
    /// A plain message to surface to the user.
    MessageOnly(String),
    /// Tool calls to run, in the order the model listed them.
    ToolUse(Vec<ToolCallRequest>),
}

/// Takes the first choice out of a response.
pub fn first_choice(response: ModelResponse) -> Result<ModelChoice, Error> {
    response.choices.into_iter().next().ok_or(Error::NoChoices)
}

/// Classifies an assistant turn.
///
/// Tool calls take precedence: a turn carrying both text and tool calls is
/// a tool use (its text is kept in the conversation, not shown). A turn with
/// neither violates the provider contract.
pub fn classify(choice: &ModelChoice) -> Result<Classification, Error> {
    if !choice.tool_calls.is_empty() {
        return Ok(Classification::ToolUse(choice.tool_calls.clone()));
    }
    match &choice.content {
        Some(content) => Ok(Classification::MessageOnly(content.clone())),
        None => Err(Error::EmptyResponse),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_only() {
        let choice = ModelChoice::with_content("4");
        assert_eq!(
            classify(&choice).unwrap(),
            Classification::MessageOnly("4".to_owned())
        );

        // An empty text is still a message.
        let choice = ModelChoice::with_content("");
        assert_eq!(
            classify(&choice).unwrap(),
            Classification::MessageOnly(String::new())
        );
    }

    #[test]
    fn test_tool_use_keeps_order() {
        let calls = vec![
            ToolCallRequest::new("call_2", "Write", "{}"),
            ToolCallRequest::new("call_1", "Read", "{}"),
        ];
        let mut choice = ModelChoice::with_tool_calls(calls.clone());
        choice.content = Some("Let me check.".to_owned());

        assert_eq!(classify(&choice).unwrap(), Classification::ToolUse(calls));
    }

    #[test]
    fn test_protocol_errors() {
        let err = classify(&ModelChoice::default()).unwrap_err();
        assert!(matches!(err, Error::EmptyResponse));
        assert!(err.is_protocol_error());

        let err = first_choice(ModelResponse { choices: vec![] }).unwrap_err();
        assert!(matches!(err, Error::NoChoices));

        let response = ModelResponse {
            choices: vec![
                ModelChoice::with_content("first"),
                ModelChoice::with_content("second"),
            ],
        };
        let choice = first_choice(response).unwrap();
        assert_eq!(choice.content.as_deref(), Some("first"));
    }
}
