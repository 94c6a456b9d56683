//! Tool call supports.

mod dispatch;
mod error;
mod registry;

use std::pin::Pin;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tiny_agent_model::ModelTool;

pub use dispatch::dispatch;
pub(crate) use dispatch::dispatch_with;
pub use error::{Error, ErrorKind};
pub use registry::Registry;

/// The result of a tool call.
pub type ToolResult = Result<String, Error>;

/// A tool that can be called by the model.
///
/// Implementations of this trait should be stateless, and may not maintain any
/// internal state.
///
/// The tool can be context-aware, meaning it can access additional information
/// about the current execution context, such as the working directory or the
/// current user. To do this, make the context an immutable state of the tool,
/// which can be set during initialization, and copy it when executing.
pub trait Tool: Send + Sync + 'static {
    /// The type of input that the tool accepts.
    type Input: DeserializeOwned;

    /// Returns the name of the tool.
    fn name(&self) -> &str;

    /// Returns the description of the tool.
    fn description(&self) -> &str;

    /// Returns the parameter schema of the tool.
    ///
    /// Keys other than `type`, `properties` and `required` are dropped
    /// before the schema is advertised.
    fn parameter_schema(&self) -> &Value;

    /// Executes the tool with the given input.
    ///
    /// This method must return a future that is fully independent of `self`.
    fn execute(
        &self,
        input: Self::Input,
    ) -> impl Future<Output = ToolResult> + Send + 'static;
}

/// The static declaration of a registered tool, as advertised to the model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolDescriptor {
    /// Name of the tool.
    pub name: String,
    /// Human readable description.
    pub description: String,
    /// `{type: "object", required: [...], properties: {...}}`.
    pub parameters: Value,
}

impl ToolDescriptor {
    /// Returns the names of the required parameters.
    pub fn required(&self) -> impl Iterator<Item = &str> {
        self.parameters
            .get("required")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
    }

    /// Converts the descriptor to the provider-neutral tool definition.
    #[inline]
    pub fn to_model_tool(&self) -> ModelTool {
        ModelTool {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: self.parameters.clone(),
        }
    }
}

/// Reduces a JSON schema to the object shape models expect.
pub(crate) fn normalize_parameter_schema(schema: &Value) -> Value {
    let mut normalized = Map::new();
    normalized.insert("type".to_owned(), Value::from("object"));
    let required = schema
        .get("required")
        .cloned()
        .unwrap_or_else(|| Value::Array(vec![]));
    normalized.insert("required".to_owned(), required);
    let properties = schema
        .get("properties")
        .cloned()
        .unwrap_or_else(|| Value::Object(Map::new()));
    normalized.insert("properties".to_owned(), properties);
    Value::Object(normalized)
}

pub(crate) trait ToolObject: Send + Sync + 'static {
    fn execute(
        &self,
        arguments: Map<String, Value>,
    ) -> Pin<Box<dyn Future<Output = ToolResult> + Send>>;
}

pub(crate) struct AnyTool<T: Tool>(pub T);

impl<T: Tool> ToolObject for AnyTool<T> {
    #[inline]
    fn execute(
        &self,
        arguments: Map<String, Value>,
    ) -> Pin<Box<dyn Future<Output = ToolResult> + Send>> {
        let input: T::Input =
            match serde_json::from_value(Value::Object(arguments)) {
                Ok(input) => input,
                Err(err) => {
                    let reason = format!("{err}");
                    return Box::pin(std::future::ready(ToolResult::Err(
                        Error::invalid_input().with_reason(reason),
                    )));
                }
            };
        Box::pin(self.0.execute(input))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Deserialize)]
    pub struct EchoInput {
        text: String,
    }

    /// Returns its `text` argument, or fails when asked to echo `fail`.
    /// Every execution is recorded.
    pub struct EchoTool {
        schema: Value,
        pub calls: Arc<Mutex<Vec<String>>>,
    }

    impl EchoTool {
        pub fn new() -> Self {
            Self {
                schema: json!({
                    "$schema": "https://json-schema.org/draft/2020-12/schema",
                    "title": "EchoInput",
                    "type": "object",
                    "properties": {
                        "text": {
                            "type": "string",
                            "description": "Text to echo."
                        }
                    },
                    "required": ["text"]
                }),
                calls: Default::default(),
            }
        }
    }

    impl Tool for EchoTool {
        type Input = EchoInput;

        fn name(&self) -> &str {
            "Echo"
        }

        fn description(&self) -> &str {
            "Echoes the text back"
        }

        fn parameter_schema(&self) -> &Value {
            &self.schema
        }

        fn execute(
            &self,
            input: EchoInput,
        ) -> impl Future<Output = ToolResult> + Send + 'static {
            self.calls.lock().unwrap().push(input.text.clone());
            std::future::ready(if input.text == "fail" {
                Err(Error::execution_error().with_reason("boom"))
            } else {
                Ok(input.text)
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_normalize_parameter_schema() {
        let schema = json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "title": "WriteParameters",
            "type": "object",
            "properties": {
                "file_path": { "type": "string", "description": "Path." },
                "content": { "type": "string", "description": "Content." }
            },
            "required": ["file_path", "content"]
        });
        assert_eq!(
            normalize_parameter_schema(&schema),
            json!({
                "type": "object",
                "required": ["file_path", "content"],
                "properties": {
                    "file_path": { "type": "string", "description": "Path." },
                    "content": { "type": "string", "description": "Content." }
                }
            })
        );

        // Tools without parameters still advertise an object.
        assert_eq!(
            normalize_parameter_schema(&Value::Null),
            json!({ "type": "object", "required": [], "properties": {} })
        );
    }

    #[test]
    fn test_descriptor_required() {
        let descriptor = ToolDescriptor {
            name: "Write".to_owned(),
            description: "Write content to a file".to_owned(),
            parameters: json!({
                "type": "object",
                "required": ["file_path", "content"],
                "properties": {}
            }),
        };
        assert_eq!(
            descriptor.required().collect::<Vec<_>>(),
            ["file_path", "content"]
        );
        assert_eq!(descriptor.to_model_tool().name, "Write");
    }
}
