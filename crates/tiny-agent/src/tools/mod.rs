//! A set of built-in tools that models can use.

mod bash;
mod read;
mod write;

pub use bash::BashTool;
pub use read::ReadTool;
pub use write::WriteTool;

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tiny_agent_core::tool::Registry;

    use super::*;

    #[test]
    fn test_advertised_schemas() {
        let mut registry = Registry::default();
        registry.register(ReadTool::new());
        registry.register(WriteTool::new());
        registry.register(BashTool::new());

        let tools: Vec<_> = registry
            .describe()
            .into_iter()
            .map(|d| json!({ "name": d.name, "parameters": d.parameters }))
            .collect();
        assert_eq!(
            tools,
            [
                json!({
                    "name": "Read",
                    "parameters": {
                        "type": "object",
                        "required": ["file_path"],
                        "properties": {
                            "file_path": {
                                "type": "string",
                                "description": "The path to the file to read"
                            }
                        }
                    }
                }),
                json!({
                    "name": "Write",
                    "parameters": {
                        "type": "object",
                        "required": ["file_path", "content"],
                        "properties": {
                            "file_path": {
                                "type": "string",
                                "description": "The path of the file to write to"
                            },
                            "content": {
                                "type": "string",
                                "description": "The content to write to the file"
                            }
                        }
                    }
                }),
                json!({
                    "name": "Bash",
                    "parameters": {
                        "type": "object",
                        "required": ["command"],
                        "properties": {
                            "command": {
                                "type": "string",
                                "description": "The command to execute"
                            }
                        }
                    }
                }),
            ]
        );
    }
}
