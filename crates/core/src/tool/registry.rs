use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::Error as AgentError;
use crate::tool::{
    AnyTool, Tool, ToolDescriptor, ToolObject, ToolResult,
    normalize_parameter_schema,
};

struct Entry {
    descriptor: ToolDescriptor,
    tool: Box<dyn ToolObject>,
}

/// The set of tools advertised to the model, keyed by name.
///
/// Tools are registered once while the agent is being built and the
/// registry is immutable afterwards.
#[derive(Default)]
pub struct Registry {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

/// A tool call whose name and arguments have been checked against the
/// registry but which has not run yet.
pub(crate) struct PreparedCall<'a> {
    entry: &'a Entry,
    arguments: Map<String, Value>,
}

impl PreparedCall<'_> {
    #[inline]
    pub fn run(self) -> impl Future<Output = ToolResult> + Send + 'static {
        self.entry.tool.execute(self.arguments)
    }
}

impl Registry {
    /// Registers a tool. A tool with the same name replaces the earlier one
    /// but keeps its position.
    pub fn register<T: Tool>(&mut self, tool: T) {
        let descriptor = ToolDescriptor {
            name: tool.name().to_owned(),
            description: tool.description().trim().to_owned(),
            parameters: normalize_parameter_schema(tool.parameter_schema()),
        };
        let entry = Entry {
            descriptor,
            tool: Box::new(AnyTool(tool)),
        };
        match self.index.get(&entry.descriptor.name) {
            Some(&idx) => {
                warn!("tool `{}` is registered twice", entry.descriptor.name);
                self.entries[idx] = entry;
            }
            None => {
                self.index
                    .insert(entry.descriptor.name.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    /// Returns the descriptors of all tools in registration order.
    #[inline]
    pub fn describe(&self) -> Vec<ToolDescriptor> {
        self.entries.iter().map(|e| e.descriptor.clone()).collect()
    }

    /// Returns `true` if no tool is registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs the tool `name` with `arguments`.
    ///
    /// An unknown name or a missing required argument is a protocol error
    /// and nothing is executed. Otherwise the tool's own outcome, success
    /// or failure, is returned as data.
    pub async fn invoke(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<ToolResult, AgentError> {
        let call = self.prepare(name, arguments)?;
        Ok(call.run().await)
    }

    pub(crate) fn prepare(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<PreparedCall<'_>, AgentError> {
        let Some(&idx) = self.index.get(name) else {
            warn!("tool not found: {name}");
            return Err(AgentError::UnknownTool(name.to_owned()));
        };
        let entry = &self.entries[idx];
        if let Some(missing) = entry
            .descriptor
            .required()
            .find(|key| !arguments.contains_key(*key))
        {
            return Err(AgentError::MissingArgument {
                tool: name.to_owned(),
                argument: missing.to_owned(),
            });
        }
        Ok(PreparedCall { entry, arguments })
    }
}
