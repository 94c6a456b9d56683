use serde_json::{Map, Value};
use tiny_agent_model::{ToolCallRequest, ToolCallResult};
use tracing::Instrument;

use crate::error::Error as AgentError;
use crate::tool::Registry;

/// Runs the tool calls of one response and returns one result per call,
/// in the same order.
///
/// The whole batch is validated before anything runs: if any call has
/// malformed arguments or names an unknown tool, no tool is executed and the
/// protocol error is returned. Valid calls then run one after another.
/// A tool that fails still yields a result, whose content is the failure
/// description.
pub async fn dispatch(
    registry: &Registry,
    requests: &[ToolCallRequest],
) -> Result<Vec<ToolCallResult>, AgentError> {
    dispatch_with(registry, requests, &|_| {}).await
}

pub(crate) async fn dispatch_with(
    registry: &Registry,
    requests: &[ToolCallRequest],
    on_call: &(dyn Fn(&ToolCallRequest) + Send + Sync),
) -> Result<Vec<ToolCallResult>, AgentError> {
    let span = debug_span!("tool dispatch", count = requests.len());
    async move {
        let mut calls = Vec::with_capacity(requests.len());
        for req in requests {
            let arguments = parse_arguments(req)?;
            calls.push((req, registry.prepare(&req.name, arguments)?));
        }

        let mut results = Vec::with_capacity(calls.len());
        for (req, call) in calls {
            info!(
                "calling tool {} ({}) with args {}",
                req.name, req.id, req.arguments
            );
            on_call(req);
            let content = match call.run().await {
                Ok(output) => output,
                Err(err) => {
                    debug!("tool {} ({}) failed: {err}", req.name, req.id);
                    err.reason().into_owned()
                }
            };
            results.push(ToolCallResult {
                id: req.id.clone(),
                content,
            });
        }
        Ok(results)
    }
    .instrument(span)
    .await
}

fn parse_arguments(
    req: &ToolCallRequest,
) -> Result<Map<String, Value>, AgentError> {
    let malformed = |reason: String| AgentError::MalformedArguments {
        id: req.id.clone(),
        reason,
    };
    match serde_json::from_str::<Value>(&req.arguments) {
        Ok(Value::Object(arguments)) => Ok(arguments),
        Ok(other) => {
            Err(malformed(format!("expected an object, got `{other}`")))
        }
        Err(err) => Err(malformed(err.to_string())),
    }
}
