//! Core logic of the agent: the tool registry, response classification,
//! tool dispatch, conversation state and the agent loop driving them.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod agent;
pub mod classify;
pub mod conversation;
mod error;
mod model_client;
pub mod tool;

pub use agent::{Agent, AgentBuilder, AgentStage, Interaction};
pub use error::Error;
pub use model_client::RetryPolicy;
