//! Provider-neutral types shared by the agent and the model providers.
//!
//! The agent loop never talks to a concrete chat-completion service. It
//! builds a [`ModelRequest`], hands it to a [`ModelProvider`] and reads a
//! [`ModelResponse`] back. Providers translate these types to and from their
//! own wire formats.
//!
//! Types in this crate carry no behavior beyond small conveniences. They
//! are the contract that provider implementations adhere to.

#![deny(missing_docs)]

mod error;
mod opaque;
mod provider;
mod request;
mod response;

pub use error::*;
pub use opaque::*;
pub use provider::*;
pub use request::*;
pub use response::*;
