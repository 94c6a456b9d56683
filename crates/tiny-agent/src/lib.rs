//! An out-of-the-box agent that can read and write files and run shell
//! commands on behalf of a model.
//!
//! The crate includes a CLI tool for using in the terminal. And you can also
//! use it as a library to bring agent functionality into your own host apps.

#![deny(missing_docs)]

#[allow(unused_imports)]
#[macro_use]
extern crate tracing;

mod session;
pub mod tools;

pub use session::{Session, SessionBuilder};

/// Re-exports of [`tiny_agent_core`] crate.
pub mod core {
    pub use tiny_agent_core::*;
}
