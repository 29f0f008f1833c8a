//! MCP tool support for the Change Analysis server.
//!
//! This module contains the input types and response rendering used by
//! the tools exposed in [`server`](crate::server).

mod inputs;
mod response;

pub use inputs::*;
pub use response::*;
