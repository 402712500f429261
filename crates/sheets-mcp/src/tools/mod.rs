//! MCP tool parameter/response types, request parsing and dispatch.
//!
//! All parameter structs derive `Deserialize + JsonSchema` for MCP tool registration.
//! All response structs derive `Serialize` and are wrapped in a [`ToolEnvelope`].

pub mod dispatcher;
pub mod envelope;
pub mod params;
pub mod request;

pub use dispatcher::Dispatcher;
pub use envelope::{error_json, ToolEnvelope, ToolError};
pub use params::*;
pub use request::{ToolRequest, TOOL_NAMES};
