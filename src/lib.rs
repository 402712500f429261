//! Google Sheets tools for LLM agents.
//!
//! The workspace is split into:
//! - `sheets-client`: service-account auth, A1 notation and the spreadsheet backend
//! - `sheets-mcp`: the MCP server, tool dispatcher and `sheets-mcp` binary
//!
//! This root crate re-exports the client so downstream users can depend on a
//! single package. It also hosts the live integration tests (`test-live`).

pub use sheets_client::*;
