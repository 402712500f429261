//! Google Sheets MCP Server library.
//!
//! Provides the [`server::SheetsMcpServer`] MCP server handler, the tool
//! dispatcher and tool parameter/response types. Used by the `sheets-mcp`
//! binary and available for integration testing.

pub mod server;
pub mod tools;
