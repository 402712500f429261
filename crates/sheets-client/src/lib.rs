//! Google Sheets client library.
//!
//! Provides the [`SheetsBackend`] seam used by the MCP tool layer, a REST
//! implementation authenticated as a service account ([`GoogleSheetsClient`]),
//! and the A1-notation and identifier parsing that runs before any backend
//! call is made.

pub mod a1;
pub mod auth;
pub mod backend;
pub mod config;
pub mod error;
pub mod google;
pub mod identifier;
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod models;
#[cfg(test)]
mod stub_server;

pub use a1::{CellRef, RangeRef};
pub use backend::SheetsBackend;
pub use config::{SheetsConfig, ValueInputOption, ValueRenderOption};
pub use error::{ClientError, ClientResult, ErrorKind};
pub use google::GoogleSheetsClient;
pub use identifier::SpreadsheetIdentifier;
#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryBackend;
pub use models::{
    AppendSummary, CellGrid, CellValue, Spreadsheet, SpreadsheetSummary, UpdateSummary, Worksheet,
};
