//! The spreadsheet backend seam.

use async_trait::async_trait;

use crate::a1::RangeRef;
use crate::error::ClientResult;
use crate::models::{
    AppendSummary, CellGrid, CellValue, Spreadsheet, SpreadsheetSummary, UpdateSummary, Worksheet,
};

/// Remote primitives the tool dispatcher is built on.
///
/// Implementations are shared across concurrent tool calls and must not keep
/// per-call mutable state. Nothing returned here may be cached by callers:
/// each reference reflects the remote object at the time of the call.
#[async_trait]
pub trait SheetsBackend: Send + Sync + std::fmt::Debug {
    /// All spreadsheets visible to the credentials.
    async fn list_spreadsheets(&self) -> ClientResult<Vec<SpreadsheetSummary>>;

    /// Open by spreadsheet key (the id in the URL).
    async fn open_by_key(&self, key: &str) -> ClientResult<Spreadsheet>;

    /// Open the first spreadsheet whose title matches exactly.
    async fn open_by_title(&self, title: &str) -> ClientResult<Spreadsheet>;

    /// Read a range, or the whole used area when `range` is `None`.
    ///
    /// Rows may be ragged; trailing blanks are typically omitted.
    async fn read_values(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
        range: Option<&RangeRef>,
    ) -> ClientResult<CellGrid>;

    /// Write `values` into `range`. Shape mismatches are the backend's call.
    async fn update_values(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
        range: &RangeRef,
        values: &CellGrid,
    ) -> ClientResult<UpdateSummary>;

    /// Append one row after the last non-empty row of the worksheet.
    async fn append_row(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
        values: &[CellValue],
    ) -> ClientResult<AppendSummary>;

    async fn create_spreadsheet(&self, title: &str) -> ClientResult<Spreadsheet>;

    async fn create_worksheet(
        &self,
        spreadsheet_id: &str,
        title: &str,
        rows: u32,
        cols: u32,
    ) -> ClientResult<Worksheet>;
}
