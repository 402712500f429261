//! Parameter and response structs for all MCP tools.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sheets_client::{CellValue, Spreadsheet};

pub const DEFAULT_WORKSHEET_ROWS: u32 = 100;
pub const DEFAULT_WORKSHEET_COLS: u32 = 26;

// ── list_spreadsheets ──

/// Parameters for the `list_spreadsheets` tool (none).
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListSpreadsheetsParams {}

// ── open_spreadsheet ──

/// Parameters for the `open_spreadsheet` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct OpenSpreadsheetParams {
    /// Spreadsheet title or URL.
    #[schemars(description = "The title or URL of the spreadsheet to open")]
    pub identifier: String,
}

/// Response for `open_spreadsheet` and `create_spreadsheet`.
#[derive(Debug, Serialize)]
pub struct SpreadsheetReference {
    pub id: String,
    pub title: String,
    pub url: String,
    pub sheet_count: usize,
}

impl From<Spreadsheet> for SpreadsheetReference {
    fn from(sheet: Spreadsheet) -> Self {
        Self {
            sheet_count: sheet.worksheets.len(),
            id: sheet.id,
            title: sheet.title,
            url: sheet.url,
        }
    }
}

// ── list_worksheets ──

/// Parameters for the `list_worksheets` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListWorksheetsParams {
    #[schemars(description = "The ID of the spreadsheet")]
    pub spreadsheet_id: String,
}

// ── read_worksheet ──

/// Parameters for the `read_worksheet` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ReadWorksheetParams {
    #[schemars(description = "The ID of the spreadsheet")]
    pub spreadsheet_id: String,
    #[schemars(description = "The name of the worksheet to read")]
    pub worksheet_name: String,
    /// A1 range; the whole used area when omitted.
    #[schemars(
        description = "The range to read (e.g., 'A1:D10'). Optional, defaults to entire worksheet."
    )]
    #[serde(default)]
    pub range: Option<String>,
}

/// Response for the `read_worksheet` tool.
#[derive(Debug, Serialize)]
pub struct ReadWorksheetResponse {
    pub spreadsheet_id: String,
    pub worksheet_name: String,
    pub range: Option<String>,
    pub values: Vec<Vec<CellValue>>,
}

// ── update_cell ──

/// Parameters for the `update_cell` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UpdateCellParams {
    #[schemars(description = "The ID of the spreadsheet")]
    pub spreadsheet_id: String,
    #[schemars(description = "The name of the worksheet")]
    pub worksheet_name: String,
    #[schemars(description = "The cell reference (e.g., 'A1')")]
    pub cell: String,
    #[schemars(description = "The value to write to the cell (string, number or boolean)")]
    pub value: CellValue,
}

/// Response for the `update_cell` tool.
#[derive(Debug, Serialize)]
pub struct UpdateCellResponse {
    pub spreadsheet_id: String,
    pub worksheet_name: String,
    pub cell: String,
    pub value: CellValue,
    pub updated_cells: u32,
    pub message: String,
}

// ── update_range ──

/// Parameters for the `update_range` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UpdateRangeParams {
    #[schemars(description = "The ID of the spreadsheet")]
    pub spreadsheet_id: String,
    #[schemars(description = "The name of the worksheet")]
    pub worksheet_name: String,
    #[schemars(description = "The range to update (e.g., 'A1:B2')")]
    pub range: String,
    #[schemars(description = "The values to write to the range (2D array of rows)")]
    pub values: Vec<Vec<CellValue>>,
}

/// Response for the `update_range` tool.
#[derive(Debug, Serialize)]
pub struct UpdateRangeResponse {
    pub spreadsheet_id: String,
    pub worksheet_name: String,
    pub range: String,
    pub updated_range: String,
    pub updated_rows: u32,
    pub updated_columns: u32,
    pub updated_cells: u32,
    pub message: String,
}

// ── append_row ──

/// Parameters for the `append_row` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AppendRowParams {
    #[schemars(description = "The ID of the spreadsheet")]
    pub spreadsheet_id: String,
    #[schemars(description = "The name of the worksheet")]
    pub worksheet_name: String,
    #[schemars(description = "The values to append as a new row")]
    pub values: Vec<CellValue>,
}

/// Response for the `append_row` tool.
#[derive(Debug, Serialize)]
pub struct AppendRowResponse {
    pub spreadsheet_id: String,
    pub worksheet_name: String,
    pub updated_range: Option<String>,
    /// 1-based row written, when the backend reports it
    pub row_index: Option<u32>,
    pub message: String,
}

// ── create_spreadsheet ──

/// Parameters for the `create_spreadsheet` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateSpreadsheetParams {
    #[schemars(description = "The title for the new spreadsheet")]
    pub title: String,
}

// ── create_worksheet ──

/// Parameters for the `create_worksheet` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateWorksheetParams {
    #[schemars(description = "The ID of the spreadsheet")]
    pub spreadsheet_id: String,
    #[schemars(description = "The title for the new worksheet")]
    pub title: String,
    #[schemars(description = "Number of rows (default: 100)")]
    #[serde(default = "default_rows")]
    pub rows: u32,
    #[schemars(description = "Number of columns (default: 26)")]
    #[serde(default = "default_cols")]
    pub cols: u32,
}

fn default_rows() -> u32 {
    DEFAULT_WORKSHEET_ROWS
}

fn default_cols() -> u32 {
    DEFAULT_WORKSHEET_COLS
}
