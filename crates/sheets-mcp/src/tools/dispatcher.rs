//! Tool dispatcher: validates a [`ToolRequest`] and runs it against the backend.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use sheets_client::models::rectangular;
use sheets_client::{CellRef, CellValue, RangeRef, SheetsBackend, SpreadsheetIdentifier};
use tracing::{debug, info, warn};

use super::envelope::{ToolEnvelope, ToolError};
use super::params::{
    AppendRowParams, AppendRowResponse, CreateSpreadsheetParams, CreateWorksheetParams,
    ListWorksheetsParams, OpenSpreadsheetParams, ReadWorksheetParams, ReadWorksheetResponse,
    SpreadsheetReference, UpdateCellParams, UpdateCellResponse, UpdateRangeParams,
    UpdateRangeResponse,
};
use super::request::ToolRequest;

/// Shared entry point for MCP tool methods and the `call` CLI.
///
/// Holds no per-call state; clones share the same backend.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    backend: Arc<dyn SheetsBackend>,
}

impl Dispatcher {
    pub fn new(backend: Arc<dyn SheetsBackend>) -> Self {
        Self { backend }
    }

    /// Parse an untyped call and dispatch it.
    pub async fn call(&self, tool: &str, arguments: Option<Map<String, Value>>) -> ToolEnvelope {
        match ToolRequest::from_call(tool, arguments) {
            Ok(request) => self.dispatch(request).await,
            Err(err) => {
                warn!(tool, error = %err, "Rejected tool call");
                ToolEnvelope::error(tool, err)
            }
        }
    }

    /// Run a typed request and wrap the outcome in an envelope.
    pub async fn dispatch(&self, request: ToolRequest) -> ToolEnvelope {
        let tool = request.name();
        let write = request.is_write();
        debug!(tool, "Dispatching tool call");

        match self.execute(request).await {
            Ok(result) => {
                if write {
                    info!(tool, "Tool call modified spreadsheet");
                }
                ToolEnvelope::ok(tool, result)
            }
            Err(err) => {
                warn!(tool, kind = %err.kind, error = %err.message, "Tool call failed");
                ToolEnvelope::error(tool, err)
            }
        }
    }

    async fn execute(&self, request: ToolRequest) -> Result<Value, ToolError> {
        match request {
            ToolRequest::ListSpreadsheets(_) => self.list_spreadsheets().await,
            ToolRequest::OpenSpreadsheet(p) => self.open_spreadsheet(p).await,
            ToolRequest::ListWorksheets(p) => self.list_worksheets(p).await,
            ToolRequest::ReadWorksheet(p) => self.read_worksheet(p).await,
            ToolRequest::UpdateCell(p) => self.update_cell(p).await,
            ToolRequest::UpdateRange(p) => self.update_range(p).await,
            ToolRequest::AppendRow(p) => self.append_row(p).await,
            ToolRequest::CreateSpreadsheet(p) => self.create_spreadsheet(p).await,
            ToolRequest::CreateWorksheet(p) => self.create_worksheet(p).await,
        }
    }

    async fn list_spreadsheets(&self) -> Result<Value, ToolError> {
        let spreadsheets = self.backend.list_spreadsheets().await?;
        debug!(count = spreadsheets.len(), "Listed spreadsheets");
        to_result(spreadsheets)
    }

    async fn open_spreadsheet(&self, params: OpenSpreadsheetParams) -> Result<Value, ToolError> {
        require("identifier", &params.identifier)?;
        let spreadsheet = match SpreadsheetIdentifier::classify(&params.identifier) {
            SpreadsheetIdentifier::Url(key) => self.backend.open_by_key(&key).await?,
            SpreadsheetIdentifier::Title(title) => self.backend.open_by_title(&title).await?,
        };
        to_result(SpreadsheetReference::from(spreadsheet))
    }

    async fn list_worksheets(&self, params: ListWorksheetsParams) -> Result<Value, ToolError> {
        require("spreadsheet_id", &params.spreadsheet_id)?;
        let spreadsheet = self.backend.open_by_key(&params.spreadsheet_id).await?;
        to_result(spreadsheet.worksheets)
    }

    async fn read_worksheet(&self, params: ReadWorksheetParams) -> Result<Value, ToolError> {
        require("spreadsheet_id", &params.spreadsheet_id)?;
        require("worksheet_name", &params.worksheet_name)?;
        let range = params.range.as_deref().map(RangeRef::parse).transpose()?;

        let values = self
            .backend
            .read_values(&params.spreadsheet_id, &params.worksheet_name, range.as_ref())
            .await?;

        to_result(ReadWorksheetResponse {
            spreadsheet_id: params.spreadsheet_id,
            worksheet_name: params.worksheet_name,
            range: range.map(|r| r.to_string()),
            values: rectangular(values),
        })
    }

    async fn update_cell(&self, params: UpdateCellParams) -> Result<Value, ToolError> {
        require("spreadsheet_id", &params.spreadsheet_id)?;
        require("worksheet_name", &params.worksheet_name)?;
        let cell = CellRef::parse(&params.cell)?;
        if matches!(params.value, CellValue::Empty) {
            return Err(ToolError::invalid_argument(
                "'value' must be a string, number or boolean",
            ));
        }

        let summary = self
            .backend
            .update_values(
                &params.spreadsheet_id,
                &params.worksheet_name,
                &RangeRef::from(cell),
                &vec![vec![params.value.clone()]],
            )
            .await?;

        to_result(UpdateCellResponse {
            message: format!("Cell {cell} updated successfully"),
            spreadsheet_id: params.spreadsheet_id,
            worksheet_name: params.worksheet_name,
            cell: cell.to_string(),
            value: params.value,
            updated_cells: summary.updated_cells,
        })
    }

    async fn update_range(&self, params: UpdateRangeParams) -> Result<Value, ToolError> {
        require("spreadsheet_id", &params.spreadsheet_id)?;
        require("worksheet_name", &params.worksheet_name)?;
        let range = RangeRef::parse(&params.range)?;
        if params.values.is_empty() {
            return Err(ToolError::invalid_argument(
                "'values' must contain at least one row",
            ));
        }

        let summary = self
            .backend
            .update_values(
                &params.spreadsheet_id,
                &params.worksheet_name,
                &range,
                &params.values,
            )
            .await?;

        to_result(UpdateRangeResponse {
            message: format!("Range {range} updated successfully"),
            spreadsheet_id: params.spreadsheet_id,
            worksheet_name: params.worksheet_name,
            range: range.to_string(),
            updated_range: summary.updated_range,
            updated_rows: summary.updated_rows,
            updated_columns: summary.updated_columns,
            updated_cells: summary.updated_cells,
        })
    }

    async fn append_row(&self, params: AppendRowParams) -> Result<Value, ToolError> {
        require("spreadsheet_id", &params.spreadsheet_id)?;
        require("worksheet_name", &params.worksheet_name)?;
        if params.values.is_empty() {
            return Err(ToolError::invalid_argument("'values' must not be empty"));
        }

        let summary = self
            .backend
            .append_row(&params.spreadsheet_id, &params.worksheet_name, &params.values)
            .await?;

        let message = match summary.row_index {
            Some(row) => format!("Row appended at row {row}"),
            None => "Row appended successfully".to_string(),
        };
        to_result(AppendRowResponse {
            spreadsheet_id: params.spreadsheet_id,
            worksheet_name: params.worksheet_name,
            updated_range: summary.updated_range,
            row_index: summary.row_index,
            message,
        })
    }

    async fn create_spreadsheet(
        &self,
        params: CreateSpreadsheetParams,
    ) -> Result<Value, ToolError> {
        require("title", &params.title)?;
        let spreadsheet = self.backend.create_spreadsheet(&params.title).await?;
        info!(spreadsheet_id = %spreadsheet.id, title = %spreadsheet.title, "Created spreadsheet");
        to_result(SpreadsheetReference::from(spreadsheet))
    }

    async fn create_worksheet(&self, params: CreateWorksheetParams) -> Result<Value, ToolError> {
        require("spreadsheet_id", &params.spreadsheet_id)?;
        require("title", &params.title)?;
        if params.rows == 0 || params.cols == 0 {
            return Err(ToolError::invalid_argument(format!(
                "'rows' and 'cols' must be positive (got rows={}, cols={})",
                params.rows, params.cols
            )));
        }

        let worksheet = self
            .backend
            .create_worksheet(&params.spreadsheet_id, &params.title, params.rows, params.cols)
            .await?;
        info!(
            spreadsheet_id = %worksheet.spreadsheet_id,
            worksheet = %worksheet.name,
            "Created worksheet"
        );
        to_result(worksheet)
    }
}

fn require(field: &str, value: &str) -> Result<(), ToolError> {
    if value.trim().is_empty() {
        return Err(ToolError::invalid_argument(format!(
            "'{field}' is required and must not be empty"
        )));
    }
    Ok(())
}

fn to_result<T: Serialize>(value: T) -> Result<Value, ToolError> {
    serde_json::to_value(value)
        .map_err(|e| ToolError::internal(format!("Failed to serialize result: {e}")))
}
