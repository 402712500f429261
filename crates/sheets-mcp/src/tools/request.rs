//! Typed tool requests.
//!
//! Every tool call becomes one [`ToolRequest`] variant before it reaches the
//! dispatcher. Both the MCP tool methods and the `call` CLI path build it with
//! [`ToolRequest::from_call`], so argument errors surface as envelopes.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::envelope::ToolError;
use super::params::{
    AppendRowParams, CreateSpreadsheetParams, CreateWorksheetParams, ListSpreadsheetsParams,
    ListWorksheetsParams, OpenSpreadsheetParams, ReadWorksheetParams, UpdateCellParams,
    UpdateRangeParams,
};

/// Names of every tool exposed by the server.
pub const TOOL_NAMES: [&str; 9] = [
    "list_spreadsheets",
    "open_spreadsheet",
    "list_worksheets",
    "read_worksheet",
    "update_cell",
    "update_range",
    "append_row",
    "create_spreadsheet",
    "create_worksheet",
];

#[derive(Debug, Clone)]
pub enum ToolRequest {
    ListSpreadsheets(ListSpreadsheetsParams),
    OpenSpreadsheet(OpenSpreadsheetParams),
    ListWorksheets(ListWorksheetsParams),
    ReadWorksheet(ReadWorksheetParams),
    UpdateCell(UpdateCellParams),
    UpdateRange(UpdateRangeParams),
    AppendRow(AppendRowParams),
    CreateSpreadsheet(CreateSpreadsheetParams),
    CreateWorksheet(CreateWorksheetParams),
}

impl ToolRequest {
    /// Build a request from a tool name and an untyped argument map.
    ///
    /// Unknown tools, missing required fields and wrongly typed values all
    /// fail with InvalidArgument.
    pub fn from_call(name: &str, arguments: Option<Map<String, Value>>) -> Result<Self, ToolError> {
        let arguments = Value::Object(arguments.unwrap_or_default());
        let request = match name {
            "list_spreadsheets" => Self::ListSpreadsheets(parse(name, arguments)?),
            "open_spreadsheet" => Self::OpenSpreadsheet(parse(name, arguments)?),
            "list_worksheets" => Self::ListWorksheets(parse(name, arguments)?),
            "read_worksheet" => Self::ReadWorksheet(parse(name, arguments)?),
            "update_cell" => Self::UpdateCell(parse(name, arguments)?),
            "update_range" => Self::UpdateRange(parse(name, arguments)?),
            "append_row" => Self::AppendRow(parse(name, arguments)?),
            "create_spreadsheet" => Self::CreateSpreadsheet(parse(name, arguments)?),
            "create_worksheet" => Self::CreateWorksheet(parse(name, arguments)?),
            other => {
                return Err(ToolError::invalid_argument(format!(
                    "Unknown tool '{other}'. Available tools: {}",
                    TOOL_NAMES.join(", ")
                )))
            }
        };
        Ok(request)
    }

    /// The tool name this request was made for.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ListSpreadsheets(_) => "list_spreadsheets",
            Self::OpenSpreadsheet(_) => "open_spreadsheet",
            Self::ListWorksheets(_) => "list_worksheets",
            Self::ReadWorksheet(_) => "read_worksheet",
            Self::UpdateCell(_) => "update_cell",
            Self::UpdateRange(_) => "update_range",
            Self::AppendRow(_) => "append_row",
            Self::CreateSpreadsheet(_) => "create_spreadsheet",
            Self::CreateWorksheet(_) => "create_worksheet",
        }
    }

    /// Whether the request changes remote state.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Self::UpdateCell(_)
                | Self::UpdateRange(_)
                | Self::AppendRow(_)
                | Self::CreateSpreadsheet(_)
                | Self::CreateWorksheet(_)
        )
    }
}

fn parse<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T, ToolError> {
    serde_json::from_value(arguments)
        .map_err(|e| ToolError::invalid_argument(format!("Invalid arguments for {tool}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheets_client::ErrorKind;

    fn args(value: Value) -> Option<Map<String, Value>> {
        value.as_object().cloned()
    }

    #[test]
    fn test_every_tool_name_round_trips() {
        let minimal = serde_json::json!({
            "identifier": "x",
            "spreadsheet_id": "x",
            "worksheet_name": "x",
            "cell": "A1",
            "value": 1,
            "range": "A1",
            "values": [],
            "title": "x",
        });
        for name in TOOL_NAMES {
            let request = ToolRequest::from_call(name, args(minimal.clone())).unwrap();
            assert_eq!(request.name(), name);
        }
    }

    #[test]
    fn test_no_arguments_for_list_spreadsheets() {
        let request = ToolRequest::from_call("list_spreadsheets", None).unwrap();
        assert!(matches!(request, ToolRequest::ListSpreadsheets(_)));
        assert!(!request.is_write());
    }

    #[test]
    fn test_missing_required_argument() {
        let err = ToolRequest::from_call(
            "read_worksheet",
            args(serde_json::json!({"spreadsheet_id": "abc"})),
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
        assert!(err.message.contains("worksheet_name"));
    }

    #[test]
    fn test_wrong_argument_type() {
        let err = ToolRequest::from_call(
            "create_worksheet",
            args(serde_json::json!({"spreadsheet_id": "abc", "title": "t", "rows": "ten"})),
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_negative_dimension_is_rejected_at_parse() {
        let err = ToolRequest::from_call(
            "create_worksheet",
            args(serde_json::json!({"spreadsheet_id": "abc", "title": "t", "cols": -1})),
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_create_worksheet_defaults() {
        let request = ToolRequest::from_call(
            "create_worksheet",
            args(serde_json::json!({"spreadsheet_id": "abc", "title": "t"})),
        )
        .unwrap();
        let ToolRequest::CreateWorksheet(params) = request else {
            panic!("expected create_worksheet");
        };
        assert_eq!(params.rows, 100);
        assert_eq!(params.cols, 26);
    }

    #[test]
    fn test_unknown_tool() {
        let err = ToolRequest::from_call("delete_spreadsheet", None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
        assert!(err.message.contains("list_spreadsheets"));
    }
}
