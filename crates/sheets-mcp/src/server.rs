//! MCP ServerHandler implementation for Google Sheets.
//!
//! **Discovery**
//! - `list_spreadsheets`: List all spreadsheets visible to the service account
//! - `open_spreadsheet`: Open a spreadsheet by title or URL
//! - `list_worksheets`: List the worksheets of a spreadsheet
//!
//! **Read**
//! - `read_worksheet`: Read a worksheet or an A1 range of it
//!
//! **Write**
//! - `update_cell`: Write one cell
//! - `update_range`: Write a 2D block of values
//! - `append_row`: Append a row after the last non-empty row
//! - `create_spreadsheet`: Create a new spreadsheet
//! - `create_worksheet`: Add a worksheet to a spreadsheet

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::tool::schema_for_type;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, JsonObject, ProtocolVersion, ServerCapabilities,
    ServerInfo,
};
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use sheets_client::SheetsBackend;

use crate::tools::*;

/// Google Sheets MCP server handler.
#[derive(Debug, Clone)]
pub struct SheetsMcpServer {
    tool_router: ToolRouter<Self>,
    dispatcher: Dispatcher,
}

impl SheetsMcpServer {
    /// Create a server backed by the given spreadsheet backend.
    pub fn new(backend: Arc<dyn SheetsBackend>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            dispatcher: Dispatcher::new(backend),
        }
    }

    /// The dispatcher shared by every tool method.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Run a tool from its raw arguments.
    ///
    /// Arguments stay untyped until [`ToolRequest::from_call`] so that a
    /// missing or mistyped field comes back as an `invalid_argument` envelope
    /// instead of a protocol error. Error envelopes set `isError`.
    async fn run(&self, tool: &str, arguments: JsonObject) -> Result<CallToolResult, McpError> {
        let envelope = self.dispatcher.call(tool, Some(arguments)).await;
        let content = vec![Content::text(envelope.to_json())];
        if envelope.is_error() {
            Ok(CallToolResult::error(content))
        } else {
            Ok(CallToolResult::success(content))
        }
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for SheetsMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "sheets-mcp".to_string(),
                title: Some("Google Sheets MCP Server".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: Some(
                    "MCP server for reading and writing Google Sheets through a service account"
                        .to_string(),
                ),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Google Sheets access through a service account. Only spreadsheets shared with \
                 the service account are visible.\n\
                 Workflow: list_spreadsheets → open_spreadsheet (title or URL) → list_worksheets \
                 → read_worksheet / update_cell / update_range / append_row.\n\
                 Ranges and cells use A1 notation without a sheet prefix (e.g. 'A1', 'A1:D10'); \
                 the worksheet is always passed separately as worksheet_name.\n\
                 Creation: create_spreadsheet, create_worksheet (rows=100, cols=26 by default).\n\
                 Every tool returns JSON with status 'ok' or 'error'. Errors carry a kind \
                 (invalid_argument, not_found, permission_denied, backend_unavailable, internal) \
                 and a retryable hint; the server never retries on its own."
                    .to_string(),
            ),
        }
    }
}

#[tool_router(router = tool_router)]
impl SheetsMcpServer {
    #[tool(
        name = "list_spreadsheets",
        description = "List all spreadsheets accessible to the service account. Returns id, title and url for each.",
        input_schema = schema_for_type::<ListSpreadsheetsParams>()
    )]
    pub async fn list_spreadsheets(
        &self,
        Parameters(args): Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        self.run("list_spreadsheets", args).await
    }

    #[tool(
        name = "open_spreadsheet",
        description = "Open a spreadsheet by its title or URL. Returns id, title, url and sheet_count.",
        input_schema = schema_for_type::<OpenSpreadsheetParams>()
    )]
    pub async fn open_spreadsheet(
        &self,
        Parameters(args): Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        self.run("open_spreadsheet", args).await
    }

    #[tool(
        name = "list_worksheets",
        description = "List all worksheets in a spreadsheet with their ids and dimensions.",
        input_schema = schema_for_type::<ListWorksheetsParams>()
    )]
    pub async fn list_worksheets(
        &self,
        Parameters(args): Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        self.run("list_worksheets", args).await
    }

    #[tool(
        name = "read_worksheet",
        description = "Read data from a worksheet. Optionally restrict to an A1 range such as 'A1:D10'. Rows are padded to equal length.",
        input_schema = schema_for_type::<ReadWorksheetParams>()
    )]
    pub async fn read_worksheet(
        &self,
        Parameters(args): Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        self.run("read_worksheet", args).await
    }

    #[tool(
        name = "update_cell",
        description = "Update a single cell (e.g. 'B3') with a string, number or boolean value.",
        input_schema = schema_for_type::<UpdateCellParams>()
    )]
    pub async fn update_cell(
        &self,
        Parameters(args): Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        self.run("update_cell", args).await
    }

    #[tool(
        name = "update_range",
        description = "Write a 2D array of values starting at the top-left of an A1 range. Values are not reshaped to fit the range.",
        input_schema = schema_for_type::<UpdateRangeParams>()
    )]
    pub async fn update_range(
        &self,
        Parameters(args): Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        self.run("update_range", args).await
    }

    #[tool(
        name = "append_row",
        description = "Append a row of values after the last non-empty row of a worksheet. Not idempotent: each call adds a row.",
        input_schema = schema_for_type::<AppendRowParams>()
    )]
    pub async fn append_row(
        &self,
        Parameters(args): Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        self.run("append_row", args).await
    }

    #[tool(
        name = "create_spreadsheet",
        description = "Create a new spreadsheet owned by the service account.",
        input_schema = schema_for_type::<CreateSpreadsheetParams>()
    )]
    pub async fn create_spreadsheet(
        &self,
        Parameters(args): Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        self.run("create_spreadsheet", args).await
    }

    #[tool(
        name = "create_worksheet",
        description = "Add a worksheet to a spreadsheet. rows and cols default to 100 and 26 and must be positive.",
        input_schema = schema_for_type::<CreateWorksheetParams>()
    )]
    pub async fn create_worksheet(
        &self,
        Parameters(args): Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        self.run("create_worksheet", args).await
    }
}
