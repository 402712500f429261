//! Test harness for live MCP integration tests.
//!
//! Builds a `GoogleSheetsClient` from the environment and connects an MCP
//! server/client pair via in-memory duplex transport.

#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use rmcp::model::{CallToolRequestParams, ClientInfo};
use rmcp::service::{RoleClient, RunningService};
use rmcp::{ClientHandler, ServiceExt};
use serde_json::Value;
use tokio::task::JoinHandle;

use sheets_core::{GoogleSheetsClient, SheetsConfig};
use sheets_mcp::server::SheetsMcpServer;

/// Spreadsheet the live tests write into.
pub const LIVE_SPREADSHEET_ENV: &str = "SHEETS_LIVE_SPREADSHEET_ID";

#[derive(Debug, Clone, Default)]
pub(super) struct TestClient;

impl ClientHandler for TestClient {
    fn get_info(&self) -> ClientInfo {
        ClientInfo::default()
    }
}

/// Live MCP test harness.
pub struct LiveTestHarness {
    pub mcp_client: RunningService<RoleClient, TestClient>,
    pub spreadsheet_id: String,
    server_handle: JoinHandle<Result<()>>,
}

impl LiveTestHarness {
    /// Set up: load `.env`, build the Google backend, spin up the MCP server.
    pub async fn setup() -> Result<Self> {
        dotenvy::dotenv().ok();
        let _ = tracing_subscriber::fmt()
            .with_env_filter("sheets_client=debug,sheets_mcp=debug")
            .with_test_writer()
            .try_init();

        let spreadsheet_id = std::env::var(LIVE_SPREADSHEET_ENV)
            .map_err(|_| anyhow::anyhow!("{LIVE_SPREADSHEET_ENV} must be set for live tests"))?;
        let client = GoogleSheetsClient::from_config(SheetsConfig::from_env()?)?;
        tracing::info!(client_email = client.client_email(), "Live harness connected");

        let server = SheetsMcpServer::new(Arc::new(client));
        let (server_transport, client_transport) = tokio::io::duplex(65536);

        let server_handle = tokio::spawn(async move {
            let service = server.serve(server_transport).await?;
            service.waiting().await?;
            anyhow::Ok(())
        });

        let mcp_client = TestClient.serve(client_transport).await?;

        Ok(Self {
            mcp_client,
            spreadsheet_id,
            server_handle,
        })
    }

    /// Call an MCP tool and parse the text response as JSON.
    pub async fn call_tool(&self, name: &str, args: Value) -> Result<Value> {
        let result = self
            .mcp_client
            .call_tool(CallToolRequestParams {
                meta: None,
                name: name.to_string().into(),
                arguments: args.as_object().cloned(),
                task: None,
            })
            .await?;

        let text = result
            .content
            .first()
            .and_then(|c| c.raw.as_text())
            .map(|t| t.text.clone())
            .ok_or_else(|| anyhow::anyhow!("No text content in tool response"))?;

        let parsed: Value = serde_json::from_str(&text)?;
        Ok(parsed)
    }

    /// Call a tool and return its `result`, failing on an error envelope.
    pub async fn call_ok(&self, name: &str, args: Value) -> Result<Value> {
        let envelope = self.call_tool(name, args).await?;
        if envelope["status"] != "ok" {
            anyhow::bail!("{name} failed: {envelope}");
        }
        Ok(envelope["result"].clone())
    }

    /// Create a uniquely named scratch worksheet in the live spreadsheet.
    ///
    /// There is no delete tool, so scratch worksheets accumulate; clear them
    /// out of the live spreadsheet by hand now and then.
    pub async fn scratch_worksheet(&self, prefix: &str, rows: u32, cols: u32) -> Result<Value> {
        let title = format!("{prefix}-{}", chrono::Utc::now().format("%Y%m%d%H%M%S%3f"));
        self.call_ok(
            "create_worksheet",
            serde_json::json!({
                "spreadsheet_id": self.spreadsheet_id,
                "title": title,
                "rows": rows,
                "cols": cols,
            }),
        )
        .await
    }

    /// Tear down: cancel MCP client and join server handle.
    pub async fn teardown(self) -> Result<()> {
        self.mcp_client.cancel().await?;
        self.server_handle.await??;
        Ok(())
    }
}
