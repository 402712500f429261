//! Google Sheets MCP Server
//!
//! Model Context Protocol server exposing Google Sheets read/write tools to
//! LLM agents, authenticated as a service account.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rmcp::ServiceExt;
use sheets_client::{GoogleSheetsClient, SheetsConfig, ValueInputOption, ValueRenderOption};
use tracing_subscriber::EnvFilter;

use sheets_mcp::server::SheetsMcpServer;

#[derive(Debug, Parser)]
#[command(name = "sheets-mcp", version, about = "MCP server for Google Sheets")]
struct Cli {
    /// Service-account JSON key file
    #[arg(long, env = "GOOGLE_SHEETS_CREDENTIALS_FILE")]
    credentials_file: PathBuf,

    /// Per-request HTTP timeout in seconds
    #[arg(long, env = "SHEETS_MCP_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    request_timeout_secs: u64,

    /// How written values are interpreted (raw | user-entered)
    #[arg(long, env = "SHEETS_MCP_VALUE_INPUT_OPTION", default_value = "raw")]
    value_input_option: ValueInputOption,

    /// How read values are rendered (formatted | unformatted | formula)
    #[arg(long, env = "SHEETS_MCP_VALUE_RENDER_OPTION", default_value = "formatted")]
    value_render_option: ValueRenderOption,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve MCP over stdio (default)
    Serve,
    /// Run a single tool and print its result envelope
    Call {
        /// Tool name, e.g. list_spreadsheets
        tool: String,
        /// Tool arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
    },
}

impl Cli {
    fn sheets_config(&self) -> anyhow::Result<SheetsConfig> {
        if self.request_timeout_secs == 0 {
            anyhow::bail!("--request-timeout-secs must be positive");
        }
        Ok(SheetsConfig::builder()
            .credentials_file(self.credentials_file.clone())
            .request_timeout(Duration::from_secs(self.request_timeout_secs))
            .value_input_option(self.value_input_option)
            .value_render_option(self.value_render_option)
            .build())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("sheets_mcp=info".parse()?)
                .add_directive("sheets_client=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.sheets_config()?;
    let client = GoogleSheetsClient::from_config(config).with_context(|| {
        format!(
            "failed to load service-account credentials from {}",
            cli.credentials_file.display()
        )
    })?;
    let server = SheetsMcpServer::new(Arc::new(client));

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            tracing::info!("sheets-mcp starting (stdio transport)");
            let transport = rmcp::transport::io::stdio();
            let service = server.serve(transport).await?;
            service.waiting().await?;
        }
        Command::Call { tool, args } => {
            let arguments: serde_json::Value =
                serde_json::from_str(&args).context("--args must be valid JSON")?;
            let serde_json::Value::Object(arguments) = arguments else {
                anyhow::bail!("--args must be a JSON object");
            };
            let envelope = server.dispatcher().call(&tool, Some(arguments)).await;
            println!("{}", envelope.to_json());
            if envelope.is_error() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
