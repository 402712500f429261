//! Google Sheets v4 / Drive v3 REST backend.
//!
//! Listing and title lookup go through Drive; everything else is the Sheets
//! API. Errors are returned as [`ClientError`] and classified by status code;
//! nothing is retried here.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::a1::{self, RangeRef};
use crate::auth::{ServiceAccountKey, TokenProvider};
use crate::backend::SheetsBackend;
use crate::config::SheetsConfig;
use crate::error::{ClientError, ClientResult};
use crate::models::{
    spreadsheet_url, AppendSummary, CellGrid, CellValue, Spreadsheet, SpreadsheetSummary,
    UpdateSummary, Worksheet,
};

const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";
const SPREADSHEET_FIELDS: &str = "spreadsheetId,properties.title,sheets.properties";
const DRIVE_PAGE_SIZE: &str = "1000";

// ── Wire types ──

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpreadsheetResource {
    spreadsheet_id: String,
    properties: SpreadsheetProperties,
    #[serde(default)]
    sheets: Vec<SheetResource>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct SheetResource {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    #[serde(default)]
    sheet_id: i64,
    title: String,
    #[serde(default)]
    grid_properties: GridProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridProperties {
    #[serde(default)]
    row_count: u32,
    #[serde(default)]
    column_count: u32,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateValuesResponse {
    updated_range: Option<String>,
    #[serde(default)]
    updated_rows: u32,
    #[serde(default)]
    updated_columns: u32,
    #[serde(default)]
    updated_cells: u32,
}

#[derive(Debug, Deserialize)]
struct AppendValuesResponse {
    updates: Option<UpdateValuesResponse>,
}

#[derive(Debug, Deserialize)]
struct BatchUpdateResponse {
    #[serde(default)]
    replies: Vec<BatchReply>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchReply {
    add_sheet: Option<AddSheetReply>,
}

#[derive(Debug, Deserialize)]
struct AddSheetReply {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: GoogleErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorDetail {
    message: String,
    status: Option<String>,
}

impl SheetProperties {
    fn into_worksheet(self, spreadsheet_id: &str) -> Worksheet {
        Worksheet {
            spreadsheet_id: spreadsheet_id.to_string(),
            id: self.sheet_id,
            name: self.title,
            row_count: self.grid_properties.row_count,
            col_count: self.grid_properties.column_count,
        }
    }
}

impl From<SpreadsheetResource> for Spreadsheet {
    fn from(resource: SpreadsheetResource) -> Self {
        let id = resource.spreadsheet_id;
        let worksheets = resource
            .sheets
            .into_iter()
            .map(|sheet| sheet.properties.into_worksheet(&id))
            .collect();
        Spreadsheet {
            url: spreadsheet_url(&id),
            title: resource.properties.title,
            worksheets,
            id,
        }
    }
}

/// Turn a non-2xx response body into a [`ClientError`].
fn api_error(status: u16, body: &str) -> ClientError {
    let message = match serde_json::from_str::<GoogleErrorBody>(body) {
        Ok(parsed) => match parsed.error.status {
            Some(code) => format!("{} ({code})", parsed.error.message),
            None => parsed.error.message,
        },
        Err(_) if body.trim().is_empty() => format!("HTTP {status}"),
        Err(_) => body.trim().to_string(),
    };
    ClientError::api_error(status, message)
}

/// Escape a literal for a Drive `q` expression.
fn drive_literal(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn values_to_json(row: &[CellValue]) -> Vec<serde_json::Value> {
    row.iter()
        .map(|cell| match cell {
            CellValue::Empty => serde_json::Value::Null,
            CellValue::Bool(b) => serde_json::Value::Bool(*b),
            CellValue::Number(n) => serde_json::Value::Number(n.clone()),
            CellValue::Text(s) => serde_json::Value::String(s.clone()),
        })
        .collect()
}

/// Sheets/Drive client authenticated as a service account.
#[derive(Debug)]
pub struct GoogleSheetsClient {
    http: reqwest::Client,
    tokens: TokenProvider,
    config: SheetsConfig,
}

impl GoogleSheetsClient {
    /// Load credentials from `config.credentials_file` and build the client.
    pub fn from_config(config: SheetsConfig) -> ClientResult<Self> {
        let key = ServiceAccountKey::from_file(&config.credentials_file)?;
        Self::with_key(config, key)
    }

    /// Build the client from an already-parsed key.
    pub fn with_key(config: SheetsConfig, key: ServiceAccountKey) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("sheets-client/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_http_client(config, key, http)
    }

    /// Build the client around a caller-supplied HTTP client.
    ///
    /// `config.request_timeout` is not applied; configure it on `http`.
    pub fn with_http_client(
        config: SheetsConfig,
        key: ServiceAccountKey,
        http: reqwest::Client,
    ) -> ClientResult<Self> {
        // Fail at startup rather than on the first tool call.
        Url::parse(&config.sheets_base_url)
            .map_err(|e| ClientError::config_error(format!("invalid sheets base url: {e}")))?;
        Url::parse(&config.drive_base_url)
            .map_err(|e| ClientError::config_error(format!("invalid drive base url: {e}")))?;

        info!(
            client_email = %key.client_email,
            project_id = key.project_id.as_deref().unwrap_or("-"),
            "Loaded service account credentials"
        );

        Ok(Self {
            tokens: TokenProvider::new(key, http.clone()),
            http,
            config,
        })
    }

    /// Email of the service account; spreadsheets must be shared with it.
    pub fn client_email(&self) -> &str {
        self.tokens.client_email()
    }

    fn url(base: &str, segments: &[&str]) -> ClientResult<Url> {
        let mut url = Url::parse(base)
            .map_err(|e| ClientError::config_error(format!("invalid base url '{base}': {e}")))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::config_error(format!("base url '{base}' cannot be a base")))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn sheets_url(&self, segments: &[&str]) -> ClientResult<Url> {
        Self::url(&self.config.sheets_base_url, segments)
    }

    fn drive_url(&self, segments: &[&str]) -> ClientResult<Url> {
        Self::url(&self.config.drive_base_url, segments)
    }

    /// Attach a bearer token, send, and decode a JSON body or an API error.
    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let token = self.tokens.access_token().await?;
        let response = request.bearer_auth(token.expose_secret()).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = api_error(status.as_u16(), &body);
            debug!(status = %status, error = %err, "Google API call failed");
            return Err(err);
        }
        Ok(response.json().await?)
    }

    async fn drive_files(&self, query: &str) -> ClientResult<Vec<DriveFile>> {
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.drive_url(&["files"])?;
            {
                let mut pairs = url.query_pairs_mut();
                pairs
                    .append_pair("q", query)
                    .append_pair("fields", "nextPageToken,files(id,name)")
                    .append_pair("pageSize", DRIVE_PAGE_SIZE)
                    .append_pair("supportsAllDrives", "true")
                    .append_pair("includeItemsFromAllDrives", "true");
                if let Some(token) = page_token.as_deref() {
                    pairs.append_pair("pageToken", token);
                }
            }

            let page: DriveFileList = self.send_json(self.http.get(url)).await?;
            files.extend(page.files);
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(files)
    }

    fn spreadsheet_query(title: Option<&str>) -> String {
        let mut query = format!(
            "mimeType={} and trashed=false",
            drive_literal(SPREADSHEET_MIME_TYPE)
        );
        if let Some(title) = title {
            query.push_str(&format!(" and name={}", drive_literal(title)));
        }
        query
    }

    fn values_request(
        &self,
        method: Method,
        spreadsheet_id: &str,
        range_segment: &str,
    ) -> ClientResult<RequestBuilder> {
        let mut url =
            self.sheets_url(&["spreadsheets", spreadsheet_id, "values", range_segment])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", self.config.value_input_option.as_api_str());
        Ok(self.http.request(method, url))
    }
}

#[async_trait]
impl SheetsBackend for GoogleSheetsClient {
    async fn list_spreadsheets(&self) -> ClientResult<Vec<SpreadsheetSummary>> {
        let files = self.drive_files(&Self::spreadsheet_query(None)).await?;
        debug!(count = files.len(), "Listed spreadsheets");
        Ok(files
            .into_iter()
            .map(|f| SpreadsheetSummary::new(f.id, f.name))
            .collect())
    }

    async fn open_by_key(&self, key: &str) -> ClientResult<Spreadsheet> {
        let mut url = self.sheets_url(&["spreadsheets", key])?;
        url.query_pairs_mut().append_pair("fields", SPREADSHEET_FIELDS);

        match self
            .send_json::<SpreadsheetResource>(self.http.get(url))
            .await
        {
            Ok(resource) => Ok(resource.into()),
            Err(ClientError::ApiError { status: 404, .. }) => {
                Err(ClientError::spreadsheet_not_found(key))
            }
            Err(e) => Err(e),
        }
    }

    async fn open_by_title(&self, title: &str) -> ClientResult<Spreadsheet> {
        let files = self.drive_files(&Self::spreadsheet_query(Some(title))).await?;
        let file = files
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::spreadsheet_not_found(title))?;
        self.open_by_key(&file.id).await
    }

    async fn read_values(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
        range: Option<&RangeRef>,
    ) -> ClientResult<CellGrid> {
        // Resolve the worksheet first so a bad name is NotFound, not a 400.
        self.open_by_key(spreadsheet_id).await?.worksheet(worksheet)?;

        let range_str = a1::qualified_range(worksheet, range);
        let mut url = self.sheets_url(&["spreadsheets", spreadsheet_id, "values", &range_str])?;
        url.query_pairs_mut()
            .append_pair("majorDimension", "ROWS")
            .append_pair(
                "valueRenderOption",
                self.config.value_render_option.as_api_str(),
            );

        let body: ValueRange = self.send_json(self.http.get(url)).await?;
        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(CellValue::from_json).collect())
            .collect())
    }

    async fn update_values(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
        range: &RangeRef,
        values: &CellGrid,
    ) -> ClientResult<UpdateSummary> {
        self.open_by_key(spreadsheet_id).await?.worksheet(worksheet)?;

        let range_str = a1::qualified_range(worksheet, Some(range));
        let body = serde_json::json!({
            "range": range_str,
            "majorDimension": "ROWS",
            "values": values.iter().map(|row| values_to_json(row)).collect::<Vec<_>>(),
        });
        let request = self
            .values_request(Method::PUT, spreadsheet_id, &range_str)?
            .json(&body);

        let response: UpdateValuesResponse = self.send_json(request).await?;
        Ok(UpdateSummary {
            updated_range: response.updated_range.unwrap_or(range_str),
            updated_rows: response.updated_rows,
            updated_columns: response.updated_columns,
            updated_cells: response.updated_cells,
        })
    }

    async fn append_row(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
        values: &[CellValue],
    ) -> ClientResult<AppendSummary> {
        self.open_by_key(spreadsheet_id).await?.worksheet(worksheet)?;

        let table_range = a1::qualified_range(worksheet, None);
        let segment = format!("{table_range}:append");
        let mut request = self.values_request(Method::POST, spreadsheet_id, &segment)?;
        request = request
            .query(&[("insertDataOption", "INSERT_ROWS")])
            .json(&serde_json::json!({
                "majorDimension": "ROWS",
                "values": [values_to_json(values)],
            }));

        let response: AppendValuesResponse = self.send_json(request).await?;
        let updated_range = response.updates.and_then(|u| u.updated_range);
        let row_index = updated_range.as_deref().and_then(a1::first_row_of);
        Ok(AppendSummary {
            updated_range,
            row_index,
        })
    }

    async fn create_spreadsheet(&self, title: &str) -> ClientResult<Spreadsheet> {
        let url = self.sheets_url(&["spreadsheets"])?;
        let request = self
            .http
            .post(url)
            .json(&serde_json::json!({ "properties": { "title": title } }));
        let resource: SpreadsheetResource = self.send_json(request).await?;
        info!(spreadsheet_id = %resource.spreadsheet_id, "Created spreadsheet");
        Ok(resource.into())
    }

    async fn create_worksheet(
        &self,
        spreadsheet_id: &str,
        title: &str,
        rows: u32,
        cols: u32,
    ) -> ClientResult<Worksheet> {
        let url = self.sheets_url(&["spreadsheets", &format!("{spreadsheet_id}:batchUpdate")])?;
        let request = self.http.post(url).json(&serde_json::json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "title": title,
                        "gridProperties": { "rowCount": rows, "columnCount": cols }
                    }
                }
            }]
        }));

        let response = match self.send_json::<BatchUpdateResponse>(request).await {
            Ok(response) => response,
            Err(ClientError::ApiError { status: 404, .. }) => {
                return Err(ClientError::spreadsheet_not_found(spreadsheet_id))
            }
            Err(e) => return Err(e),
        };

        let properties = response
            .replies
            .into_iter()
            .find_map(|reply| reply.add_sheet)
            .map(|reply| reply.properties)
            .ok_or_else(|| ClientError::invalid_response("replies[].addSheet", "missing"))?;
        Ok(properties.into_worksheet(spreadsheet_id))
    }
}
