//! Local HTTP/1.1 stub standing in for the Google token, Sheets and Drive
//! endpoints, so the REST client can be tested without credentials.

use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use url::Url;

use crate::auth::ServiceAccountKey;
use crate::config::SheetsConfig;
use crate::google::GoogleSheetsClient;

/// Throwaway RSA key; never used outside tests.
pub const TEST_PRIVATE_KEY: &str = include_str!("../../../tests/fixtures/service_account_key.pem");

/// One request as seen by the stub.
#[derive(Debug, Clone)]
pub struct StubRequest {
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub authorization: Option<String>,
    pub body: String,
}

impl StubRequest {
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap_or(serde_json::Value::Null)
    }
}

/// A canned response: status code and JSON body.
pub type StubResponse = (u16, String);

type Handler = Arc<dyn Fn(&StubRequest) -> StubResponse + Send + Sync>;

#[derive(Debug)]
pub struct StubServer {
    base: String,
    requests: Arc<Mutex<Vec<StubRequest>>>,
    handle: JoinHandle<()>,
}

impl StubServer {
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&StubRequest) -> StubResponse + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let handler: Handler = Arc::new(handler);

        let recorded = requests.clone();
        let handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let handler = handler.clone();
                let recorded = recorded.clone();
                tokio::spawn(async move {
                    let _ = serve_connection(stream, handler, recorded).await;
                });
            }
        });

        Self {
            base,
            requests,
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    pub fn requests(&self) -> Vec<StubRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests whose method and path match.
    pub fn requests_to(&self, method: &str, path: &str) -> Vec<StubRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    /// A service-account key whose `token_uri` points here.
    pub fn service_account_key(&self) -> ServiceAccountKey {
        ServiceAccountKey::from_json(
            &serde_json::json!({
                "type": "service_account",
                "project_id": "stub-project",
                "private_key_id": "stub-key",
                "private_key": TEST_PRIVATE_KEY,
                "client_email": "bot@stub-project.iam.gserviceaccount.com",
                "token_uri": self.url("/token"),
            })
            .to_string(),
        )
        .unwrap()
    }

    /// HTTP client that ignores any proxy configured in the environment.
    pub fn http() -> reqwest::Client {
        reqwest::Client::builder().no_proxy().build().unwrap()
    }

    /// A client whose token, Sheets and Drive endpoints all point here.
    pub fn client(&self, config: SheetsConfig) -> GoogleSheetsClient {
        let key = self.service_account_key();
        let config = SheetsConfig {
            sheets_base_url: self.url("/sheets"),
            drive_base_url: self.url("/drive"),
            ..config
        };
        GoogleSheetsClient::with_http_client(config, key, Self::http()).unwrap()
    }

    pub fn default_config() -> SheetsConfig {
        SheetsConfig::builder()
            .credentials_file("/unused/key.json")
            .build()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Google-shaped error body.
pub fn google_error(code: u16, status: &str, message: &str) -> StubResponse {
    let body = serde_json::json!({
        "error": { "code": code, "message": message, "status": status }
    });
    (code, body.to_string())
}

pub fn ok(body: serde_json::Value) -> StubResponse {
    (200, body.to_string())
}

/// Successful token exchange.
pub fn token_ok() -> StubResponse {
    ok(serde_json::json!({
        "access_token": "stub-access-token",
        "expires_in": 3600,
        "token_type": "Bearer",
    }))
}

async fn serve_connection(
    stream: TcpStream,
    handler: Handler,
    recorded: Arc<Mutex<Vec<StubRequest>>>,
) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or_default().to_string();

    let mut content_length = 0usize;
    let mut authorization = None;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            let value = value.trim();
            match name.to_ascii_lowercase().as_str() {
                "content-length" => content_length = value.parse().unwrap_or(0),
                "authorization" => authorization = Some(value.to_string()),
                _ => {}
            }
        }
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).await?;

    let parsed = Url::parse(&format!("http://stub{target}")).map_err(std::io::Error::other)?;
    let request = StubRequest {
        method,
        path: parsed.path().to_string(),
        query: parsed
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect(),
        authorization,
        body: String::from_utf8_lossy(&body).into_owned(),
    };
    recorded.lock().unwrap().push(request.clone());

    let (status, body) = handler(&request);
    let response = format!(
        "HTTP/1.1 {status} Stub\r\n\
         content-type: application/json\r\n\
         content-length: {}\r\n\
         connection: close\r\n\r\n{body}",
        body.len()
    );
    let mut stream = reader.into_inner();
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}
