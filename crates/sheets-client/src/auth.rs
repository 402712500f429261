//! Service-account credentials and OAuth access tokens.
//!
//! The key file is read once at startup. Access tokens are obtained with the
//! JWT bearer grant and cached until shortly before they expire.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult};

pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN_SECS: i64 = 60;

/// On-disk shape of a service-account key.
#[derive(Deserialize)]
struct KeyFile {
    #[serde(rename = "type")]
    key_type: Option<String>,
    project_id: Option<String>,
    private_key_id: Option<String>,
    private_key: String,
    client_email: String,
    token_uri: Option<String>,
}

/// A parsed service-account key. The private key never appears in `Debug`.
#[derive(Debug)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub project_id: Option<String>,
    pub private_key_id: Option<String>,
    pub token_uri: String,
    private_key: SecretString,
}

#[derive(Serialize)]
struct JwtClaims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct TokenErrorBody {
    error: String,
    error_description: Option<String>,
}

impl ServiceAccountKey {
    /// Parse a key from its JSON text and check the private key is usable.
    pub fn from_json(input: &str) -> ClientResult<Self> {
        let file: KeyFile = serde_json::from_str(input).map_err(|e| {
            ClientError::config_error(format!("invalid service account key JSON: {e}"))
        })?;

        if let Some(kind) = file.key_type.as_deref() {
            if kind != "service_account" {
                return Err(ClientError::config_error(format!(
                    "credentials file has type '{kind}', expected 'service_account'"
                )));
            }
        }

        let key = Self {
            client_email: file.client_email,
            project_id: file.project_id,
            private_key_id: file.private_key_id,
            token_uri: file
                .token_uri
                .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
            private_key: SecretString::from(file.private_key),
        };
        key.encoding_key()?;
        Ok(key)
    }

    /// Read and parse a key file.
    pub fn from_file(path: &Path) -> ClientResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ClientError::config_error(format!(
                "failed to read credentials file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&contents)
    }

    fn encoding_key(&self) -> ClientResult<EncodingKey> {
        EncodingKey::from_rsa_pem(self.private_key.expose_secret().as_bytes()).map_err(|e| {
            ClientError::config_error(format!(
                "service account private key is not valid RSA PEM: {e}"
            ))
        })
    }

    /// Build the signed RS256 assertion exchanged for an access token.
    pub fn signed_assertion(&self, scopes: &[&str], now: DateTime<Utc>) -> ClientResult<String> {
        let iat = now.timestamp();
        let claims = JwtClaims {
            iss: &self.client_email,
            scope: scopes.join(" "),
            aud: &self.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.private_key_id.clone();

        jsonwebtoken::encode(&header, &claims, &self.encoding_key()?)
            .map_err(|e| ClientError::AuthError(format!("failed to sign assertion: {e}")))
    }
}

#[derive(Debug)]
struct CachedToken {
    value: SecretString,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(REFRESH_MARGIN_SECS) < self.expires_at
    }
}

/// Hands out bearer tokens for a service account, refreshing on demand.
///
/// Shared by every concurrent request; the mutex serializes refreshes so only
/// one token exchange is in flight at a time.
#[derive(Debug)]
pub struct TokenProvider {
    key: ServiceAccountKey,
    scopes: Vec<&'static str>,
    http: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    pub fn new(key: ServiceAccountKey, http: reqwest::Client) -> Self {
        Self {
            key,
            scopes: vec![SPREADSHEETS_SCOPE, DRIVE_SCOPE],
            http,
            cached: Mutex::new(None),
        }
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    /// Return a valid access token, exchanging a new assertion if needed.
    pub async fn access_token(&self) -> ClientResult<SecretString> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now();
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(SecretString::from(token.value.expose_secret().to_owned()));
        }

        let token = self.fetch(now).await?;
        let value = SecretString::from(token.value.expose_secret().to_owned());
        *cached = Some(token);
        Ok(value)
    }

    async fn fetch(&self, now: DateTime<Utc>) -> ClientResult<CachedToken> {
        let assertion = self.key.signed_assertion(&self.scopes, now)?;
        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                status = %status,
                client_email = %self.key.client_email,
                "Token exchange rejected"
            );
            if status.is_server_error() || status.as_u16() == 429 {
                return Err(ClientError::service_unavailable(
                    "oauth2",
                    format!("token endpoint returned {status}"),
                ));
            }
            let detail = serde_json::from_str::<TokenErrorBody>(&body)
                .map(|b| match b.error_description {
                    Some(desc) => format!("{}: {}", b.error, desc),
                    None => b.error,
                })
                .unwrap_or(body);
            return Err(ClientError::AuthError(format!(
                "token exchange failed ({status}): {detail}"
            )));
        }

        let token: TokenResponse = response.json().await?;
        debug!(expires_in = token.expires_in, "Obtained access token");
        Ok(CachedToken {
            value: SecretString::from(token.access_token),
            expires_at: now + Duration::seconds(token.expires_in),
        })
    }
}
