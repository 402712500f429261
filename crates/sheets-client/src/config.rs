//! Backend configuration.
//!
//! `SheetsConfig` is built once at startup and handed to the backend
//! constructor. Nothing here is read from ambient state after that point.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use bon::Builder;

use crate::error::{ClientError, ClientResult};

/// Environment variable naming the service-account key file.
pub const CREDENTIALS_FILE_ENV: &str = "GOOGLE_SHEETS_CREDENTIALS_FILE";

pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4";
pub const DEFAULT_DRIVE_BASE_URL: &str = "https://www.googleapis.com/drive/v3";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How the Sheets API interprets written values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValueInputOption {
    /// Stored exactly as given
    #[default]
    Raw,
    /// Parsed as if typed into the UI (numbers, dates, formulas)
    UserEntered,
}

impl ValueInputOption {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Self::Raw => "RAW",
            Self::UserEntered => "USER_ENTERED",
        }
    }
}

impl FromStr for ValueInputOption {
    type Err = ClientError;

    fn from_str(s: &str) -> ClientResult<Self> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "raw" => Ok(Self::Raw),
            "user-entered" => Ok(Self::UserEntered),
            other => Err(ClientError::config_error(format!(
                "unknown value input option '{other}' (expected raw or user-entered)"
            ))),
        }
    }
}

/// How the Sheets API renders values on read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValueRenderOption {
    /// As displayed in the UI
    #[default]
    Formatted,
    /// Raw computed values (numbers stay numbers)
    Unformatted,
    /// Formulas instead of their results
    Formula,
}

impl ValueRenderOption {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Self::Formatted => "FORMATTED_VALUE",
            Self::Unformatted => "UNFORMATTED_VALUE",
            Self::Formula => "FORMULA",
        }
    }
}

impl FromStr for ValueRenderOption {
    type Err = ClientError;

    fn from_str(s: &str) -> ClientResult<Self> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "formatted" | "formatted-value" => Ok(Self::Formatted),
            "unformatted" | "unformatted-value" => Ok(Self::Unformatted),
            "formula" => Ok(Self::Formula),
            other => Err(ClientError::config_error(format!(
                "unknown value render option '{other}' (expected formatted, unformatted or formula)"
            ))),
        }
    }
}

/// Resolved configuration for the Google backend.
#[derive(Debug, Clone, Builder)]
pub struct SheetsConfig {
    /// Path to the service-account JSON key
    #[builder(into)]
    pub credentials_file: PathBuf,
    #[builder(default = DEFAULT_REQUEST_TIMEOUT)]
    pub request_timeout: Duration,
    #[builder(default)]
    pub value_input_option: ValueInputOption,
    #[builder(default)]
    pub value_render_option: ValueRenderOption,
    #[builder(default = DEFAULT_SHEETS_BASE_URL.to_string())]
    pub sheets_base_url: String,
    #[builder(default = DEFAULT_DRIVE_BASE_URL.to_string())]
    pub drive_base_url: String,
}

impl SheetsConfig {
    /// Build a config with defaults, taking the key path from
    /// `GOOGLE_SHEETS_CREDENTIALS_FILE`.
    pub fn from_env() -> ClientResult<Self> {
        let path = std::env::var(CREDENTIALS_FILE_ENV).map_err(|_| {
            ClientError::config_error(format!(
                "{CREDENTIALS_FILE_ENV} must point at a service-account key file"
            ))
        })?;
        if path.trim().is_empty() {
            return Err(ClientError::config_error(format!(
                "{CREDENTIALS_FILE_ENV} is set but empty"
            )));
        }
        Ok(Self::builder().credentials_file(path).build())
    }
}
