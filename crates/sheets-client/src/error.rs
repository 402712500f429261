//! # Client Error Types
//!
//! Unified error handling for the Sheets backend and credential provider.
//!
//! Every failure is eventually reduced to an [`ErrorKind`], which is what tool
//! callers see. The variants of [`ClientError`] keep enough detail for logs.

use serde::Serialize;
use thiserror::Error;

/// Client operation result type
pub type ClientResult<T> = Result<T, ClientError>;

/// Caller-facing classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed cell/range reference, wrong value type, missing argument
    InvalidArgument,
    /// Spreadsheet or worksheet lookup failed
    NotFound,
    /// The backend refused the credentials or the operation
    PermissionDenied,
    /// Transient network or API failure
    BackendUnavailable,
    /// Anything the backend raised that fits nowhere else
    Internal,
}

impl ErrorKind {
    /// Stable snake_case identifier used in tool envelopes.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::NotFound => "not_found",
            Self::PermissionDenied => "permission_denied",
            Self::BackendUnavailable => "backend_unavailable",
            Self::Internal => "internal",
        }
    }

    /// Classify an HTTP status returned by a Google API.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 | 411 | 413 => Self::InvalidArgument,
            401 | 403 => Self::PermissionDenied,
            404 => Self::NotFound,
            408 | 429 | 500..=599 => Self::BackendUnavailable,
            _ => Self::Internal,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comprehensive error types for client operations
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Spreadsheet '{identifier}' not found")]
    SpreadsheetNotFound { identifier: String },

    #[error("Worksheet '{worksheet}' not found in spreadsheet '{spreadsheet_id}'")]
    WorksheetNotFound {
        spreadsheet_id: String,
        worksheet: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Service unavailable: {service} - {reason}")]
    ServiceUnavailable { service: String, reason: String },

    #[error("Invalid response: {field} - {reason}")]
    InvalidResponse { field: String, reason: String },
}

impl ClientError {
    /// Create an API error from HTTP response
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a service unavailable error
    pub fn service_unavailable(service: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            service: service.into(),
            reason: reason.into(),
        }
    }

    /// Create a spreadsheet-not-found error
    pub fn spreadsheet_not_found(identifier: impl Into<String>) -> Self {
        Self::SpreadsheetNotFound {
            identifier: identifier.into(),
        }
    }

    /// Create a worksheet-not-found error
    pub fn worksheet_not_found(
        spreadsheet_id: impl Into<String>,
        worksheet: impl Into<String>,
    ) -> Self {
        Self::WorksheetNotFound {
            spreadsheet_id: spreadsheet_id.into(),
            worksheet: worksheet.into(),
        }
    }

    /// Create an invalid response error for protocol violations
    ///
    /// Use this when an API response is missing required fields. This indicates
    /// a protocol violation that should not be silently defaulted.
    pub fn invalid_response(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Map this error onto the caller-facing taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::HttpError(e) => {
                if e.is_timeout() || e.is_connect() {
                    ErrorKind::BackendUnavailable
                } else if let Some(status) = e.status() {
                    ErrorKind::from_status(status.as_u16())
                } else if e.is_request() {
                    ErrorKind::BackendUnavailable
                } else {
                    ErrorKind::Internal
                }
            }
            ClientError::ApiError { status, .. } => ErrorKind::from_status(*status),
            ClientError::AuthError(_) => ErrorKind::PermissionDenied,
            ClientError::SpreadsheetNotFound { .. } | ClientError::WorksheetNotFound { .. } => {
                ErrorKind::NotFound
            }
            ClientError::InvalidInput(_) => ErrorKind::InvalidArgument,
            ClientError::ServiceUnavailable { .. } => ErrorKind::BackendUnavailable,
            ClientError::ConfigError(_) | ClientError::InvalidResponse { .. } => {
                ErrorKind::Internal
            }
        }
    }

    /// Check if error is recoverable (worth retrying by the caller)
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        self.kind() == ErrorKind::BackendUnavailable
    }
}
