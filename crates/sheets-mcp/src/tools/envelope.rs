//! Uniform result envelope returned by every tool.

use serde::Serialize;
use sheets_client::{ClientError, ErrorKind};
use thiserror::Error;

/// A tool failure, already reduced to the caller-facing taxonomy.
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct ToolError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ToolError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl From<ClientError> for ToolError {
    fn from(err: ClientError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

/// What the invoking host receives, serialized as JSON text.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolEnvelope {
    Ok {
        tool: String,
        result: serde_json::Value,
    },
    Error {
        tool: String,
        error: ErrorKind,
        message: String,
        retryable: bool,
    },
}

impl ToolEnvelope {
    pub fn ok(tool: &str, result: serde_json::Value) -> Self {
        Self::Ok {
            tool: tool.to_string(),
            result,
        }
    }

    pub fn error(tool: &str, err: ToolError) -> Self {
        Self::Error {
            tool: tool.to_string(),
            retryable: err.kind == ErrorKind::BackendUnavailable,
            error: err.kind,
            message: err.message,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Pretty JSON text for the MCP text content.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| {
            let tool = match self {
                Self::Ok { tool, .. } | Self::Error { tool, .. } => tool.as_str(),
            };
            error_json(tool, ErrorKind::Internal, &e.to_string())
        })
    }
}

/// Build a structured error JSON string without going through serde derive.
pub fn error_json(tool: &str, kind: ErrorKind, message: &str) -> String {
    serde_json::json!({
        "status": "error",
        "tool": tool,
        "error": kind.as_str(),
        "message": message,
        "retryable": kind == ErrorKind::BackendUnavailable,
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_envelope_shape() {
        let envelope = ToolEnvelope::ok("list_spreadsheets", serde_json::json!([]));
        let parsed: serde_json::Value = serde_json::from_str(&envelope.to_json()).unwrap();
        assert_eq!(parsed["status"], "ok");
        assert_eq!(parsed["tool"], "list_spreadsheets");
        assert!(parsed["result"].as_array().unwrap().is_empty());
        assert!(!envelope.is_error());
    }

    #[test]
    fn test_error_envelope_from_client_error() {
        let err: ToolError = ClientError::worksheet_not_found("abc", "Missing").into();
        let envelope = ToolEnvelope::error("read_worksheet", err);
        let parsed: serde_json::Value = serde_json::from_str(&envelope.to_json()).unwrap();
        assert_eq!(parsed["status"], "error");
        assert_eq!(parsed["error"], "not_found");
        assert_eq!(parsed["retryable"], false);
        assert!(parsed["message"].as_str().unwrap().contains("Missing"));
    }

    #[test]
    fn test_unavailable_is_retryable() {
        let err: ToolError = ClientError::service_unavailable("sheets", "503").into();
        let envelope = ToolEnvelope::error("append_row", err);
        let parsed: serde_json::Value = serde_json::from_str(&envelope.to_json()).unwrap();
        assert_eq!(parsed["error"], "backend_unavailable");
        assert_eq!(parsed["retryable"], true);
    }

    #[test]
    fn test_error_json_matches_envelope() {
        let parsed: serde_json::Value =
            serde_json::from_str(&error_json("t", ErrorKind::Internal, "boom")).unwrap();
        assert_eq!(parsed["status"], "error");
        assert_eq!(parsed["error"], "internal");
        assert_eq!(parsed["message"], "boom");
    }
}
