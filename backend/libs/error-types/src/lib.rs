//! Shared API error body for the chat services.
//!
//! Every HTTP error leaving a service is rendered as [`ErrorResponse`] so
//! clients can branch on `error_type` / `code` instead of parsing messages.

use serde::{Deserialize, Serialize};

/// Unified JSON error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short reason phrase, e.g. "Not Found".
    pub error: String,

    /// Human readable explanation.
    pub message: String,

    /// HTTP status code.
    pub status: u16,

    /// Coarse category, one of [`error_types`].
    pub error_type: String,

    /// Stable machine code, one of [`error_codes`].
    pub code: String,

    /// Request id the error was produced under, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,

    /// RFC 3339 timestamp.
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str, status: u16, error_type: &str, code: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            status,
            error_type: error_type.to_string(),
            code: code.to_string(),
            trace_id: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn with_trace_id(mut self, trace_id: String) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                r#"{{"error":"{}","status":{},"code":"{}"}}"#,
                self.error, self.status, self.code
            )
        })
    }
}

/// Stable error codes.
pub mod error_codes {
    pub const BAD_REQUEST: &str = "BAD_REQUEST";

    // Users
    pub const DISPLAY_NAME_INVALID: &str = "DISPLAY_NAME_INVALID";

    // Chat
    pub const MESSAGE_INVALID: &str = "MESSAGE_INVALID";

    // System
    pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
    pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";
}

/// Error categories.
pub mod error_types {
    pub const VALIDATION_ERROR: &str = "validation_error";
    pub const SERVER_ERROR: &str = "server_error";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_creation() {
        let error = ErrorResponse::new(
            "Bad Request",
            "displayName must not be empty",
            400,
            error_types::VALIDATION_ERROR,
            error_codes::DISPLAY_NAME_INVALID,
        );

        assert_eq!(error.status, 400);
        assert_eq!(error.error_type, error_types::VALIDATION_ERROR);
        assert_eq!(error.code, error_codes::DISPLAY_NAME_INVALID);
        assert!(error.trace_id.is_none());
    }

    #[test]
    fn test_optional_fields_are_skipped() {
        let json = ErrorResponse::new(
            "Bad Request",
            "sender_id must not be empty",
            400,
            error_types::VALIDATION_ERROR,
            error_codes::MESSAGE_INVALID,
        )
        .to_json();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.get("trace_id").is_none());
        assert_eq!(value["code"], "MESSAGE_INVALID");
    }

    #[test]
    fn test_trace_id_is_serialized() {
        let error = ErrorResponse::new(
            "Internal Server Error",
            "boom",
            500,
            error_types::SERVER_ERROR,
            error_codes::INTERNAL_SERVER_ERROR,
        )
        .with_trace_id("req-1".to_string());

        let value: serde_json::Value = serde_json::from_str(&error.to_json()).unwrap();
        assert_eq!(value["trace_id"], "req-1");
    }
}
