//! API request handlers.
//!
//! This module contains all HTTP request handlers organized by resource.

use crate::types::{AppError, RecordId, Result};

/// Login and current-user handlers.
pub mod auth;
/// Checklist template handlers.
pub mod checkpoints;
/// Inspection document handlers.
pub mod device_docs;
/// Device CRUD and count handlers.
pub mod devices;
/// Health and version handlers.
pub mod system;
/// Account management handlers.
pub mod users;

/// JSON request body whose rejections use the `{"error": ...}` envelope.
#[derive(Debug, axum::extract::FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Parses a path id; malformed ids are a client error, not a missing record.
pub(crate) fn parse_id(raw: &str) -> Result<RecordId> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::InvalidInput("Invalid ID".to_string()))
}

/// `{"message": ...}` acknowledgement body.
pub(crate) fn message(text: impl Into<String>) -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "message": text.into() }))
}
