//! Success envelope: `{"success": true, "message"?: ..., ...payload}`

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub data: T,
}

/// Payload for responses that only carry a message.
#[derive(Debug, Default, Serialize)]
pub struct Empty {}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self { success: true, message: None, data })
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self { success: true, message: Some(message.into()), data })
    }
}

impl Envelope<Empty> {
    pub fn message(message: impl Into<String>) -> Json<Self> {
        Self::with_message(message, Empty {})
    }
}
