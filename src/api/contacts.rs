//! Contact form intake and the admin inbox

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::envelope::{Empty, Envelope};
use super::error::{ApiError, ApiResult};
use crate::domain::aggregates::{ContactMessage, NewContactMessage};
use crate::state::AppState;

#[derive(Serialize)]
pub struct MessageList {
    pub messages: Vec<ContactMessage>,
    pub count: usize,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ContactStatusRequest {
    #[validate(length(min = 1, max = 20))]
    pub status: String,
}

/// POST /api/contact
pub async fn submit(
    State(s): State<AppState>,
    body: Result<Json<NewContactMessage>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Envelope<Empty>>)> {
    let Json(input) = body?;
    input.validate()?;
    let message = s.store.create_contact_message(input).await?;
    tracing::info!(message_id = message.id, "contact message received");
    Ok((StatusCode::CREATED, Envelope::message("Message received")))
}

/// GET /api/admin/contacts
pub async fn list(State(s): State<AppState>) -> ApiResult<Json<Envelope<MessageList>>> {
    let messages = s.store.list_contact_messages().await?;
    Ok(Envelope::ok(MessageList { count: messages.len(), messages }))
}

/// PUT /api/admin/contacts/:id
pub async fn update_status(
    State(s): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<ContactStatusRequest>, JsonRejection>,
) -> ApiResult<Json<Envelope<Empty>>> {
    let Path(id) = path?;
    let Json(r) = body?;
    r.validate()?;
    if !s.store.set_contact_status(id, r.status.trim()).await? {
        return Err(ApiError::not_found("Message not found"));
    }
    Ok(Envelope::message("Message status updated"))
}

/// DELETE /api/admin/contacts/:id
pub async fn delete(
    State(s): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Envelope<Empty>>> {
    let Path(id) = path?;
    if !s.store.delete_contact_message(id).await? {
        return Err(ApiError::not_found("Message not found"));
    }
    Ok(Envelope::message("Message deleted"))
}
