//! Admin bearer-token guard

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::error::ApiError;
use crate::state::AppState;

/// Rejects any request to an admin route that lacks `Authorization: Bearer <ADMIN_TOKEN>`.
pub async fn require_admin(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let token = request
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    let authorized = matches!(token, Some(t) if constant_time_eq(t.as_bytes(), state.config.admin_token.as_bytes()));
    if !authorized {
        tracing::debug!(path = %request.uri().path(), "admin request rejected");
        return ApiError::Unauthorized.into_response();
    }
    next.run(request).await
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
