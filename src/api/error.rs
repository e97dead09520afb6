//! API error type
//!
//! Every failure leaves the service as `{"success": false, "message": ...}` with a
//! matching status code. Store failures are logged here and reported generically.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::aggregates::TransitionError;
use crate::domain::value_objects::PriceError;
use crate::pricing::PricingError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self { Self::BadRequest(message.into()) }
    pub fn not_found(message: impl Into<String>) -> Self { Self::NotFound(message.into()) }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(StoreError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Store(StoreError::Constraint(_)) => StatusCode::BAD_REQUEST,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::Store(StoreError::Conflict(msg) | StoreError::Constraint(msg)) => msg.clone(),
            Self::Store(e) => {
                tracing::error!(error = %e, "store error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({ "success": false, "message": self.public_message() });
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self { Self::BadRequest(format!("invalid input: {errors}")) }
}

impl From<PricingError> for ApiError {
    fn from(e: PricingError) -> Self { Self::BadRequest(e.to_string()) }
}

impl From<PriceError> for ApiError {
    fn from(e: PriceError) -> Self { Self::BadRequest(e.to_string()) }
}

impl From<TransitionError> for ApiError {
    fn from(e: TransitionError) -> Self { Self::BadRequest(e.to_string()) }
}
