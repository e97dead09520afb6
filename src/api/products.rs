//! Admin product CRUD

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use validator::Validate;

use super::envelope::{Empty, Envelope};
use super::error::{ApiError, ApiResult};
use crate::domain::aggregates::{Product, ProductInput};
use crate::state::AppState;

#[derive(Serialize)]
pub struct ProductList {
    pub products: Vec<Product>,
    pub count: usize,
}

#[derive(Serialize)]
pub struct ProductPayload {
    pub product: Product,
}

/// Validates the payload and normalises its price to two decimals.
fn checked_input(body: Result<Json<ProductInput>, JsonRejection>) -> ApiResult<ProductInput> {
    let Json(mut input) = body?;
    input.validate()?;
    input.price = input.checked_price()?.amount();
    Ok(input)
}

/// GET /api/admin/products
pub async fn list(State(s): State<AppState>) -> ApiResult<Json<Envelope<ProductList>>> {
    let products = s.store.list_products().await?;
    Ok(Envelope::ok(ProductList { count: products.len(), products }))
}

/// GET /api/admin/products/:id
pub async fn get(
    State(s): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Envelope<ProductPayload>>> {
    let Path(id) = path?;
    let product = s.store.get_product(id).await?.ok_or_else(|| ApiError::not_found("Product not found"))?;
    Ok(Envelope::ok(ProductPayload { product }))
}

/// POST /api/admin/products
pub async fn create(
    State(s): State<AppState>,
    body: Result<Json<ProductInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Envelope<ProductPayload>>)> {
    let input = checked_input(body)?;
    let product = s.store.create_product(&input).await?;
    tracing::info!(product_id = product.id, name = %product.name, "product created");
    Ok((StatusCode::CREATED, Envelope::with_message("Product created", ProductPayload { product })))
}

/// PUT /api/admin/products/:id
pub async fn update(
    State(s): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<ProductInput>, JsonRejection>,
) -> ApiResult<Json<Envelope<ProductPayload>>> {
    let Path(id) = path?;
    let input = checked_input(body)?;
    let product = s.store.update_product(id, &input).await?.ok_or_else(|| ApiError::not_found("Product not found"))?;
    Ok(Envelope::with_message("Product updated", ProductPayload { product }))
}

/// DELETE /api/admin/products/:id
pub async fn delete(
    State(s): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Envelope<Empty>>> {
    let Path(id) = path?;
    if !s.store.delete_product(id).await? {
        return Err(ApiError::not_found("Product not found"));
    }
    tracing::info!(product_id = id, "product deleted");
    Ok(Envelope::message("Product deleted"))
}
