//! Orders: public intake and the admin order desk

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::envelope::{Empty, Envelope};
use super::error::{ApiError, ApiResult};
use crate::domain::aggregates::{generate_order_number, NewCustomer, NewOrder, Order, OrderStatus};
use crate::domain::events::OrderEvent;
use crate::pricing::{self, Fabric, PrintOption, QuoteRequest};
use crate::state::AppState;

#[derive(Serialize)]
pub struct OrderList {
    pub orders: Vec<Order>,
    pub count: usize,
}

#[derive(Serialize)]
pub struct OrderPayload {
    pub order: Order,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PlaceOrderRequest {
    #[validate]
    pub customer: NewCustomer,
    pub product_id: i64,
    #[serde(default)]
    pub fabric: Fabric,
    #[serde(default)]
    pub print: PrintOption,
    #[serde(default)]
    #[validate(length(min = 1, max = 100))]
    pub product_color: Option<String>,
    #[validate(range(min = 1))]
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

/// POST /api/orders
///
/// The order is priced from the stored product; client-side figures are ignored.
pub async fn place(
    State(s): State<AppState>,
    body: Result<Json<PlaceOrderRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Envelope<OrderPayload>>)> {
    let Json(r) = body?;
    r.validate()?;

    let product = s.store.get_product(r.product_id).await?.ok_or_else(|| ApiError::not_found("Product not found"))?;
    let minimum = u32::try_from(product.min_order_quantity).unwrap_or(0);
    if !pricing::meets_minimum(r.quantity, minimum) {
        tracing::warn!(product_id = product.id, quantity = r.quantity, minimum, "order below minimum quantity");
        return Err(ApiError::bad_request(format!("Minimum order quantity for this product is {minimum}")));
    }
    let quantity = i32::try_from(r.quantity).map_err(|_| ApiError::bad_request("quantity is too large"))?;
    let quote = pricing::quote(&QuoteRequest::new(product.price, r.quantity).with_fabric(r.fabric).with_print(r.print))?;

    let product_size = match &product.bag_dimensions {
        Some(dims) => format!("{} ({dims})", product.name),
        None => product.name.clone(),
    };
    let new_order = NewOrder {
        order_number: generate_order_number(Utc::now()),
        customer: r.customer,
        product_type: product.bag_type.clone().unwrap_or_else(|| product.name.clone()),
        product_color: r.product_color.unwrap_or_else(|| r.fabric.label().to_string()),
        product_size,
        quantity,
        unit_price: quote.unit_price,
        total: quote.total,
    };

    let order = s.store.place_order(&new_order).await?;
    tracing::info!(order_id = order.id, order_number = %order.order_number, total = %order.total, "order placed");
    s.publish(OrderEvent::Placed { order_id: order.id, order_number: order.order_number.clone(), total: order.total })
        .await;
    Ok((StatusCode::CREATED, Envelope::with_message("Order received", OrderPayload { order })))
}

/// GET /api/admin/orders
pub async fn list(State(s): State<AppState>) -> ApiResult<Json<Envelope<OrderList>>> {
    let orders = s.store.list_orders().await?;
    Ok(Envelope::ok(OrderList { count: orders.len(), orders }))
}

/// GET /api/admin/orders/:id
pub async fn get(
    State(s): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Envelope<OrderPayload>>> {
    let Path(id) = path?;
    let order = s.store.get_order(id).await?.ok_or_else(|| ApiError::not_found("Order not found"))?;
    Ok(Envelope::ok(OrderPayload { order }))
}

/// PUT /api/admin/orders/:id
pub async fn update_status(
    State(s): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<StatusRequest>, JsonRejection>,
) -> ApiResult<Json<Envelope<OrderPayload>>> {
    let Path(id) = path?;
    let Json(r) = body?;
    let next: OrderStatus = r.status.parse()?;
    change_status(&s, id, next).await
}

/// POST /api/admin/orders/:id/cancel
pub async fn cancel(
    State(s): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Envelope<OrderPayload>>> {
    let Path(id) = path?;
    change_status(&s, id, OrderStatus::Cancelled).await
}

async fn change_status(s: &AppState, id: i64, next: OrderStatus) -> ApiResult<Json<Envelope<OrderPayload>>> {
    let mut order = s.store.get_order(id).await?.ok_or_else(|| ApiError::not_found("Order not found"))?;
    let from = order.status;
    if from == next {
        return Ok(Envelope::with_message("Order status unchanged", OrderPayload { order }));
    }
    let next = from.transition_to(next, s.config.strict_order_transitions).map_err(|e| {
        tracing::warn!(order_id = id, %from, to = %next, "order status change rejected");
        ApiError::from(e)
    })?;
    if !s.store.set_order_status(id, next).await? {
        return Err(ApiError::not_found("Order not found"));
    }
    tracing::info!(order_id = id, %from, to = %next, "order status changed");
    s.publish(OrderEvent::StatusChanged { order_id: id, from, to: next }).await;
    order.status = next;
    Ok(Envelope::with_message("Order status updated", OrderPayload { order }))
}

/// DELETE /api/admin/orders/:id
pub async fn delete(
    State(s): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Envelope<Empty>>> {
    let Path(id) = path?;
    if !s.store.delete_order(id).await? {
        return Err(ApiError::not_found("Order not found"));
    }
    tracing::info!(order_id = id, "order deleted");
    Ok(Envelope::message("Order deleted"))
}
