//! Admin price changes and the price history

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::envelope::Envelope;
use super::error::{ApiError, ApiResult};
use crate::domain::aggregates::{ChangeType, PriceHistory, PriceHistoryStats};
use crate::domain::events::PriceEvent;
use crate::domain::value_objects::Price;
use crate::pricing;
use crate::state::AppState;

pub const DEFAULT_BULK_REASON: &str = "General price update";
pub const DEFAULT_SINGLE_REASON: &str = "Single price update";
pub const HISTORY_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct BulkPriceRequest {
    pub percentage_change: Decimal,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SinglePriceRequest {
    #[serde(alias = "new_price")]
    pub price: Decimal,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Serialize)]
pub struct PriceChange {
    pub affected_products: i32,
    pub history: PriceHistory,
}

#[derive(Serialize)]
pub struct HistoryList {
    pub history: Vec<PriceHistory>,
    pub stats: PriceHistoryStats,
    pub count: usize,
}

fn reason_or(reason: Option<String>, default: &str) -> String {
    reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty()).unwrap_or_else(|| default.to_string())
}

/// POST /api/admin/prices/bulk
pub async fn bulk_update(
    State(s): State<AppState>,
    body: Result<Json<BulkPriceRequest>, JsonRejection>,
) -> ApiResult<Json<Envelope<PriceChange>>> {
    let Json(r) = body?;
    let percentage = pricing::validate_bulk_percentage(r.percentage_change).map_err(|e| {
        tracing::warn!(percentage = %r.percentage_change, "bulk price change rejected");
        ApiError::from(e)
    })?;
    let reason = reason_or(r.reason, DEFAULT_BULK_REASON);

    let record = s.store.apply_bulk_price_change(percentage, &reason).await?;
    tracing::info!(%percentage, affected = record.affected_products, %reason, "bulk price change applied");
    s.publish(PriceEvent::BulkChanged {
        percentage,
        affected_products: record.affected_products,
        reason,
        at: record.created_at,
    })
    .await;

    let verb = match record.change_type {
        ChangeType::Increase => "increased",
        ChangeType::Decrease => "decreased",
    };
    let message = format!("All product prices {verb} by {}%", percentage.abs());
    Ok(Envelope::with_message(message, PriceChange { affected_products: record.affected_products, history: record }))
}

/// PUT /api/admin/prices/:id
pub async fn update_single(
    State(s): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<SinglePriceRequest>, JsonRejection>,
) -> ApiResult<Json<Envelope<PriceChange>>> {
    let Path(id) = path?;
    let Json(r) = body?;
    let price = Price::new(r.price)?;
    let reason = reason_or(r.reason, DEFAULT_SINGLE_REASON);

    let record = s.store.set_product_price(id, price.amount(), &reason).await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;
    let old_price = record.old_price.unwrap_or_default();
    tracing::info!(product_id = id, %old_price, new_price = %price, "product repriced");
    s.publish(PriceEvent::ProductRepriced { product_id: id, old_price, new_price: price.amount(), at: record.created_at })
        .await;

    let message = format!("Product price updated: {old_price:.2} → {price}");
    Ok(Envelope::with_message(message, PriceChange { affected_products: 1, history: record }))
}

/// GET /api/admin/price-history
pub async fn history(State(s): State<AppState>) -> ApiResult<Json<Envelope<HistoryList>>> {
    let history = s.store.list_price_history(HISTORY_LIMIT).await?;
    let stats = PriceHistoryStats::from_records(&history);
    Ok(Envelope::ok(HistoryList { count: history.len(), stats, history }))
}
