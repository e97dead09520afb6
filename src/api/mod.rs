//! HTTP API

pub mod auth;
pub mod catalog;
pub mod contacts;
pub mod customers;
pub mod dashboard;
pub mod envelope;
pub mod error;
pub mod orders;
pub mod prices;
pub mod products;

pub use error::{ApiError, ApiResult};

use axum::routing::{get, post, put};
use axum::{middleware, Json, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/products", get(products::list).post(products::create))
        .route("/products/:id", get(products::get).put(products::update).delete(products::delete))
        .route("/orders", get(orders::list))
        .route("/orders/:id", get(orders::get).put(orders::update_status).delete(orders::delete))
        .route("/orders/:id/cancel", post(orders::cancel))
        .route("/customers", get(customers::list))
        .route("/dashboard", get(dashboard::summary))
        .route("/prices/bulk", post(prices::bulk_update))
        .route("/prices/:id", put(prices::update_single))
        .route("/price-history", get(prices::history))
        .route("/contacts", get(contacts::list))
        .route("/contacts/:id", put(contacts::update_status).delete(contacts::delete))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_admin));

    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "gopak-storefront"})) }))
        .route("/api/bag-sizes", get(catalog::bag_sizes))
        .route("/api/prices", get(catalog::price_list))
        .route("/api/orders", post(orders::place))
        .route("/api/contact", post(contacts::submit))
        .nest("/api/admin", admin)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
