//! Admin dashboard summary

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use super::envelope::Envelope;
use super::error::ApiResult;
use crate::admin::DashboardSummary;
use crate::state::AppState;

#[derive(Serialize)]
pub struct DashboardPayload {
    pub dashboard: DashboardSummary,
}

/// GET /api/admin/dashboard
pub async fn summary(State(s): State<AppState>) -> ApiResult<Json<Envelope<DashboardPayload>>> {
    let (orders, customers, products) =
        tokio::try_join!(s.store.list_orders(), s.store.list_customers(), s.store.list_products())?;
    let dashboard = DashboardSummary::compose(&orders, &customers, &products);
    Ok(Envelope::ok(DashboardPayload { dashboard }))
}
