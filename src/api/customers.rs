//! Admin customer list

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use super::envelope::Envelope;
use super::error::ApiResult;
use crate::domain::aggregates::Customer;
use crate::state::AppState;

#[derive(Serialize)]
pub struct CustomerList {
    pub customers: Vec<Customer>,
    pub count: usize,
}

/// GET /api/admin/customers
pub async fn list(State(s): State<AppState>) -> ApiResult<Json<Envelope<CustomerList>>> {
    let customers = s.store.list_customers().await?;
    Ok(Envelope::ok(CustomerList { count: customers.len(), customers }))
}
