//! Public catalog: bag sizes and the price list

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use super::envelope::Envelope;
use super::error::ApiResult;
use crate::domain::aggregates::product::price_list_rank;
use crate::domain::aggregates::{BagSize, Product};
use crate::state::AppState;
use crate::storefront::catalog::sort_sizes;

#[derive(Serialize)]
pub struct SizeList {
    pub sizes: Vec<BagSize>,
    pub count: usize,
}

#[derive(Serialize)]
pub struct PriceList {
    pub products: Vec<Product>,
    pub count: usize,
}

/// GET /api/bag-sizes
pub async fn bag_sizes(State(s): State<AppState>) -> ApiResult<Json<Envelope<SizeList>>> {
    let products = s.store.list_products().await?;
    let mut sizes: Vec<BagSize> = products.iter().filter_map(BagSize::from_product).collect();
    sort_sizes(&mut sizes);
    Ok(Envelope::ok(SizeList { count: sizes.len(), sizes }))
}

/// GET /api/prices
pub async fn price_list(State(s): State<AppState>) -> ApiResult<Json<Envelope<PriceList>>> {
    let mut products = s.store.list_products().await?;
    products.sort_by(|a, b| price_list_rank(a).cmp(&price_list_rank(b)).then_with(|| a.name.cmp(&b.name)));
    Ok(Envelope::ok(PriceList { count: products.len(), products }))
}
