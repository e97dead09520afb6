//! Product Aggregate
//!
//! Products double as the bag-size catalog: a product with a `bag_type` is one size
//! of that bag family, its `price` is the per-bag base price, and its
//! `min_order_quantity` is the smallest quantity that can be ordered.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::value_objects::{Price, PriceError};

pub const GUSSETED_BAG: &str = "3D Çanta (Yan Körüklü)";
pub const FLAT_BAG: &str = "Düz Çanta (Yan Körüksüz)";

pub const CATEGORY_STANDARD: &str = "Standart";
pub const CATEGORY_CUSTOM: &str = "Özel";
pub const CATEGORY_PREMIUM: &str = "Premium";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub category: String,
    pub bag_type: Option<String>,
    pub bag_dimensions: Option<String>,
    pub min_order_quantity: i32,
    pub bag_description: Option<String>,
    pub has_custom_print: bool,
    pub image_url: Option<String>,
    pub is_custom: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating or fully replacing a product.
#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
pub struct ProductInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub stock_quantity: i32,
    #[serde(default = "default_category")]
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    #[serde(default)]
    pub bag_type: Option<String>,
    #[serde(default)]
    pub bag_dimensions: Option<String>,
    #[serde(default = "default_min_order_quantity")]
    #[validate(range(min = 1))]
    pub min_order_quantity: i32,
    #[serde(default)]
    pub bag_description: Option<String>,
    #[serde(default)]
    pub has_custom_print: bool,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_custom: bool,
}

fn default_category() -> String { CATEGORY_STANDARD.to_string() }
fn default_min_order_quantity() -> i32 { 1 }

impl ProductInput {
    pub fn new(name: impl Into<String>, price: Decimal) -> Self {
        Self {
            name: name.into(), description: None, price, stock_quantity: 0, category: default_category(),
            bag_type: None, bag_dimensions: None, min_order_quantity: 1, bag_description: None,
            has_custom_print: false, image_url: None, is_custom: false,
        }
    }

    pub fn bag(mut self, bag_type: &str, dimensions: &str, min_order_quantity: i32) -> Self {
        self.bag_type = Some(bag_type.to_string());
        self.bag_dimensions = Some(dimensions.to_string());
        self.min_order_quantity = min_order_quantity;
        self
    }

    pub fn with_bag_description(mut self, description: impl Into<String>) -> Self {
        self.bag_description = Some(description.into());
        self
    }

    /// Checks the `price >= 0` invariant and rounds the price to two decimals.
    pub fn checked_price(&self) -> Result<Price, PriceError> { Price::new(self.price) }

    /// Builds a product row; stores use this so every backend fills fields the same way.
    pub fn into_product(self, id: i64, price: Price, now: DateTime<Utc>) -> Product {
        Product {
            id, name: self.name, description: self.description, price: price.amount(),
            stock_quantity: self.stock_quantity, category: self.category, bag_type: self.bag_type,
            bag_dimensions: self.bag_dimensions, min_order_quantity: self.min_order_quantity,
            bag_description: self.bag_description, has_custom_print: self.has_custom_print,
            image_url: self.image_url, is_custom: self.is_custom, created_at: now, updated_at: now,
        }
    }
}

/// A product as shown in the bag-size catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BagSize {
    pub id: i64,
    pub category: String,
    pub size_name: String,
    pub dimensions: String,
    pub min_quantity: u32,
    pub base_price: Decimal,
    /// Scales `base_price` in quotes for this size.
    #[serde(default = "unit_multiplier")]
    pub size_multiplier: Decimal,
    pub description: String,
    pub is_active: bool,
}

fn unit_multiplier() -> Decimal { Decimal::ONE }

impl BagSize {
    /// `None` for products that are not bags.
    pub fn from_product(product: &Product) -> Option<Self> {
        let category = product.bag_type.clone()?;
        let description = product.bag_description.clone()
            .filter(|d| !d.is_empty())
            .or_else(|| product.description.clone())
            .unwrap_or_default();
        Some(Self {
            id: product.id,
            category,
            size_name: product.name.clone(),
            dimensions: product.bag_dimensions.clone().unwrap_or_default(),
            min_quantity: u32::try_from(product.min_order_quantity).unwrap_or(0),
            base_price: product.price,
            size_multiplier: Decimal::ONE,
            description,
            is_active: true,
        })
    }

    pub fn with_multiplier(mut self, multiplier: Decimal) -> Self {
        self.size_multiplier = multiplier;
        self
    }
}

/// Sort rank of a bag family: gusseted bags first, then flat bags, then anything else.
pub fn bag_type_rank(bag_type: Option<&str>) -> u8 {
    match bag_type {
        Some(GUSSETED_BAG) => 1,
        Some(FLAT_BAG) => 2,
        _ => 3,
    }
}

/// Sort rank used by the public price list: bag families, then categories.
pub fn price_list_rank(product: &Product) -> u8 {
    match (product.bag_type.as_deref(), product.category.as_str()) {
        (Some(GUSSETED_BAG), _) => 1,
        (Some(FLAT_BAG), _) => 2,
        (_, CATEGORY_STANDARD) => 3,
        (_, CATEGORY_CUSTOM) => 4,
        (_, CATEGORY_PREMIUM) => 5,
        _ => 6,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn product(id: i64, name: &str, price: &str) -> Product {
        ProductInput::new(name, price.parse().unwrap())
            .into_product(id, Price::new(price.parse().unwrap()).unwrap(), Utc::now())
    }

    #[test]
    fn test_bag_size_from_product() {
        let mut p = product(7, "Orta Boy", "2.50");
        assert!(BagSize::from_product(&p).is_none());

        p.bag_type = Some(FLAT_BAG.into());
        p.bag_dimensions = Some("40 × 40 × 10".into());
        p.min_order_quantity = 2500;
        p.description = Some("fallback".into());
        let size = BagSize::from_product(&p).unwrap();
        assert_eq!(size.category, FLAT_BAG);
        assert_eq!(size.min_quantity, 2500);
        assert_eq!(size.description, "fallback");

        p.bag_description = Some("Giyim markaları için".into());
        assert_eq!(BagSize::from_product(&p).unwrap().description, "Giyim markaları için");
    }

    #[test]
    fn test_price_list_rank() {
        let mut a = product(1, "a", "1");
        a.bag_type = Some(GUSSETED_BAG.into());
        let mut b = product(2, "b", "1");
        b.category = CATEGORY_PREMIUM.into();
        let c = product(3, "c", "1");
        assert!(price_list_rank(&a) < price_list_rank(&c));
        assert!(price_list_rank(&c) < price_list_rank(&b));
        assert_eq!(bag_type_rank(Some("other")), 3);
    }

    #[test]
    fn test_input_validation() {
        let mut input = ProductInput::new("", Decimal::ONE);
        assert!(input.validate().is_err());
        input.name = "Kraft".into();
        assert!(input.validate().is_ok());
        input.min_order_quantity = 0;
        assert!(input.validate().is_err());
        assert!(ProductInput::new("x", Decimal::NEGATIVE_ONE).checked_price().is_err());
    }
}
