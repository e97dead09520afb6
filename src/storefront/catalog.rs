//! Bag-size catalog
//!
//! The storefront normally loads its sizes from `GET /api/bag-sizes`. When that is
//! unavailable it falls back to the built-in sizes below, which also seed the
//! in-memory store.

use rust_decimal::Decimal;

use crate::domain::aggregates::product::{bag_type_rank, FLAT_BAG, GUSSETED_BAG};
use crate::domain::aggregates::{BagSize, ProductInput};

const GUSSETED_NOTE: &str = "Pastane ve tatlıcılar için uygun";
const FLAT_NOTE: &str = "Giyim markaları ve kırtasiyeler için uygun";

struct DefaultSize {
    bag_type: &'static str,
    name: &'static str,
    dimensions: &'static str,
    min_quantity: u32,
    /// Hundredths.
    price_cents: i64,
    note: &'static str,
}

const fn size(
    bag_type: &'static str,
    name: &'static str,
    dimensions: &'static str,
    min_quantity: u32,
    price_cents: i64,
    note: &'static str,
) -> DefaultSize {
    DefaultSize { bag_type, name, dimensions, min_quantity, price_cents, note }
}

const DEFAULT_SIZES: [DefaultSize; 8] = [
    size(GUSSETED_BAG, "Küçük Boy", "30 × 25 × 10", 2500, 250, GUSSETED_NOTE),
    size(GUSSETED_BAG, "Orta Boy", "25 × 20 × 15", 2500, 300, GUSSETED_NOTE),
    size(GUSSETED_BAG, "Büyük Boy", "35 × 20 × 25", 1500, 350, GUSSETED_NOTE),
    size(GUSSETED_BAG, "Extra Büyük", "35 × 25 × 30", 1500, 400, GUSSETED_NOTE),
    size(FLAT_BAG, "Küçük Boy", "30 × 40 × 10", 3000, 200, FLAT_NOTE),
    size(FLAT_BAG, "Orta Boy", "40 × 40 × 10", 2500, 250, FLAT_NOTE),
    size(FLAT_BAG, "Büyük Boy", "50 × 50 × 10", 2000, 300, FLAT_NOTE),
    size(FLAT_BAG, "Extra Büyük", "40 × 45", 2500, 350, FLAT_NOTE),
];

/// The eight built-in sizes, ids 1 to 8.
pub fn default_sizes() -> Vec<BagSize> {
    DEFAULT_SIZES.iter().enumerate().map(|(i, s)| BagSize {
        id: i as i64 + 1,
        category: s.bag_type.to_string(),
        size_name: s.name.to_string(),
        dimensions: s.dimensions.to_string(),
        min_quantity: s.min_quantity,
        base_price: Decimal::new(s.price_cents, 2),
        size_multiplier: Decimal::ONE,
        description: s.note.to_string(),
        is_active: true,
    }).collect()
}

/// The built-in sizes as product rows, in id order.
pub fn seed_products() -> Vec<ProductInput> {
    DEFAULT_SIZES.iter().map(|s| {
        let mut input = ProductInput::new(s.name, Decimal::new(s.price_cents, 2))
            .bag(s.bag_type, s.dimensions, s.min_quantity as i32)
            .with_bag_description(s.note);
        input.stock_quantity = 10_000;
        input
    }).collect()
}

/// Public ordering: gusseted bags, flat bags, the rest; smaller minimums first.
pub fn sort_sizes(sizes: &mut [BagSize]) {
    sizes.sort_by_key(|s| (bag_type_rank(Some(&s.category)), s.min_quantity, s.id));
}

#[derive(Clone, Debug, PartialEq)]
pub struct Catalog {
    sizes: Vec<BagSize>,
    fallback: bool,
}

impl Catalog {
    pub fn new(mut sizes: Vec<BagSize>) -> Self {
        if sizes.is_empty() {
            return Self::builtin();
        }
        sort_sizes(&mut sizes);
        Self { sizes, fallback: false }
    }

    pub fn builtin() -> Self {
        let mut sizes = default_sizes();
        sort_sizes(&mut sizes);
        Self { sizes, fallback: true }
    }

    /// Uses the server's sizes, or the built-in ones if loading failed.
    pub fn from_server<E: std::fmt::Display>(loaded: Result<Vec<BagSize>, E>) -> Self {
        match loaded {
            Ok(sizes) => Self::new(sizes),
            Err(e) => {
                tracing::warn!(error = %e, "bag sizes unavailable, using built-in catalog");
                Self::builtin()
            }
        }
    }

    pub fn is_fallback(&self) -> bool { self.fallback }
    pub fn sizes(&self) -> &[BagSize] { &self.sizes }

    pub fn find(&self, id: i64) -> Option<&BagSize> {
        self.sizes.iter().find(|s| s.id == id)
    }

    /// Active sizes belonging to one bag family.
    pub fn sizes_for<'a>(&'a self, bag_type: &'a str) -> impl Iterator<Item = &'a BagSize> + 'a {
        self.sizes.iter().filter(move |s| s.is_active && s.category == bag_type)
    }
}
