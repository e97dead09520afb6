//! Storefront client state
//!
//! [`Storefront`] owns the catalog, the configurator selection and the cart. Every
//! user action is a [`StorefrontCommand`]; dispatching one returns the events the
//! UI should react to.

pub mod cart_storage;
pub mod catalog;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::aggregates::product::GUSSETED_BAG;
use crate::domain::aggregates::{BagSize, Cart, CartError, CartItem};
use crate::pricing::{self, Fabric, PricingError, PrintOption, Quote, QuoteRequest, Step};

pub use cart_storage::{CartStorage, CartStorageError, JsonFileCartStorage, MemoryCartStorage};
pub use catalog::Catalog;

/// Quantity shown before any size is picked.
pub const INITIAL_QUANTITY: u32 = 2500;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub bag_type: String,
    pub fabric: Fabric,
    pub print: PrintOption,
    pub size_id: Option<i64>,
    pub size_multiplier: Decimal,
    pub quantity: u32,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            bag_type: GUSSETED_BAG.to_string(),
            fabric: Fabric::Standard,
            print: PrintOption::None,
            size_id: None,
            size_multiplier: Decimal::ONE,
            quantity: INITIAL_QUANTITY,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum StorefrontCommand {
    SelectBagType(String),
    SelectFabric(Fabric),
    SelectPrint(PrintOption),
    SelectSize(i64),
    /// Overrides the multiplier picked up from the selected size.
    SetSizeMultiplier(Decimal),
    SetQuantity(u32),
    StepQuantity(Step),
    /// Index into the size's quantity presets.
    ChoosePreset(usize),
    AddToCart,
    RemoveFromCart(Uuid),
    ClearCart,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StorefrontEvent {
    SizesChanged { bag_type: String, size_ids: Vec<i64> },
    QuoteUpdated(Quote),
    BelowMinimum { minimum: u32 },
    AddedToCart(CartItem),
    CartChanged { count: u64, total: Decimal },
}

#[derive(Debug, Error)]
pub enum ConfiguratorError {
    #[error("unknown size {0}")]
    UnknownSize(i64),
    #[error("select a size first")]
    NoSizeSelected,
    #[error("minimum order quantity is {minimum} (got {quantity})")]
    BelowMinimum { quantity: u32, minimum: u32 },
    #[error("no quantity preset at position {0}")]
    PresetOutOfRange(usize),
    #[error(transparent)]
    Pricing(#[from] PricingError),
    #[error(transparent)]
    Cart(#[from] CartError),
    #[error(transparent)]
    Storage(#[from] CartStorageError),
}

pub struct Storefront<S: CartStorage> {
    catalog: Catalog,
    selection: Selection,
    cart: Cart,
    storage: S,
}

impl<S: CartStorage> Storefront<S> {
    /// Restores the saved cart; an unreadable cart starts empty.
    pub fn new(catalog: Catalog, storage: S) -> Self {
        let cart = storage.load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not restore cart, starting empty");
            Cart::new()
        });
        Self { catalog, selection: Selection::default(), cart, storage }
    }

    pub fn catalog(&self) -> &Catalog { &self.catalog }
    pub fn selection(&self) -> &Selection { &self.selection }
    pub fn cart(&self) -> &Cart { &self.cart }
    pub fn storage(&self) -> &S { &self.storage }

    pub fn selected_size(&self) -> Option<&BagSize> {
        self.selection.size_id.and_then(|id| self.catalog.find(id))
    }

    /// `None` until a size is picked or while the quantity is zero.
    pub fn current_quote(&self) -> Option<Quote> {
        let size = self.selected_size()?;
        let req = QuoteRequest::new(size.base_price, self.selection.quantity)
            .with_multiplier(self.selection.size_multiplier)
            .with_fabric(self.selection.fabric)
            .with_print(self.selection.print);
        pricing::quote(&req).ok()
    }

    pub fn quantity_presets(&self) -> Option<[u32; 4]> {
        self.selected_size().map(|s| pricing::quantity_presets(s.min_quantity))
    }

    pub fn dispatch(&mut self, command: StorefrontCommand) -> Result<Vec<StorefrontEvent>, ConfiguratorError> {
        match command {
            StorefrontCommand::SelectBagType(bag_type) => {
                let size_ids = self.catalog.sizes_for(&bag_type).map(|s| s.id).collect();
                self.selection.bag_type = bag_type.clone();
                self.selection.size_id = None;
                Ok(vec![StorefrontEvent::SizesChanged { bag_type, size_ids }])
            }
            StorefrontCommand::SelectFabric(fabric) => {
                self.selection.fabric = fabric;
                Ok(self.quote_events())
            }
            StorefrontCommand::SelectPrint(print) => {
                self.selection.print = print;
                Ok(self.quote_events())
            }
            StorefrontCommand::SelectSize(id) => {
                let size = self.catalog.find(id).ok_or(ConfiguratorError::UnknownSize(id))?;
                self.selection.bag_type = size.category.clone();
                self.selection.quantity = size.min_quantity;
                self.selection.size_multiplier = size.size_multiplier;
                self.selection.size_id = Some(id);
                Ok(self.quote_events())
            }
            StorefrontCommand::SetSizeMultiplier(multiplier) => {
                if multiplier <= Decimal::ZERO {
                    return Err(PricingError::NonPositiveMultiplier.into());
                }
                self.selection.size_multiplier = multiplier;
                Ok(self.quote_events())
            }
            StorefrontCommand::SetQuantity(quantity) => {
                self.selection.quantity = quantity;
                Ok(self.quote_events())
            }
            StorefrontCommand::StepQuantity(step) => {
                let minimum = self.selected_size().map(|s| s.min_quantity);
                self.selection.quantity = pricing::step_quantity(self.selection.quantity, step, minimum);
                Ok(self.quote_events())
            }
            StorefrontCommand::ChoosePreset(index) => {
                let presets = self.quantity_presets().ok_or(ConfiguratorError::NoSizeSelected)?;
                let quantity = presets.get(index).copied().ok_or(ConfiguratorError::PresetOutOfRange(index))?;
                self.selection.quantity = quantity;
                Ok(self.quote_events())
            }
            StorefrontCommand::AddToCart => self.add_to_cart(),
            StorefrontCommand::RemoveFromCart(id) => {
                let mut cart = self.cart.clone();
                cart.remove(id)?;
                self.commit(cart)?;
                Ok(vec![self.cart_changed()])
            }
            StorefrontCommand::ClearCart => {
                self.commit(Cart::new())?;
                Ok(vec![self.cart_changed()])
            }
        }
    }

    fn quote_events(&self) -> Vec<StorefrontEvent> {
        let Some(size) = self.selected_size() else {
            return Vec::new();
        };
        let mut events = Vec::new();
        if let Some(quote) = self.current_quote() {
            events.push(StorefrontEvent::QuoteUpdated(quote));
        }
        if !pricing::meets_minimum(self.selection.quantity, size.min_quantity) {
            events.push(StorefrontEvent::BelowMinimum { minimum: size.min_quantity });
        }
        events
    }

    fn add_to_cart(&mut self) -> Result<Vec<StorefrontEvent>, ConfiguratorError> {
        let size = self.selected_size().ok_or(ConfiguratorError::NoSizeSelected)?;
        let quantity = self.selection.quantity;
        if !pricing::meets_minimum(quantity, size.min_quantity) {
            return Err(ConfiguratorError::BelowMinimum { quantity, minimum: size.min_quantity });
        }
        let req = QuoteRequest::new(size.base_price, quantity)
            .with_multiplier(self.selection.size_multiplier)
            .with_fabric(self.selection.fabric)
            .with_print(self.selection.print);
        let quote = pricing::quote(&req)?;
        let label = format!("{} ({})", size.size_name, size.dimensions);
        let item = CartItem::from_quote(
            &self.selection.bag_type,
            &label,
            self.selection.size_multiplier,
            self.selection.fabric,
            self.selection.print,
            &quote,
        );

        let mut cart = self.cart.clone();
        cart.push(item.clone());
        self.commit(cart)?;
        tracing::debug!(item = %item.id, total = %item.total, "added to cart");
        Ok(vec![StorefrontEvent::AddedToCart(item), self.cart_changed()])
    }

    /// The cart only changes once storage has accepted it.
    fn commit(&mut self, cart: Cart) -> Result<(), CartStorageError> {
        self.storage.save(&cart)?;
        self.cart = cart;
        Ok(())
    }

    fn cart_changed(&self) -> StorefrontEvent {
        StorefrontEvent::CartChanged { count: self.cart.item_count(), total: self.cart.total() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::product::FLAT_BAG;

    fn dec(s: &str) -> Decimal { s.parse().unwrap() }

    fn storefront() -> Storefront<MemoryCartStorage> {
        Storefront::new(Catalog::builtin(), MemoryCartStorage::new())
    }

    #[test]
    fn test_select_size_sets_minimum_quantity() {
        let mut sf = storefront();
        let events = sf.dispatch(StorefrontCommand::SelectSize(3)).unwrap();
        assert_eq!(sf.selection().quantity, 1500);
        match &events[..] {
            [StorefrontEvent::QuoteUpdated(q)] => {
                assert_eq!(q.unit_price, dec("3.50"));
                assert_eq!(q.total, dec("4725.00"));
            }
            other => panic!("unexpected events: {other:?}"),
        }
    }

    #[test]
    fn test_bag_type_change_clears_size() {
        let mut sf = storefront();
        sf.dispatch(StorefrontCommand::SelectSize(1)).unwrap();
        let events = sf.dispatch(StorefrontCommand::SelectBagType(FLAT_BAG.into())).unwrap();
        assert_eq!(events, vec![StorefrontEvent::SizesChanged { bag_type: FLAT_BAG.into(), size_ids: vec![7, 6, 8, 5] }]);
        assert!(sf.selected_size().is_none());
        assert!(sf.dispatch(StorefrontCommand::SelectFabric(Fabric::Premium)).unwrap().is_empty());
    }

    #[test]
    fn test_below_minimum_blocks_add_to_cart() {
        let mut sf = storefront();
        assert!(matches!(sf.dispatch(StorefrontCommand::AddToCart), Err(ConfiguratorError::NoSizeSelected)));

        sf.dispatch(StorefrontCommand::SelectSize(1)).unwrap();
        let events = sf.dispatch(StorefrontCommand::SetQuantity(600)).unwrap();
        assert!(events.contains(&StorefrontEvent::BelowMinimum { minimum: 2500 }));
        assert!(matches!(
            sf.dispatch(StorefrontCommand::AddToCart),
            Err(ConfiguratorError::BelowMinimum { quantity: 600, minimum: 2500 })
        ));
        assert!(sf.cart().is_empty());
    }

    #[test]
    fn test_step_and_presets() {
        let mut sf = storefront();
        sf.dispatch(StorefrontCommand::StepQuantity(Step::Down)).unwrap();
        assert_eq!(sf.selection().quantity, 2400);
        assert!(matches!(sf.dispatch(StorefrontCommand::ChoosePreset(0)), Err(ConfiguratorError::NoSizeSelected)));

        sf.dispatch(StorefrontCommand::SelectSize(5)).unwrap();
        sf.dispatch(StorefrontCommand::StepQuantity(Step::Down)).unwrap();
        assert_eq!(sf.selection().quantity, 3000);
        sf.dispatch(StorefrontCommand::ChoosePreset(1)).unwrap();
        assert_eq!(sf.selection().quantity, 4500);
        assert!(matches!(sf.dispatch(StorefrontCommand::ChoosePreset(4)), Err(ConfiguratorError::PresetOutOfRange(4))));
    }

    #[test]
    fn test_add_remove_clear() {
        let mut sf = storefront();
        sf.dispatch(StorefrontCommand::SelectSize(6)).unwrap();
        sf.dispatch(StorefrontCommand::SelectPrint(PrintOption::Custom)).unwrap();
        let events = sf.dispatch(StorefrontCommand::AddToCart).unwrap();
        let StorefrontEvent::AddedToCart(item) = &events[0] else {
            panic!("expected AddedToCart, got {events:?}");
        };
        assert_eq!(item.unit_price, dec("3.50"));
        assert_eq!(item.total, dec("7875.00"));
        assert_eq!(item.size, "Orta Boy (40 × 40 × 10)");
        assert_eq!(events[1], StorefrontEvent::CartChanged { count: 2500, total: dec("7875.00") });
        assert_eq!(sf.storage().load().unwrap().len(), 1);

        let id = item.id;
        sf.dispatch(StorefrontCommand::AddToCart).unwrap();
        sf.dispatch(StorefrontCommand::RemoveFromCart(id)).unwrap();
        assert_eq!(sf.cart().len(), 1);
        assert!(matches!(sf.dispatch(StorefrontCommand::RemoveFromCart(id)), Err(ConfiguratorError::Cart(_))));

        let events = sf.dispatch(StorefrontCommand::ClearCart).unwrap();
        assert_eq!(events, vec![StorefrontEvent::CartChanged { count: 0, total: Decimal::ZERO }]);
        assert!(sf.storage().load().unwrap().is_empty());
    }

    /// Loads fine, refuses every save.
    #[derive(Default)]
    struct FullDisk {
        saved: Cart,
    }

    impl CartStorage for FullDisk {
        fn load(&self) -> Result<Cart, CartStorageError> { Ok(self.saved.clone()) }

        fn save(&mut self, _cart: &Cart) -> Result<(), CartStorageError> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into())
        }
    }

    #[test]
    fn test_failed_save_keeps_cart_unchanged() {
        let mut sf = Storefront::new(Catalog::builtin(), FullDisk::default());
        sf.dispatch(StorefrontCommand::SelectSize(1)).unwrap();
        assert!(matches!(sf.dispatch(StorefrontCommand::AddToCart), Err(ConfiguratorError::Storage(_))));
        assert!(sf.cart().is_empty());

        let item = CartItem::from_quote(
            GUSSETED_BAG,
            "Küçük Boy",
            Decimal::ONE,
            Fabric::Standard,
            PrintOption::None,
            &pricing::quote(&QuoteRequest::new(dec("2.50"), 2500)).unwrap(),
        );
        let id = item.id;
        let mut sf = Storefront::new(Catalog::builtin(), FullDisk { saved: Cart::from_items(vec![item]) });
        assert_eq!(sf.cart().len(), 1);
        assert!(sf.dispatch(StorefrontCommand::RemoveFromCart(id)).is_err());
        assert!(sf.dispatch(StorefrontCommand::ClearCart).is_err());
        assert_eq!(sf.cart().len(), 1);
    }

    #[test]
    fn test_size_multiplier_scales_quote() {
        let sizes = vec![
            catalog::default_sizes()[0].clone().with_multiplier(dec("1.2")),
            catalog::default_sizes()[1].clone(),
        ];
        let mut sf = Storefront::new(Catalog::new(sizes), MemoryCartStorage::new());
        sf.dispatch(StorefrontCommand::SelectSize(1)).unwrap();
        assert_eq!(sf.selection().size_multiplier, dec("1.2"));
        // 2.50 x 1.2
        assert_eq!(sf.current_quote().unwrap().unit_price, dec("3.00"));

        sf.dispatch(StorefrontCommand::SelectSize(2)).unwrap();
        assert_eq!(sf.current_quote().unwrap().unit_price, dec("3.00"));
        let events = sf.dispatch(StorefrontCommand::SetSizeMultiplier(dec("1.5"))).unwrap();
        assert!(matches!(&events[..], [StorefrontEvent::QuoteUpdated(q)] if q.unit_price == dec("4.50")));
        assert!(matches!(
            sf.dispatch(StorefrontCommand::SetSizeMultiplier(Decimal::ZERO)),
            Err(ConfiguratorError::Pricing(PricingError::NonPositiveMultiplier))
        ));

        sf.dispatch(StorefrontCommand::AddToCart).unwrap();
        assert_eq!(sf.cart().items()[0].size_multiplier, dec("1.5"));
    }

    #[test]
    fn test_unreadable_cart_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.json");
        std::fs::write(&path, "[{").unwrap();
        let sf = Storefront::new(Catalog::builtin(), JsonFileCartStorage::new(&path));
        assert!(sf.cart().is_empty());
    }
}
