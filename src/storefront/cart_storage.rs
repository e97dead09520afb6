//! Cart persistence

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::aggregates::Cart;

#[derive(Debug, Error)]
pub enum CartStorageError {
    #[error("cart file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cart file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub trait CartStorage {
    /// A cart that was never saved loads as empty.
    fn load(&self) -> Result<Cart, CartStorageError>;
    fn save(&mut self, cart: &Cart) -> Result<(), CartStorageError>;
}

#[derive(Debug, Default)]
pub struct MemoryCartStorage {
    saved: Option<Cart>,
}

impl MemoryCartStorage {
    pub fn new() -> Self { Self::default() }
}

impl CartStorage for MemoryCartStorage {
    fn load(&self) -> Result<Cart, CartStorageError> {
        Ok(self.saved.clone().unwrap_or_default())
    }

    fn save(&mut self, cart: &Cart) -> Result<(), CartStorageError> {
        self.saved = Some(cart.clone());
        Ok(())
    }
}

/// Keeps the cart as a JSON array of items in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileCartStorage {
    path: PathBuf,
}

impl JsonFileCartStorage {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path { &self.path }
}

impl CartStorage for JsonFileCartStorage {
    fn load(&self) -> Result<Cart, CartStorageError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(Cart::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Cart::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, cart: &Cart) -> Result<(), CartStorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(cart)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::CartItem;
    use crate::pricing::{quote, Fabric, PrintOption, QuoteRequest};
    use rust_decimal::Decimal;

    fn cart_with_one_item() -> Cart {
        let q = quote(&QuoteRequest::new(Decimal::new(250, 2), 2500)).unwrap();
        let mut cart = Cart::new();
        cart.push(CartItem::from_quote("Düz Çanta (Yan Körüksüz)", "Orta Boy", Decimal::ONE, Fabric::Premium, PrintOption::Custom, &q));
        cart
    }

    #[test]
    fn test_json_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonFileCartStorage::new(dir.path().join("nested/cart.json"));
        assert!(storage.load().unwrap().is_empty());

        let cart = cart_with_one_item();
        storage.save(&cart).unwrap();
        assert_eq!(storage.load().unwrap(), cart);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(JsonFileCartStorage::new(&path).load(), Err(CartStorageError::Json(_))));
    }

    #[test]
    fn test_memory_storage() {
        let mut storage = MemoryCartStorage::new();
        assert!(storage.load().unwrap().is_empty());
        storage.save(&cart_with_one_item()).unwrap();
        assert_eq!(storage.load().unwrap().len(), 1);
    }
}
