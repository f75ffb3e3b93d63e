//! Cart Manager
//!
//! Every mutation reads the whole cart, applies one change and writes the
//! whole cart back.

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};
use crate::domain::aggregates::{Cart, Product};
use crate::domain::value_objects::Role;
use crate::pricing::{self, PricedLine};
use crate::store::{CartBackup, Store};
use crate::{Result, StorefrontError};

pub struct CartService<'a> {
    store: &'a Store,
}

impl<'a> CartService<'a> {
    pub fn new(store: &'a Store) -> Self { Self { store } }

    pub fn get(&self) -> Cart { self.store.cart() }

    fn product(&self, id: &str) -> Result<Product> {
        self.store.products().into_iter().find(|p| p.id == id).ok_or(StorefrontError::ProductNotFound)
    }

    fn role(&self) -> Option<Role> { self.store.session().map(|s| s.role) }

    pub fn add(&self, product_id: &str, quantity: u32) -> Result<Cart> {
        let _guard = self.store.lock();
        let product = self.product(product_id)?;
        let mut cart = self.get();
        if let Err(e) = cart.add(&product, quantity) {
            warn!(product_id, quantity, error = %e, "add to cart rejected");
            return Err(e);
        }
        self.store.set_cart(&cart)?;
        Ok(cart)
    }

    /// Clamps to `[1, stock]`; `quantity <= 0` removes the line.
    pub fn set_quantity(&self, product_id: &str, quantity: i64) -> Result<Cart> {
        let _guard = self.store.lock();
        let mut cart = self.get();
        if quantity <= 0 {
            cart.remove(product_id);
        } else {
            let stock = self.product(product_id)?.stock;
            cart.set_quantity(product_id, quantity, stock);
        }
        self.store.set_cart(&cart)?;
        Ok(cart)
    }

    /// Idempotent; removing an absent line is not an error.
    pub fn remove(&self, product_id: &str) -> Result<Cart> {
        let _guard = self.store.lock();
        let mut cart = self.get();
        cart.remove(product_id);
        self.store.set_cart(&cart)?;
        Ok(cart)
    }

    pub fn clear(&self) -> Result<()> {
        let _guard = self.store.lock();
        self.store.set_cart(&Cart::default())
    }

    pub fn item_count(&self) -> u32 { self.get().item_count() }

    /// Lines priced for the acting role.
    pub fn lines(&self) -> Vec<PricedLine> {
        pricing::price_lines(&self.get(), &self.store.products(), self.role())
    }

    pub fn total(&self) -> Decimal {
        pricing::cart_total(&self.get(), &self.store.products(), self.role())
    }

    pub fn save_backup(&self) -> Result<CartBackup> {
        let _guard = self.store.lock();
        let cart = self.get();
        if cart.is_empty() {
            return Err(StorefrontError::Validation("cart is empty".into()));
        }
        let backup = CartBackup { items: cart.items().to_vec(), saved_at: Utc::now(), total: self.total() };
        self.store.set_cart_backup(&backup)?;
        info!(lines = backup.items.len(), "cart saved");
        Ok(backup)
    }

    /// Replaces the cart with the saved copy as-is.
    pub fn restore_backup(&self) -> Result<Cart> {
        let _guard = self.store.lock();
        let backup = self.store.cart_backup()
            .ok_or_else(|| StorefrontError::Validation("no saved cart".into()))?;
        let cart = Cart::from_items(backup.items);
        self.store.set_cart(&cart)?;
        info!(lines = cart.line_count(), "cart restored");
        Ok(cart)
    }
}
