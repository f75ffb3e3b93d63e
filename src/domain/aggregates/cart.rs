//! Cart Aggregate

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use crate::domain::aggregates::Product;
use crate::{Result, StorefrontError};

/// The process-wide cart. Serialized as a bare JSON array of lines.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
}

impl CartItem {
    pub fn new(product_id: impl Into<String>, quantity: u32) -> Self {
        Self { product_id: product_id.into(), quantity, price: None }
    }
}

impl Cart {
    pub fn from_items(items: Vec<CartItem>) -> Self {
        Self { items: items.into_iter().filter(|i| i.quantity > 0).collect() }
    }

    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn line_count(&self) -> usize { self.items.len() }
    pub fn item_count(&self) -> u32 { self.items.iter().fold(0, |n, i| n.saturating_add(i.quantity)) }

    pub fn quantity_of(&self, product_id: &str) -> u32 {
        self.items.iter().find(|i| i.product_id == product_id).map_or(0, |i| i.quantity)
    }

    /// Merges `quantity` units into the product's line. Rejected calls leave
    /// the cart untouched.
    pub fn add(&mut self, product: &Product, quantity: u32) -> Result<()> {
        if quantity == 0 {
            return Err(StorefrontError::Validation("quantity must be at least 1".into()));
        }
        if product.stock == 0 {
            return Err(StorefrontError::OutOfStock);
        }
        let requested = self.quantity_of(&product.id).saturating_add(quantity);
        if requested > product.stock {
            return Err(StorefrontError::InsufficientStock { requested, available: product.stock });
        }
        match self.items.iter_mut().find(|i| i.product_id == product.id) {
            Some(existing) => existing.quantity = requested,
            None => self.items.push(CartItem::new(&product.id, quantity)),
        }
        Ok(())
    }

    /// Clamps to `[1, stock]`; zero or negative removes the line, and so
    /// does a product that has sold out. Unknown lines are left alone.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64, stock: u32) {
        if quantity <= 0 || stock == 0 {
            self.remove(product_id);
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            let capped = quantity.min(i64::from(stock)).max(1);
            item.quantity = u32::try_from(capped).unwrap_or(u32::MAX);
        }
    }

    /// Returns whether a line was removed.
    pub fn remove(&mut self, product_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        self.items.len() != before
    }

    pub fn clear(&mut self) { self.items.clear(); }
}
