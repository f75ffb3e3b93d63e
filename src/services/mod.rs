//! Services over an injected [`Store`].
//!
//! Each service borrows the store for the duration of a call chain and
//! reads the acting role from the stored session, so nothing here holds
//! global state.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod orders;

pub use auth::{redirect_for, Auth, Registration, UserForm, UserUpdate};
pub use cart::CartService;
pub use catalog::Catalog;
pub use orders::{OrderSummary, Orders};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use crate::config::DEFAULT_WHATSAPP;
use crate::domain::aggregates::OrderStatus;
use crate::domain::value_objects::{Role, StockStatus};
use crate::store::Store;
use crate::{pricing, whatsapp};

#[derive(Debug)]
pub struct Storefront {
    store: Store,
    default_whatsapp: String,
}

/// Dashboard counters.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_users: usize,
    pub total_products: usize,
    pub total_orders: usize,
    pub pending_orders: usize,
    pub low_stock_products: usize,
    pub out_of_stock_products: usize,
    pub cart_items: u32,
    pub cart_total: Decimal,
}

impl Storefront {
    pub fn new(store: Store) -> Self {
        Self { store, default_whatsapp: DEFAULT_WHATSAPP.to_string() }
    }

    /// Seeds demo data into absent collections before handing the store over.
    pub fn open(store: Store) -> crate::Result<Self> {
        store.ensure_seed()?;
        Ok(Self::new(store))
    }

    pub fn with_default_whatsapp(mut self, phone: impl Into<String>) -> Self {
        self.default_whatsapp = phone.into();
        self
    }

    pub fn store(&self) -> &Store { &self.store }
    pub fn catalog(&self) -> Catalog<'_> { Catalog::new(&self.store) }
    pub fn cart(&self) -> CartService<'_> { CartService::new(&self.store) }
    pub fn auth(&self) -> Auth<'_> { Auth::new(&self.store) }
    pub fn orders(&self) -> Orders<'_> { Orders::new(&self.store) }

    /// Role of the current session, `None` when anonymous.
    pub fn acting_role(&self) -> Option<Role> { self.store.session().map(|s| s.role) }

    pub fn stats(&self) -> Stats {
        let products = self.store.products();
        let orders = self.store.orders();
        let cart = self.store.cart();
        let threshold = self.store.settings().low_stock_threshold;
        let count_stock = |status: StockStatus| products.iter().filter(|p| p.stock_status(threshold) == status).count();
        Stats {
            total_users: self.store.users().iter().filter(|u| u.active).count(),
            total_products: products.len(),
            total_orders: orders.len(),
            pending_orders: orders.iter().filter(|o| o.status == OrderStatus::Pending).count(),
            low_stock_products: count_stock(StockStatus::Low),
            out_of_stock_products: count_stock(StockStatus::Out),
            cart_items: cart.item_count(),
            cart_total: pricing::cart_total(&cart, &products, self.acting_role()),
        }
    }

    /// `wa.me` link for the current cart, `None` when the cart is empty.
    pub fn whatsapp_checkout_url(&self, date: NaiveDate) -> Option<String> {
        whatsapp::checkout_url(&self.store, self.store.session().as_ref(), date, &self.default_whatsapp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_on_seed() {
        let shop = Storefront::open(Store::in_memory()).unwrap();
        shop.cart().add("p1", 2).unwrap();
        let stats = shop.stats();
        assert_eq!(stats.total_users, 3);
        assert_eq!(stats.total_products, 3);
        assert_eq!(stats.low_stock_products, 1);
        assert_eq!(stats.out_of_stock_products, 1);
        assert_eq!(stats.cart_items, 2);
        assert_eq!(stats.cart_total, Decimal::new(198000, 0));
        assert_eq!(stats.pending_orders, 0);
    }
}
