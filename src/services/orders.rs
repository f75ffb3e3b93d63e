//! Order Lifecycle and quotes

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};
use crate::domain::aggregates::{Cart, DistributorOrderView, Order, OrderItem, OrderStatus, Quote, Session};
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::domain::value_objects::Role;
use crate::pricing;
use crate::store::Store;
use crate::{Result, StorefrontError};

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub pending: usize,
    pub processing: usize,
    pub shipped: usize,
    pub completed: usize,
    pub cancelled: usize,
    /// Sum of totals of completed orders.
    pub completed_sales: Decimal,
}

pub struct Orders<'a> {
    store: &'a Store,
}

impl<'a> Orders<'a> {
    pub fn new(store: &'a Store) -> Self { Self { store } }

    pub fn list(&self) -> Vec<Order> { self.store.orders() }

    pub fn get(&self, id: &str) -> Result<Order> {
        self.list().into_iter().find(|o| o.id == id).ok_or(StorefrontError::OrderNotFound)
    }

    /// The order as `session` may see it: admins see every order,
    /// distributors those holding one of their products, clients their own.
    pub fn get_for(&self, session: &Session, id: &str) -> Result<Order> {
        let order = self.get(id)?;
        let visible = match session.role {
            Role::Admin => true,
            Role::Distributor => order.distributor_view(&session.id, &self.store.products()).is_some(),
            Role::Client => order.customer_id.as_deref() == Some(session.id.as_str()),
        };
        if !visible {
            return Err(StorefrontError::Unauthorized);
        }
        Ok(order)
    }

    /// Total is fixed from `items` here and never recomputed.
    pub fn create(&self, customer_id: Option<String>, items: Vec<OrderItem>, notes: Option<String>) -> Result<Order> {
        let order = Order::create(customer_id, items, notes)?;
        let _guard = self.store.lock();
        self.insert(order)
    }

    /// Caller holds the store lock.
    fn insert(&self, mut order: Order) -> Result<Order> {
        let mut orders = self.list();
        orders.push(order.clone());
        self.store.set_orders(&orders)?;
        publish(order.take_events());
        Ok(order)
    }

    /// Turns the cart into an order at the current session's prices and
    /// empties the cart. Lines pointing at deleted products fail the whole
    /// checkout. Stock is left as it is.
    pub fn place_from_cart(&self, notes: Option<String>) -> Result<Order> {
        let _guard = self.store.lock();
        let cart = self.store.cart();
        if cart.is_empty() {
            return Err(StorefrontError::Validation("cart is empty".into()));
        }
        let session = self.store.session();
        let session = session.as_ref();
        let items = self.price_cart(&cart, session)?;
        let order = self.insert(Order::create(session.map(|s| s.id.clone()), items, notes)?)?;
        self.store.set_cart(&Cart::default())?;
        Ok(order)
    }

    fn price_cart(&self, cart: &Cart, session: Option<&Session>) -> Result<Vec<OrderItem>> {
        let products = self.store.products();
        let role = session.map(|s| s.role);
        cart.items().iter()
            .map(|item| {
                let product = products.iter().find(|p| p.id == item.product_id).ok_or_else(|| {
                    warn!(product_id = %item.product_id, "checkout found dangling cart line");
                    StorefrontError::ProductNotFound
                })?;
                if item.quantity > product.stock {
                    return Err(StorefrontError::InsufficientStock { requested: item.quantity, available: product.stock });
                }
                Ok(OrderItem {
                    product_id: product.id.clone(), quantity: item.quantity,
                    price: pricing::effective_price(product, role),
                })
            })
            .collect()
    }

    /// Unknown ids and rejected transitions leave every order untouched.
    pub fn update_status(&self, id: &str, status: OrderStatus) -> Result<Order> {
        let _guard = self.store.lock();
        let mut orders = self.list();
        let order = orders.iter_mut().find(|o| o.id == id).ok_or(StorefrontError::OrderNotFound)?;
        order.set_status(status)?;
        let events = order.take_events();
        let updated = order.clone();
        self.store.set_orders(&orders)?;
        publish(events);
        Ok(updated)
    }

    /// Orders that contain at least one of the distributor's products,
    /// narrowed to those lines.
    pub fn for_distributor(&self, distributor_id: &str) -> Vec<DistributorOrderView> {
        let products = self.store.products();
        self.list().iter().filter_map(|o| o.distributor_view(distributor_id, &products)).collect()
    }

    pub fn summary(&self) -> OrderSummary {
        self.list().iter().fold(OrderSummary::default(), |mut s, o| {
            match o.status {
                OrderStatus::Pending => s.pending += 1,
                OrderStatus::Processing => s.processing += 1,
                OrderStatus::Shipped => s.shipped += 1,
                OrderStatus::Completed => {
                    s.completed += 1;
                    s.completed_sales = s.completed_sales.saturating_add(o.total);
                }
                OrderStatus::Cancelled => s.cancelled += 1,
            }
            s
        })
    }

    // -------------------------------------------------------------------------
    // Quotes
    // -------------------------------------------------------------------------

    pub fn quotes(&self) -> Vec<Quote> { self.store.quotes() }

    pub fn add_quote(&self, customer_id: Option<String>, items: Vec<OrderItem>, notes: Option<String>) -> Result<Quote> {
        let quote = Quote::create(customer_id, items, notes);
        let _guard = self.store.lock();
        let mut quotes = self.quotes();
        quotes.push(quote.clone());
        self.store.set_quotes(&quotes)?;
        info!(quote_id = %quote.id, "quote created");
        Ok(quote)
    }
}

fn publish(events: Vec<DomainEvent>) {
    for event in events {
        match event {
            DomainEvent::Order(OrderEvent::Placed { order_id, total }) => {
                info!(%order_id, %total, "order placed");
            }
            DomainEvent::Order(OrderEvent::StatusChanged { order_id, from, to }) => {
                info!(%order_id, %from, %to, "order status changed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{Auth, CartService};

    fn seeded() -> Store {
        let store = Store::in_memory();
        store.ensure_seed().unwrap();
        store
    }

    #[test]
    fn test_place_from_cart_uses_session_prices() {
        let store = seeded();
        Auth::new(&store).login("distri@hb.local", "distri123").unwrap();
        CartService::new(&store).add("p1", 2).unwrap();
        let order = Orders::new(&store).place_from_cart(None).unwrap();
        assert_eq!(order.total, Decimal::new(150000, 0));
        assert_eq!(order.customer_id.as_deref(), Some("d1"));
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_empty_cart_checkout_rejected() {
        let store = seeded();
        assert!(matches!(Orders::new(&store).place_from_cart(None), Err(StorefrontError::Validation(_))));
    }

    #[test]
    fn test_dangling_line_fails_checkout() {
        let store = seeded();
        CartService::new(&store).add("p1", 1).unwrap();
        let mut products = store.products();
        products.retain(|p| p.id != "p1");
        store.set_products(&products).unwrap();
        assert_eq!(Orders::new(&store).place_from_cart(None), Err(StorefrontError::ProductNotFound));
        assert_eq!(store.cart().line_count(), 1);
        assert!(store.orders().is_empty());
    }

    #[test]
    fn test_distributor_projection() {
        let store = seeded();
        let mut products = store.products();
        products[1].owner = Some("d2".into());
        store.set_products(&products).unwrap();
        let orders = Orders::new(&store);
        orders.create(Some("c1".into()), vec![
            OrderItem { product_id: "p1".into(), quantity: 2, price: Decimal::new(99000, 0) },
            OrderItem { product_id: "p2".into(), quantity: 1, price: Decimal::new(75000, 0) },
        ], None).unwrap();
        orders.create(None, vec![OrderItem { product_id: "p2".into(), quantity: 1, price: Decimal::new(75000, 0) }], None).unwrap();

        let views = orders.for_distributor("d1");
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].items.len(), 1);
        assert_eq!(views[0].partial_total, Decimal::new(198000, 0));
        assert_eq!(orders.for_distributor("d2").len(), 2);
    }

    #[test]
    fn test_order_visibility_by_role() {
        let store = seeded();
        let auth = Auth::new(&store);
        let mut products = store.products();
        products[1].owner = Some("d2".into());
        store.set_products(&products).unwrap();
        let orders = Orders::new(&store);
        let order = orders.create(Some("c1".into()), vec![
            OrderItem { product_id: "p2".into(), quantity: 1, price: Decimal::new(75000, 0) },
        ], None).unwrap();

        let admin = auth.login("admin@hb.local", "admin123").unwrap();
        assert!(orders.get_for(&admin, &order.id).is_ok());
        let client = auth.login("cliente@hb.local", "cliente123").unwrap();
        assert!(orders.get_for(&client, &order.id).is_ok());
        let distributor = auth.login("distri@hb.local", "distri123").unwrap();
        assert_eq!(orders.get_for(&distributor, &order.id), Err(StorefrontError::Unauthorized));
        assert_eq!(orders.get_for(&distributor, "missing"), Err(StorefrontError::OrderNotFound));
    }

    #[test]
    fn test_summary_counts_completed_sales() {
        let store = seeded();
        let orders = Orders::new(&store);
        let item = || vec![OrderItem { product_id: "p1".into(), quantity: 1, price: Decimal::new(1000, 0) }];
        let a = orders.create(None, item(), None).unwrap();
        orders.create(None, item(), None).unwrap();
        orders.update_status(&a.id, OrderStatus::Completed).unwrap();
        let summary = orders.summary();
        assert_eq!(summary.pending, 1);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.completed_sales, Decimal::new(1000, 0));
    }

    #[test]
    fn test_quotes() {
        let store = seeded();
        let orders = Orders::new(&store);
        let quote = orders.add_quote(Some("c1".into()), vec![], Some("mayorista".into())).unwrap();
        assert_eq!(quote.status, "pending");
        assert_eq!(orders.quotes(), vec![quote]);
    }
}
