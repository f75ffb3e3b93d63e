//! Order Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use crate::domain::aggregates::Product;
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::domain::value_objects::{new_id, total_of};
use crate::{Result, StorefrontError};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    pub items: Vec<OrderItem>,
    /// Captured at creation; later price edits never touch it.
    pub total: Decimal,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub quantity: u32,
    pub price: Decimal,
}

impl OrderItem {
    pub fn total(&self) -> Decimal { self.price.saturating_mul(Decimal::from(self.quantity)) }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [Self::Pending, Self::Processing, Self::Shipped, Self::Completed, Self::Cancelled];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool { matches!(self, Self::Completed | Self::Cancelled) }

    fn rank(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Processing => 1,
            Self::Shipped => 2,
            Self::Completed => 3,
            Self::Cancelled => 4,
        }
    }

    /// Forward-only along pending → processing → shipped → completed (steps
    /// may be skipped); cancellation from any non-terminal state.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        if self.is_terminal() { return false; }
        match next {
            Self::Cancelled => true,
            _ => next.rank() > self.rank(),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl std::str::FromStr for OrderStatus {
    type Err = StorefrontError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL.into_iter().find(|st| st.as_str() == s)
            .ok_or_else(|| StorefrontError::Validation(format!("unknown order status '{s}'")))
    }
}

/// A distributor's slice of an order: only lines for products they own.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributorOrderView {
    pub order_id: String,
    pub customer_id: Option<String>,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub partial_total: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn create(customer_id: Option<String>, items: Vec<OrderItem>, notes: Option<String>) -> Result<Self> {
        if items.is_empty() { return Err(StorefrontError::Validation("order has no items".into())); }
        if items.iter().any(|i| i.quantity == 0) {
            return Err(StorefrontError::Validation("order item quantity must be at least 1".into()));
        }
        let total = items.iter()
            .try_fold(Decimal::ZERO, |acc, i| acc.checked_add(i.price.checked_mul(Decimal::from(i.quantity))?))
            .ok_or_else(|| StorefrontError::Validation("order total out of range".into()))?;
        let mut order = Self {
            id: new_id("ord"), customer_id, items, total, status: OrderStatus::Pending, notes,
            created_at: Utc::now(), updated_at: None, events: vec![],
        };
        order.raise_event(DomainEvent::Order(OrderEvent::Placed { order_id: order.id.clone(), total }));
        Ok(order)
    }

    pub fn set_status(&mut self, next: OrderStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(StorefrontError::InvalidTransition { from: self.status, to: next });
        }
        let from = std::mem::replace(&mut self.status, next);
        self.touch();
        self.raise_event(DomainEvent::Order(OrderEvent::StatusChanged { order_id: self.id.clone(), from, to: next }));
        Ok(())
    }

    /// `None` when the distributor owns none of the lines. Lines whose
    /// product no longer exists are left out.
    pub fn distributor_view(&self, distributor_id: &str, products: &[Product]) -> Option<DistributorOrderView> {
        let items: Vec<OrderItem> = self.items.iter()
            .filter(|i| products.iter().any(|p| p.id == i.product_id && p.is_owned_by(distributor_id)))
            .cloned()
            .collect();
        if items.is_empty() { return None; }
        Some(DistributorOrderView {
            order_id: self.id.clone(), customer_id: self.customer_id.clone(), status: self.status,
            partial_total: total_of(items.iter().map(OrderItem::total)), items, created_at: self.created_at,
        })
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
    fn touch(&mut self) { self.updated_at = Some(Utc::now()); }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, quantity: u32, price: i64) -> OrderItem {
        OrderItem { product_id: id.into(), quantity, price: Decimal::new(price, 0) }
    }

    #[test]
    fn test_order_workflow() {
        let mut order = Order::create(Some("c1".into()), vec![item("p1", 2, 10), item("p2", 1, 5)], None).unwrap();
        assert_eq!(order.total, Decimal::new(25, 0));
        assert_eq!(order.status, OrderStatus::Pending);
        order.set_status(OrderStatus::Processing).unwrap();
        order.set_status(OrderStatus::Shipped).unwrap();
        assert_eq!(order.status, OrderStatus::Shipped);
        assert!(order.updated_at.is_some());
        assert_eq!(order.take_events().len(), 3);
    }

    #[test]
    fn test_rejects_backwards_and_terminal_moves() {
        let mut order = Order::create(None, vec![item("p1", 1, 10)], None).unwrap();
        order.set_status(OrderStatus::Shipped).unwrap();
        assert_eq!(
            order.set_status(OrderStatus::Pending),
            Err(StorefrontError::InvalidTransition { from: OrderStatus::Shipped, to: OrderStatus::Pending })
        );
        order.set_status(OrderStatus::Cancelled).unwrap();
        assert!(order.set_status(OrderStatus::Completed).is_err());
        assert!(order.set_status(OrderStatus::Cancelled).is_err());
    }

    #[test]
    fn test_total_out_of_range_rejected() {
        let huge = OrderItem { product_id: "p1".into(), quantity: 10, price: Decimal::MAX };
        assert!(matches!(Order::create(None, vec![huge], None), Err(StorefrontError::Validation(_))));
    }

    #[test]
    fn test_empty_order_rejected() {
        assert!(matches!(Order::create(None, vec![], None), Err(StorefrontError::Validation(_))));
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!("shipped".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert!("delivered".parse::<OrderStatus>().is_err());
        assert_eq!(serde_json::to_string(&OrderStatus::Cancelled).unwrap(), "\"cancelled\"");
    }

    #[test]
    fn test_events_not_persisted() {
        let order = Order::create(None, vec![item("p1", 1, 10)], None).unwrap();
        let json = serde_json::to_value(&order).unwrap();
        assert!(json.get("events").is_none());
        let back: Order = serde_json::from_value(json).unwrap();
        assert_eq!(back.total, order.total);
    }
}
