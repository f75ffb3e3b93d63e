//! Role-aware pricing.
//!
//! Anonymous visitors and clients pay the public price. Distributors pay the
//! distributor price when one is set and nonzero.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use crate::domain::aggregates::{Cart, Product};
use crate::domain::value_objects::{total_of, Role};

pub fn effective_price(product: &Product, role: Option<Role>) -> Decimal {
    match (role, product.price_distribuidor) {
        (Some(Role::Distributor), Some(price)) if !price.is_zero() => price,
        _ => product.price_publico,
    }
}

/// Saturates at `Decimal::MAX` for prices stored before the price ceiling.
pub fn line_total(product: &Product, quantity: u32, role: Option<Role>) -> Decimal {
    effective_price(product, role).saturating_mul(Decimal::from(quantity))
}

/// Public minus distributor price, when a distributor price is set.
pub fn discount(product: &Product) -> Option<Decimal> {
    product.price_distribuidor.filter(|d| !d.is_zero()).map(|d| product.price_publico - d)
}

/// `round((public - distributor) / public * 100)`; `None` unless the public
/// price is positive and a distributor price exists.
pub fn discount_percent(product: &Product) -> Option<Decimal> {
    if product.price_publico <= Decimal::ZERO { return None; }
    let saved = discount(product)?;
    Some((saved / product.price_publico * Decimal::ONE_HUNDRED).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
}

/// A cart entry resolved against the catalog.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedLine {
    pub product: Product,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

/// Resolves cart entries in cart order. Entries whose product no longer
/// exists are dropped.
pub fn price_lines(cart: &Cart, products: &[Product], role: Option<Role>) -> Vec<PricedLine> {
    cart.items().iter()
        .filter_map(|item| {
            let Some(product) = products.iter().find(|p| p.id == item.product_id) else {
                tracing::warn!(product_id = %item.product_id, "cart references missing product");
                return None;
            };
            Some(PricedLine {
                product: product.clone(), quantity: item.quantity,
                unit_price: effective_price(product, role),
                subtotal: line_total(product, item.quantity, role),
            })
        })
        .collect()
}

pub fn cart_total(cart: &Cart, products: &[Product], role: Option<Role>) -> Decimal {
    total_of(price_lines(cart, products, role).iter().map(|l| l.subtotal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::CartItem;

    fn product(id: &str, public: i64, distributor: Option<i64>) -> Product {
        serde_json::from_value(serde_json::json!({
            "id": id, "name": id, "pricePublico": public, "priceDistribuidor": distributor, "stock": 10
        })).unwrap()
    }

    #[test]
    fn test_effective_price_by_role() {
        let p = product("p1", 99000, Some(75000));
        assert_eq!(effective_price(&p, None), Decimal::new(99000, 0));
        assert_eq!(effective_price(&p, Some(Role::Client)), Decimal::new(99000, 0));
        assert_eq!(effective_price(&p, Some(Role::Admin)), Decimal::new(99000, 0));
        assert_eq!(effective_price(&p, Some(Role::Distributor)), Decimal::new(75000, 0));
    }

    #[test]
    fn test_zero_distributor_price_falls_back() {
        let p = product("p1", 50, Some(0));
        assert_eq!(effective_price(&p, Some(Role::Distributor)), Decimal::new(50, 0));
        assert_eq!(discount_percent(&p), None);
        let p = product("p2", 50, None);
        assert_eq!(effective_price(&p, Some(Role::Distributor)), Decimal::new(50, 0));
    }

    #[test]
    fn test_distributor_never_pays_more() {
        for (public, distributor) in [(99000, 75000), (10, 10), (1, 1), (500, 499)] {
            let p = product("p", public, Some(distributor));
            assert!(effective_price(&p, Some(Role::Distributor)) <= effective_price(&p, Some(Role::Client)));
        }
    }

    #[test]
    fn test_discount_percent() {
        assert_eq!(discount_percent(&product("p1", 99000, Some(75000))), Some(Decimal::new(24, 0)));
        assert_eq!(discount(&product("p1", 99000, Some(75000))), Some(Decimal::new(24000, 0)));
        assert_eq!(discount_percent(&product("p0", 0, Some(0))), None);
    }

    #[test]
    fn test_oversized_stored_price_saturates() {
        let mut huge = product("huge", 1, None);
        huge.price_publico = Decimal::MAX;
        let products = vec![huge, product("b", 30, None)];
        let cart = Cart::from_items(vec![CartItem::new("huge", 10), CartItem::new("b", 1)]);
        assert_eq!(cart_total(&cart, &products, None), Decimal::MAX);
        assert_eq!(line_total(&products[0], 10, None), Decimal::MAX);
    }

    #[test]
    fn test_cart_total_skips_dangling_and_ignores_order() {
        let products = vec![product("a", 100, Some(80)), product("b", 30, None)];
        let forward = Cart::from_items(vec![CartItem::new("a", 2), CartItem::new("ghost", 5), CartItem::new("b", 1)]);
        let reversed = Cart::from_items(vec![CartItem::new("b", 1), CartItem::new("a", 2)]);
        assert_eq!(cart_total(&forward, &products, None), Decimal::new(230, 0));
        assert_eq!(cart_total(&reversed, &products, None), Decimal::new(230, 0));
        assert_eq!(cart_total(&forward, &products, Some(Role::Distributor)), Decimal::new(190, 0));
        let summed: Decimal = forward.items().iter()
            .filter_map(|i| products.iter().find(|p| p.id == i.product_id).map(|p| line_total(p, i.quantity, None)))
            .sum();
        assert_eq!(cart_total(&forward, &products, None), summed);
    }
}
