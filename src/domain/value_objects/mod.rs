//! Value Objects for the storefront

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stock at or below this (and above zero) counts as low.
pub const LOW_STOCK_THRESHOLD: u32 = 5;

/// Largest unit price a product may carry, in whole pesos.
pub const MAX_PRICE: i64 = 1_000_000_000_000;

/// Money sum that pins at `Decimal::MAX` instead of overflowing.
pub fn total_of(amounts: impl IntoIterator<Item = Decimal>) -> Decimal {
    amounts.into_iter().fold(Decimal::ZERO, |acc, amount| acc.saturating_add(amount))
}

/// Acting role of a user or session
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Distributor,
    #[default]
    Client,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Distributor => "distributor",
            Self::Client => "client",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl std::str::FromStr for Role {
    type Err = crate::StorefrontError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "distributor" => Ok(Self::Distributor),
            "client" => Ok(Self::Client),
            other => Err(crate::StorefrontError::Validation(format!("unknown role '{other}'"))),
        }
    }
}

/// Derived stock classification; never persisted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Out,
    Low,
    Ok,
}

impl StockStatus {
    pub fn classify(stock: u32, threshold: u32) -> Self {
        match stock {
            0 => Self::Out,
            s if s <= threshold => Self::Low,
            _ => Self::Ok,
        }
    }
}

/// Case-insensitive email equality, the only identity rule users have.
pub fn emails_match(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Fresh record id such as `ord3f2a...`.
pub fn new_id(prefix: &str) -> String {
    format!("{prefix}{}", Uuid::new_v4().simple())
}

/// Formats an amount the way `es-CO` renders COP with no fraction digits:
/// `$\u{a0}99.000`.
pub fn format_price(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let digits = rounded.abs().trunc().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{sign}$\u{a0}{grouped}")
}
