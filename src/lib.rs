//! H&B Storefront
//!
//! Role-aware storefront core for H&B Importaciones.
//!
//! ## Features
//! - Catalog with public and distributor pricing
//! - Shopping cart with stock ceilings
//! - Plaintext-credential auth gate with a single local session
//! - Order lifecycle with distributor-scoped views
//! - WhatsApp checkout handoff
//!
//! All state lives in a flat key-value [`store::Store`] that is injected into
//! every service, so tests and runs are scoped to their own backend.

use thiserror::Error;

pub mod config;
pub mod domain;
pub mod http;
pub mod pricing;
pub mod services;
pub mod store;
pub mod whatsapp;

pub use domain::aggregates::{
    Cart, CartItem, Category, Order, OrderItem, OrderStatus, Product, Quote, Session, User,
};
pub use domain::value_objects::{Role, StockStatus};
pub use services::Storefront;
pub use store::Store;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorefrontError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Product not found")]
    ProductNotFound,

    #[error("Order not found")]
    OrderNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("Category not found")]
    CategoryNotFound,

    /// Covers unknown email, wrong password and inactive account alike.
    #[error("Invalid credentials or inactive user")]
    InvalidCredentials,

    #[error("Product is out of stock")]
    OutOfStock,

    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: u32, available: u32 },

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Category already exists")]
    DuplicateCategory,

    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Not authorized")]
    Unauthorized,

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<validator::ValidationErrors> for StorefrontError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<&str> = errors.field_errors().keys().copied().collect();
        fields.sort_unstable();
        Self::Validation(format!("invalid fields: {}", fields.join(", ")))
    }
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
