//! Aggregates module
pub mod product;
pub mod order;
pub mod cart;
pub mod user;
pub mod category;

pub use product::{Product, ProductDraft};
pub use order::{DistributorOrderView, Order, OrderItem, OrderStatus};
pub use cart::{Cart, CartItem};
pub use user::{Session, User};
pub use category::{Category, Quote};
