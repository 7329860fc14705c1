//! Aggregates module
pub mod product;
pub mod order;
pub mod cart;

pub use product::{Product, ProductError, ProductId, ProductRecord};
pub use order::{Customer, Order, OrderError, OrderLine};
pub use cart::{Cart, CartLine, CartSnapshot, SnapshotLine};
