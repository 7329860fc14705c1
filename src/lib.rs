//! ShopWhats storefront
//!
//! Storefront back end with a WhatsApp-first purchase funnel.
//!
//! ## Features
//! - Product catalog with search, filtering and sorting
//! - Session carts mirrored to persistent storage
//! - Checkout into orders
//! - WhatsApp order messages and links
//! - Domain events published to NATS

pub mod api;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod domain;
pub mod events;
pub mod mirror;
pub mod sessions;

use thiserror::Error;

use crate::domain::aggregates::{OrderError, ProductError, ProductId};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum ShopError {
    #[error("Product {0} not found")]
    ProductNotFound(ProductId),

    #[error("Invalid session id")]
    InvalidSession,

    #[error("Invalid quantity")]
    InvalidQuantity,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("WhatsApp ordering is not configured")]
    WhatsAppDisabled,

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Product(#[from] ProductError),

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<validator::ValidationErrors> for ShopError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<&str> = errors.field_errors().into_keys().collect();
        fields.sort_unstable();
        ShopError::Validation(format!("invalid fields: {}", fields.join(", ")))
    }
}

pub type Result<T> = std::result::Result<T, ShopError>;
