//! Checkout: turns a session cart into a submitted order.

mod postgres;
pub mod whatsapp;

pub use postgres::PgOrderSubmitter;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;
use validator::Validate;

use crate::domain::aggregates::{Customer, Order};
use crate::sessions::CartSessions;
use crate::Result;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CheckoutRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 20))]
    pub phone: Option<String>,
    #[validate(length(max = 300))]
    pub address: Option<String>,
    #[validate(length(max = 500))]
    pub note: Option<String>,
}

impl From<CheckoutRequest> for Customer {
    fn from(r: CheckoutRequest) -> Self {
        let blank_to_none = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        Customer { name: r.name.trim().to_string(), email: r.email.trim().to_string(), phone: blank_to_none(r.phone), address: blank_to_none(r.address), note: blank_to_none(r.note) }
    }
}

#[async_trait]
pub trait OrderSubmitter: Send + Sync {
    async fn submit(&self, order: &Order) -> Result<()>;
}

/// Keeps submitted orders in memory.
#[derive(Debug, Default)]
pub struct InMemoryOrders {
    orders: RwLock<Vec<Order>>,
}

impl InMemoryOrders {
    pub fn new() -> Self { Self::default() }
    pub async fn orders(&self) -> Vec<Order> { self.orders.read().await.clone() }
}

#[async_trait]
impl OrderSubmitter for InMemoryOrders {
    async fn submit(&self, order: &Order) -> Result<()> {
        self.orders.write().await.push(order.clone());
        Ok(())
    }
}

/// Submits the session's cart as an order and clears the cart once the
/// submission succeeded. A failed submission leaves the cart untouched, and
/// checking out an empty cart leaves nothing behind for the session.
pub async fn place_order(sessions: &CartSessions, submitter: &dyn OrderSubmitter, session: &str, request: CheckoutRequest) -> Result<Order> {
    request.validate()?;
    let mut cart = sessions.lock(session).await?;

    let mut order = match Order::from_cart(&cart, request.into()) {
        Ok(order) => order,
        Err(e) => {
            sessions.release(session, &cart).await;
            return Err(e.into());
        }
    };
    submitter.submit(&order).await?;
    tracing::info!(session, order_number = order.order_number(), total = %order.total(), "order placed");

    cart.clear();
    sessions.persist(session, &mut cart).await;
    sessions.events().publish_all(order.take_events()).await;
    Ok(order)
}
