//! Domain events
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::aggregates::product::ProductId;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "aggregate", content = "event", rename_all = "snake_case")]
pub enum DomainEvent {
    Cart(CartEvent),
    Order(OrderEvent),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CartEvent {
    ItemAdded { product_id: ProductId, quantity: u32 },
    QuantityChanged { product_id: ProductId, quantity: u32 },
    ItemRemoved { product_id: ProductId },
    Cleared,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderEvent {
    Placed { order_id: Uuid, order_number: String, total: Decimal },
}

impl DomainEvent {
    /// NATS subject, e.g. `shopwhats.events.cart.item_added`.
    pub fn subject(&self) -> String {
        let (aggregate, kind) = match self {
            Self::Cart(CartEvent::ItemAdded { .. }) => ("cart", "item_added"),
            Self::Cart(CartEvent::QuantityChanged { .. }) => ("cart", "quantity_changed"),
            Self::Cart(CartEvent::ItemRemoved { .. }) => ("cart", "item_removed"),
            Self::Cart(CartEvent::Cleared) => ("cart", "cleared"),
            Self::Order(OrderEvent::Placed { .. }) => ("order", "placed"),
        };
        format!("shopwhats.events.{aggregate}.{kind}")
    }
}
