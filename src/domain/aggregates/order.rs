//! Order Aggregate

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::aggregates::cart::Cart;
use crate::domain::aggregates::product::ProductId;
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::domain::value_objects::{Money, Quantity};

#[derive(Clone, Debug, Serialize)]
pub struct Order {
    id: Uuid,
    order_number: String,
    customer: Customer,
    lines: Vec<OrderLine>,
    total: Money,
    created_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OrderLine { pub product_id: ProductId, pub name: String, pub unit_price: Money, pub quantity: Quantity, pub line_total: Money }

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Customer { pub name: String, pub email: String, pub phone: Option<String>, pub address: Option<String>, pub note: Option<String> }

impl Order {
    /// Freezes the cart's lines and total into a new pending order.
    pub fn from_cart(cart: &Cart, customer: Customer) -> Result<Self, OrderError> {
        if cart.is_empty() { return Err(OrderError::EmptyCart); }
        let lines = cart.items().iter().map(|l| OrderLine {
            product_id: l.product_id(), name: l.product().name().to_string(), unit_price: l.product().price(),
            quantity: l.quantity(), line_total: l.line_total(),
        }).collect();
        let id = Uuid::now_v7();
        let order_number = format!("SW-{:08X}", rand::random::<u32>());
        let total = cart.total();
        let mut order = Self { id, order_number: order_number.clone(), customer, lines, total, created_at: Utc::now(), events: vec![] };
        order.raise_event(DomainEvent::Order(OrderEvent::Placed { order_id: id, order_number, total: total.amount() }));
        Ok(order)
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn order_number(&self) -> &str { &self.order_number }
    pub fn customer(&self) -> &Customer { &self.customer }
    pub fn lines(&self) -> &[OrderLine] { &self.lines }
    pub fn total(&self) -> Money { self.total }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("cart is empty")]
    EmptyCart,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::Product;
    use rust_decimal::Decimal;

    #[test]
    fn test_order_from_cart() {
        let mut cart = Cart::new();
        cart.add_item(&Product::new(1, "Widget", Money::new(Decimal::new(10, 0))).unwrap(), 2);
        cart.add_item(&Product::new(2, "Gadget", Money::new(Decimal::new(5, 0))).unwrap(), 1);
        let mut order = Order::from_cart(&cart, Customer { name: "Ana".into(), email: "ana@example.com".into(), ..Default::default() }).unwrap();
        assert_eq!(order.total(), cart.total());
        assert_eq!(order.lines().len(), 2);
        assert_eq!(order.lines()[0].line_total.amount(), Decimal::new(20, 0));
        assert!(order.order_number().starts_with("SW-"));
        assert_eq!(order.order_number().len(), 11);
        assert!(matches!(order.take_events().as_slice(), [DomainEvent::Order(OrderEvent::Placed { .. })]));
    }

    #[test]
    fn test_empty_cart_rejected() {
        assert_eq!(Order::from_cart(&Cart::new(), Customer::default()).unwrap_err(), OrderError::EmptyCart);
    }
}
