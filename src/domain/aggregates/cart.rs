//! Cart Aggregate
//!
//! The in-session cart. Lines keep insertion order, hold one entry per
//! product id and never carry a quantity below one. The total is always
//! derived from the lines.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::aggregates::product::{Product, ProductId};
use crate::domain::events::{CartEvent, DomainEvent};
use crate::domain::value_objects::{Money, Quantity};

#[derive(Clone, Debug, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
    events: Vec<DomainEvent>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CartLine {
    product: Product,
    quantity: Quantity,
}

impl CartLine {
    pub fn product(&self) -> &Product { &self.product }
    pub fn product_id(&self) -> ProductId { self.product.id() }
    pub fn quantity(&self) -> Quantity { self.quantity }
    pub fn line_total(&self) -> Money { self.product.price().multiply(self.quantity) }
}

impl Cart {
    pub fn new() -> Self { Self::default() }

    pub fn items(&self) -> &[CartLine] { &self.lines }
    pub fn is_empty(&self) -> bool { self.lines.is_empty() }
    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> { self.lines.iter().find(|l| l.product_id() == product_id) }

    /// Sum of `price * quantity` over the current lines.
    pub fn total(&self) -> Money { self.lines.iter().map(CartLine::line_total).sum() }

    /// Number of units across all lines.
    pub fn item_count(&self) -> u32 { self.lines.iter().fold(0u32, |n, l| n.saturating_add(l.quantity.get())) }

    pub fn add_one(&mut self, product: &Product) { self.add_item(product, 1) }

    /// Adds `quantity` units of `product`. An existing line keeps its position
    /// and its original price snapshot. A zero quantity does nothing.
    pub fn add_item(&mut self, product: &Product, quantity: u32) {
        let Some(quantity) = Quantity::new(quantity) else { return };
        if let Some(existing) = self.lines.iter_mut().find(|l| l.product_id() == product.id()) {
            existing.quantity = existing.quantity.add(quantity);
        } else {
            self.lines.push(CartLine { product: product.clone(), quantity });
        }
        self.raise_event(DomainEvent::Cart(CartEvent::ItemAdded { product_id: product.id(), quantity: quantity.get() }));
    }

    /// Sets the quantity of an existing line. Zero or negative removes the
    /// line; an unknown id is ignored.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: i64) {
        let Some(quantity) = Quantity::from_signed(quantity) else {
            self.remove_item(product_id);
            return;
        };
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id() == product_id) {
            line.quantity = quantity;
            self.raise_event(DomainEvent::Cart(CartEvent::QuantityChanged { product_id, quantity: quantity.get() }));
        }
    }

    /// Returns whether a line was removed.
    pub fn remove_item(&mut self, product_id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id() != product_id);
        let removed = self.lines.len() != before;
        if removed { self.raise_event(DomainEvent::Cart(CartEvent::ItemRemoved { product_id })); }
        removed
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.raise_event(DomainEvent::Cart(CartEvent::Cleared));
    }

    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            lines: self.lines.iter().map(|l| SnapshotLine {
                product_id: l.product_id(),
                quantity: l.quantity.get(),
                name: l.product.name().to_string(),
                price: l.product.price().amount(),
                image_url: l.product.image_url().map(str::to_string),
                category: l.product.category().to_string(),
                stock_quantity: l.product.stock_quantity(),
            }).collect(),
        }
    }

    /// Rebuilds a cart from a mirrored snapshot. Lines with a zero quantity or
    /// an unusable product (blank name, negative or out-of-range price) are
    /// dropped, and
    /// repeated product ids are merged into the first occurrence.
    pub fn restore(snapshot: &CartSnapshot) -> Self {
        let mut cart = Cart::new();
        for line in &snapshot.lines {
            let Ok(product) = Product::new(line.product_id, line.name.as_str(), Money::new(line.price)) else { continue };
            let mut product = product.with_category(line.category.as_str()).with_stock(line.stock_quantity);
            if let Some(url) = &line.image_url { product = product.with_image(url.as_str()); }
            cart.add_item(&product, line.quantity);
        }
        cart.events.clear();
        cart
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
}

/// Serialized form of a cart kept by the persistence mirror.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub lines: Vec<SnapshotLine>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnapshotLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub stock_quantity: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: ProductId, cents: i64) -> Product {
        Product::new(id, format!("Product {id}"), Money::new(Decimal::new(cents, 2))).unwrap()
    }

    fn ids_and_qty(cart: &Cart) -> Vec<(ProductId, u32)> {
        cart.items().iter().map(|l| (l.product_id(), l.quantity().get())).collect()
    }

    #[test]
    fn test_cart_operations() {
        let mut cart = Cart::new();
        let widget = product(1, 1000);
        cart.add_item(&widget, 2);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.total().amount(), Decimal::new(20, 0));
        cart.add_one(&widget);
        assert_eq!(ids_and_qty(&cart), vec![(1, 3)]);
    }

    #[test]
    fn test_add_keeps_first_price_snapshot() {
        let mut cart = Cart::new();
        cart.add_item(&product(1, 1000), 1);
        cart.add_item(&product(1, 9900), 1);
        assert_eq!(cart.total().amount(), Decimal::new(20, 0));
    }

    #[test]
    fn test_add_zero_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(&product(1, 1000), 0);
        assert!(cart.is_empty());
        assert!(cart.take_events().is_empty());
    }

    #[test]
    fn test_update_sets_not_increments() {
        let mut cart = Cart::new();
        cart.add_item(&product(1, 500), 4);
        cart.update_quantity(1, 2);
        assert_eq!(ids_and_qty(&cart), vec![(1, 2)]);
    }

    #[test]
    fn test_item_count() {
        let mut cart = Cart::new();
        cart.add_item(&product(1, 500), 4);
        cart.add_item(&product(2, 500), 3);
        assert_eq!(cart.item_count(), 7);
    }

    #[test]
    fn test_events_raised() {
        let mut cart = Cart::new();
        cart.add_item(&product(1, 500), 2);
        cart.update_quantity(1, 5);
        cart.remove_item(1);
        cart.remove_item(1);
        let events = cart.take_events();
        assert_eq!(events, vec![
            DomainEvent::Cart(CartEvent::ItemAdded { product_id: 1, quantity: 2 }),
            DomainEvent::Cart(CartEvent::QuantityChanged { product_id: 1, quantity: 5 }),
            DomainEvent::Cart(CartEvent::ItemRemoved { product_id: 1 }),
        ]);
        assert!(cart.take_events().is_empty());
    }

    #[test]
    fn test_snapshot_restore() {
        let mut cart = Cart::new();
        cart.add_item(&product(2, 500).with_image("b.png"), 1);
        cart.add_item(&product(1, 1000).with_category("Bolsas"), 3);
        let restored = Cart::restore(&cart.snapshot());
        assert_eq!(restored.items(), cart.items());
        assert_eq!(restored.total(), cart.total());
    }

    #[test]
    fn test_restore_repairs_invariants() {
        let line = |id, quantity| SnapshotLine {
            product_id: id, quantity, name: format!("P{id}"), price: Decimal::new(100, 2),
            image_url: None, category: String::new(), stock_quantity: 0,
        };
        let snapshot = CartSnapshot { lines: vec![line(1, 2), line(2, 0), line(1, 1), SnapshotLine { name: " ".into(), ..line(3, 1) }] };
        let cart = Cart::restore(&snapshot);
        assert_eq!(ids_and_qty(&cart), vec![(1, 3)]);
    }

    #[test]
    fn test_huge_quantities_do_not_overflow_total() {
        let mut cart = Cart::new();
        cart.add_item(&product(1, 999_999_999_999), 1);
        cart.add_item(&product(2, 999_999_999_999), 1);
        cart.update_quantity(1, i64::MAX);
        cart.update_quantity(2, 1_000_000_000);
        let expected = Decimal::new(999_999_999_999, 2) * Decimal::from(u32::MAX)
            + Decimal::new(999_999_999_999, 2) * Decimal::from(1_000_000_000u32);
        assert_eq!(cart.total().amount(), expected);
    }

    #[test]
    fn test_restore_drops_out_of_range_price() {
        let snapshot = CartSnapshot { lines: vec![SnapshotLine {
            product_id: 1, quantity: 1_000_000_000, name: "Big".into(), price: Decimal::from_scientific("1e20").unwrap(),
            image_url: None, category: String::new(), stock_quantity: 0,
        }] };
        let cart = Cart::restore(&snapshot);
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Money::ZERO);
    }
}
