//! WhatsApp ordering: a plain-text order summary and a `wa.me` link that
//! opens a chat with the store with the summary pre-filled.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use crate::domain::aggregates::{Cart, OrderError};
use crate::Result;

/// Strips everything but digits. `None` unless 8 to 15 digits remain.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    (8..=15).contains(&digits.len()).then_some(digits)
}

pub fn order_message(cart: &Cart, currency: &str, customer: Option<&str>) -> Result<String> {
    if cart.is_empty() { return Err(OrderError::EmptyCart.into()); }
    let mut lines = vec!["Hello! I would like to order:".to_string()];
    lines.extend(cart.items().iter().map(|line| {
        format!("{}x {} - {currency} {}", line.quantity().get(), line.product().name(), line.line_total())
    }));
    lines.push(format!("Total: {currency} {}", cart.total()));
    if let Some(name) = customer.map(str::trim).filter(|n| !n.is_empty()) {
        lines.push(format!("Name: {name}"));
    }
    Ok(lines.join("\n"))
}

/// `number` must already be normalized.
pub fn order_link(number: &str, message: &str) -> String {
    format!("https://wa.me/{number}?text={}", utf8_percent_encode(message, NON_ALPHANUMERIC))
}
