//! Product Aggregate
//!
//! Products are owned by the catalog backend. The backend hands them out in
//! a loose shape ([`ProductRecord`]) whose field names may be snake_case or
//! camelCase depending on which client wrote the row; everything past the
//! boundary works with the validated [`Product`].

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::value_objects::{Money, Sku, SkuError};

pub type ProductId = i64;

/// Largest price a product may carry: `9999999999.99`, the range of the
/// `NUMERIC(12,2)` price column.
const MAX_PRICE_CENTS: i64 = 999_999_999_999;

fn check_price(price: Money) -> Result<Money, ProductError> {
    if price.is_negative() { return Err(ProductError::NegativePrice); }
    if price.amount() > Decimal::new(MAX_PRICE_CENTS, 2) { return Err(ProductError::PriceTooHigh); }
    Ok(price)
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Product {
    id: ProductId,
    name: String,
    description: String,
    price: Money,
    previous_price: Option<Money>,
    discount_percentage: Option<u8>,
    image_url: Option<String>,
    category: String,
    stock_quantity: u32,
    featured: bool,
    sku: Option<Sku>,
}

/// Product row as stored by the backend.
#[derive(Clone, Debug, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductRecord {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default, alias = "originalPrice", alias = "previous_price", alias = "previousPrice")]
    pub original_price: Option<Decimal>,
    #[serde(default, alias = "discountPercentage", alias = "discount")]
    pub discount_percentage: Option<i32>,
    #[serde(default, alias = "imageUrl", alias = "image")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, alias = "stockQuantity", alias = "stock")]
    pub stock_quantity: i64,
    #[serde(default, alias = "isFeatured", alias = "is_featured")]
    pub featured: bool,
    #[serde(default)]
    pub sku: Option<String>,
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>, price: Money) -> Result<Self, ProductError> {
        let name = name.into();
        if name.trim().is_empty() { return Err(ProductError::MissingName); }
        let price = check_price(price)?;
        Ok(Self {
            id, name, description: String::new(), price, previous_price: None, discount_percentage: None,
            image_url: None, category: String::new(), stock_quantity: 0, featured: false, sku: None,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self { self.description = description.into(); self }
    pub fn with_category(mut self, category: impl Into<String>) -> Self { self.category = category.into(); self }
    pub fn with_image(mut self, url: impl Into<String>) -> Self { self.image_url = Some(url.into()); self }
    pub fn with_stock(mut self, stock: u32) -> Self { self.stock_quantity = stock; self }
    pub fn featured(mut self) -> Self { self.featured = true; self }
    pub fn with_sku(mut self, sku: Sku) -> Self { self.sku = Some(sku); self }

    pub fn with_previous_price(mut self, previous: Money) -> Result<Self, ProductError> {
        self.previous_price = Some(check_price(previous)?);
        Ok(self)
    }

    pub fn id(&self) -> ProductId { self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn description(&self) -> &str { &self.description }
    pub fn price(&self) -> Money { self.price }
    pub fn previous_price(&self) -> Option<Money> { self.previous_price }
    pub fn image_url(&self) -> Option<&str> { self.image_url.as_deref() }
    pub fn category(&self) -> &str { &self.category }
    pub fn stock_quantity(&self) -> u32 { self.stock_quantity }
    pub fn is_featured(&self) -> bool { self.featured }
    pub fn sku(&self) -> Option<&Sku> { self.sku.as_ref() }
    pub fn is_in_stock(&self) -> bool { self.stock_quantity > 0 }

    pub fn is_on_sale(&self) -> bool {
        self.previous_price.is_some_and(|prev| prev > self.price)
    }

    /// Explicit discount if the backend set one, otherwise derived from the
    /// previous price and rounded to a whole percent.
    pub fn discount_percentage(&self) -> Option<u8> {
        if self.discount_percentage.is_some() { return self.discount_percentage; }
        let prev = self.previous_price.filter(|_| self.is_on_sale())?.amount();
        let pct = (prev - self.price.amount()) / prev * Decimal::ONE_HUNDRED;
        pct.round().to_u8()
    }
}

impl TryFrom<ProductRecord> for Product {
    type Error = ProductError;

    fn try_from(r: ProductRecord) -> Result<Self, Self::Error> {
        let mut product = Product::new(r.id, r.name.trim(), Money::new(r.price))?;
        if let Some(prev) = r.original_price {
            product = product.with_previous_price(Money::new(prev))?;
        }
        if let Some(d) = r.discount_percentage {
            product.discount_percentage = Some(u8::try_from(d).ok().filter(|d| *d <= 100).ok_or(ProductError::InvalidDiscount(d))?);
        }
        product.stock_quantity = u32::try_from(r.stock_quantity).map_err(|_| ProductError::NegativeStock)?;
        product.description = r.description.unwrap_or_default();
        product.image_url = r.image_url.filter(|u| !u.trim().is_empty());
        product.category = r.category.unwrap_or_default();
        product.featured = r.featured;
        product.sku = r.sku.filter(|s| !s.trim().is_empty()).map(Sku::new).transpose()?;
        Ok(product)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductError {
    #[error("product name is missing")]
    MissingName,
    #[error("product price cannot be negative")]
    NegativePrice,
    #[error("product price exceeds 9999999999.99")]
    PriceTooHigh,
    #[error("product stock cannot be negative")]
    NegativeStock,
    #[error("discount percentage {0} is outside 0..=100")]
    InvalidDiscount(i32),
    #[error(transparent)]
    InvalidSku(#[from] SkuError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ProductRecord {
        ProductRecord { id: 7, name: "Vestido Floral".into(), price: Decimal::new(8990, 2), stock_quantity: 3, ..Default::default() }
    }

    #[test]
    fn test_product_create() {
        let p = Product::new(1, "Test Product", Money::new(Decimal::new(1999, 2))).unwrap();
        assert_eq!(p.name(), "Test Product");
        assert!(!p.is_in_stock());
    }

    #[test]
    fn test_rejects_negative_price() {
        assert_eq!(Product::new(1, "P", Money::new(Decimal::new(-1, 0))), Err(ProductError::NegativePrice));
    }

    #[test]
    fn test_rejects_price_above_column_range() {
        assert_eq!(Product::new(1, "Big", Money::new(Decimal::from_scientific("1e20").unwrap())), Err(ProductError::PriceTooHigh));
        assert!(Product::new(1, "Max", Money::new(Decimal::new(MAX_PRICE_CENTS, 2))).is_ok());
        assert_eq!(Product::try_from(ProductRecord { original_price: Some(Decimal::new(MAX_PRICE_CENTS + 1, 2)), ..record() }), Err(ProductError::PriceTooHigh));
    }

    #[test]
    fn test_record_conversion() {
        let p = Product::try_from(ProductRecord { sku: Some("vf-01".into()), category: Some("Vestidos".into()), ..record() }).unwrap();
        assert_eq!(p.id(), 7);
        assert_eq!(p.stock_quantity(), 3);
        assert_eq!(p.sku().map(Sku::as_str), Some("VF-01"));
        assert_eq!(p.category(), "Vestidos");
    }

    #[test]
    fn test_record_accepts_camel_case() {
        let json = r#"{"id":3,"name":"Bolsa","price":"120.50","originalPrice":150,"imageUrl":"https://cdn/x.png","stockQuantity":2,"isFeatured":true}"#;
        let p = Product::try_from(serde_json::from_str::<ProductRecord>(json).unwrap()).unwrap();
        assert_eq!(p.price().amount(), Decimal::new(12050, 2));
        assert_eq!(p.image_url(), Some("https://cdn/x.png"));
        assert!(p.is_featured());
        assert!(p.is_on_sale());
        assert_eq!(p.discount_percentage(), Some(20));
    }

    #[test]
    fn test_record_accepts_snake_case() {
        let json = r#"{"id":4,"name":"Saia","price":59.9,"original_price":null,"image_url":"a.png","stock_quantity":0,"featured":false}"#;
        let p = Product::try_from(serde_json::from_str::<ProductRecord>(json).unwrap()).unwrap();
        assert_eq!(p.image_url(), Some("a.png"));
        assert!(!p.is_on_sale());
        assert_eq!(p.discount_percentage(), None);
    }

    #[test]
    fn test_record_rejects_bad_values() {
        assert_eq!(Product::try_from(ProductRecord { stock_quantity: -1, ..record() }), Err(ProductError::NegativeStock));
        assert_eq!(Product::try_from(ProductRecord { name: "  ".into(), ..record() }), Err(ProductError::MissingName));
        assert_eq!(Product::try_from(ProductRecord { discount_percentage: Some(120), ..record() }), Err(ProductError::InvalidDiscount(120)));
    }
}
