//! Product catalog: the provider seam plus listing filters.

mod postgres;

pub use postgres::PgCatalog;

use std::cmp::Ordering;
use std::path::Path;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::aggregates::{Product, ProductId, ProductRecord};
use crate::Result;

#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// All listable products in backend order.
    async fn list_products(&self) -> Result<Vec<Product>>;

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>>;
}

/// Catalog held in memory, used when no database is configured.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    products: Vec<Product>,
}

impl InMemoryCatalog {
    pub fn new(products: Vec<Product>) -> Self { Self { products } }

    /// Loads a JSON array of product records, in either field casing.
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = tokio::fs::read(path.as_ref()).await?;
        let records: Vec<ProductRecord> = serde_json::from_slice(&raw)?;
        let products = records.into_iter().map(Product::try_from).collect::<std::result::Result<Vec<_>, _>>()?;
        tracing::info!(count = products.len(), path = %path.as_ref().display(), "loaded catalog file");
        Ok(Self::new(products))
    }
}

#[async_trait]
impl CatalogProvider for InMemoryCatalog {
    async fn list_products(&self) -> Result<Vec<Product>> { Ok(self.products.clone()) }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.products.iter().find(|p| p.id() == id).cloned())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Featured products first, backend order otherwise.
    #[default]
    Featured,
    PriceAsc,
    PriceDesc,
    Name,
    /// Highest id first.
    Newest,
}

/// Listing filters applied over a fetched product list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub in_stock: bool,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    #[serde(default)]
    pub sort: SortOrder,
}

impl CatalogQuery {
    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        let needle = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_lowercase);
        let category = self.category.as_deref().map(str::trim).filter(|s| !s.is_empty());

        let mut out: Vec<Product> = products
            .iter()
            .filter(|p| needle.as_deref().map_or(true, |n| matches_search(p, n)))
            .filter(|p| category.map_or(true, |c| p.category().eq_ignore_ascii_case(c)))
            .filter(|p| !self.featured || p.is_featured())
            .filter(|p| !self.in_stock || p.is_in_stock())
            .filter(|p| self.min_price.map_or(true, |min| p.price().amount() >= min))
            .filter(|p| self.max_price.map_or(true, |max| p.price().amount() <= max))
            .cloned()
            .collect();

        // sort_by is stable, ties keep backend order
        match self.sort {
            SortOrder::Featured => out.sort_by_key(|p| !p.is_featured()),
            SortOrder::PriceAsc => out.sort_by(|a, b| a.price().cmp(&b.price())),
            SortOrder::PriceDesc => out.sort_by(|a, b| b.price().cmp(&a.price())),
            SortOrder::Name => out.sort_by(|a, b| compare_names(a.name(), b.name())),
            SortOrder::Newest => out.sort_by(|a, b| b.id().cmp(&a.id())),
        }
        out
    }
}

fn matches_search(p: &Product, needle: &str) -> bool {
    [p.name(), p.description(), p.category()].iter().any(|field| field.to_lowercase().contains(needle))
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Distinct non-empty category labels, sorted.
pub fn categories(products: &[Product]) -> Vec<String> {
    let mut labels: Vec<String> = products.iter().map(|p| p.category().trim()).filter(|c| !c.is_empty()).map(str::to_string).collect();
    labels.sort_by(|a, b| compare_names(a, b));
    labels.dedup_by(|a, b| a.eq_ignore_ascii_case(b));
    labels
}
