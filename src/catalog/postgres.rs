use async_trait::async_trait;
use sqlx::PgPool;

use super::CatalogProvider;
use crate::domain::aggregates::{Product, ProductId, ProductRecord};
use crate::Result;

const SELECT_PRODUCTS: &str = "SELECT id, name, description, price, original_price, discount_percentage, image_url, \
     category, stock_quantity, featured, sku FROM products";

#[derive(Debug, Clone)]
pub struct PgCatalog {
    db: PgPool,
}

impl PgCatalog {
    pub fn new(db: PgPool) -> Self { Self { db } }
}

#[async_trait]
impl CatalogProvider for PgCatalog {
    async fn list_products(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRecord>(&format!("{SELECT_PRODUCTS} ORDER BY created_at DESC, id DESC"))
            .fetch_all(&self.db)
            .await?;
        // Invalid rows are skipped, not fatal.
        Ok(rows
            .into_iter()
            .filter_map(|r| {
                let id = r.id;
                Product::try_from(r).map_err(|e| tracing::warn!(product_id = id, error = %e, "skipping invalid product row")).ok()
            })
            .collect())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRecord>(&format!("{SELECT_PRODUCTS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(Product::try_from).transpose()?)
    }
}
