use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;

use super::{ApiError, AppState};
use crate::catalog::{categories, CatalogQuery};
use crate::domain::aggregates::{Product, ProductId};
use crate::domain::value_objects::Money;
use crate::ShopError;

/// Product as shown to shoppers, with the sale fields resolved.
#[derive(Debug, Serialize)]
pub(super) struct ProductResponse {
    id: ProductId,
    name: String,
    description: String,
    price: Money,
    previous_price: Option<Money>,
    discount_percentage: Option<u8>,
    is_on_sale: bool,
    image_url: Option<String>,
    category: String,
    stock_quantity: u32,
    in_stock: bool,
    featured: bool,
    sku: Option<String>,
}

impl From<&Product> for ProductResponse {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id(),
            name: p.name().to_string(),
            description: p.description().to_string(),
            price: p.price(),
            previous_price: p.previous_price(),
            discount_percentage: p.discount_percentage(),
            is_on_sale: p.is_on_sale(),
            image_url: p.image_url().map(str::to_string),
            category: p.category().to_string(),
            stock_quantity: p.stock_quantity(),
            in_stock: p.is_in_stock(),
            featured: p.is_featured(),
            sku: p.sku().map(|s| s.as_str().to_string()),
        }
    }
}

pub(super) async fn list_products(State(s): State<AppState>, Query(q): Query<CatalogQuery>) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = s.catalog.list_products().await?;
    Ok(Json(q.apply(&products).iter().map(ProductResponse::from).collect()))
}

pub(super) async fn get_product(State(s): State<AppState>, Path(id): Path<ProductId>) -> Result<Json<ProductResponse>, ApiError> {
    let product = s.catalog.get_product(id).await?.ok_or(ShopError::ProductNotFound(id))?;
    Ok(Json(ProductResponse::from(&product)))
}

pub(super) async fn list_categories(State(s): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    let products = s.catalog.list_products().await?;
    Ok(Json(categories(&products)))
}
