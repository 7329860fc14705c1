use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState};
use crate::domain::aggregates::{Cart, ProductId};
use crate::domain::value_objects::Money;
use crate::ShopError;

#[derive(Debug, Serialize)]
pub(super) struct CartResponse {
    items: Vec<CartLineResponse>,
    total: Money,
    item_count: u32,
}

#[derive(Debug, Serialize)]
struct CartLineResponse {
    product_id: ProductId,
    name: String,
    price: Money,
    image_url: Option<String>,
    quantity: u32,
    line_total: Money,
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        let items = cart.items().iter().map(|l| CartLineResponse {
            product_id: l.product_id(),
            name: l.product().name().to_string(),
            price: l.product().price(),
            image_url: l.product().image_url().map(str::to_string),
            quantity: l.quantity().get(),
            line_total: l.line_total(),
        }).collect();
        Self { items, total: cart.total(), item_count: cart.item_count() }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct AddItemRequest {
    product_id: ProductId,
    #[serde(default = "one")]
    quantity: u32,
}

fn one() -> u32 { 1 }

#[derive(Debug, Deserialize)]
pub(super) struct UpdateQuantityRequest {
    quantity: i64,
}

pub(super) async fn get_cart(State(s): State<AppState>, Path(session): Path<String>) -> Result<Json<CartResponse>, ApiError> {
    let cart = s.sessions.cart(&session).await?;
    Ok(Json(CartResponse::from(&cart)))
}

pub(super) async fn add_item(State(s): State<AppState>, Path(session): Path<String>, Json(r): Json<AddItemRequest>) -> Result<Json<CartResponse>, ApiError> {
    crate::sessions::validate_session_id(&session)?;
    let product = s.catalog.get_product(r.product_id).await?.ok_or(ShopError::ProductNotFound(r.product_id))?;
    let cart = s.sessions.add_item(&session, &product, r.quantity).await?;
    Ok(Json(CartResponse::from(&cart)))
}

pub(super) async fn update_quantity(
    State(s): State<AppState>,
    Path((session, product_id)): Path<(String, ProductId)>,
    Json(r): Json<UpdateQuantityRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let cart = s.sessions.update_quantity(&session, product_id, r.quantity).await?;
    Ok(Json(CartResponse::from(&cart)))
}

pub(super) async fn remove_item(State(s): State<AppState>, Path((session, product_id)): Path<(String, ProductId)>) -> Result<Json<CartResponse>, ApiError> {
    let cart = s.sessions.remove_item(&session, product_id).await?;
    Ok(Json(CartResponse::from(&cart)))
}

pub(super) async fn clear_cart(State(s): State<AppState>, Path(session): Path<String>) -> Result<Json<CartResponse>, ApiError> {
    let cart = s.sessions.clear(&session).await?;
    Ok(Json(CartResponse::from(&cart)))
}
