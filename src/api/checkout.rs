use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState};
use crate::checkout::{self as orders, whatsapp, CheckoutRequest};
use crate::domain::aggregates::Order;
use crate::ShopError;

pub(super) async fn place_order(State(s): State<AppState>, Path(session): Path<String>, Json(r): Json<CheckoutRequest>) -> Result<(StatusCode, Json<Order>), ApiError> {
    let order = orders::place_order(&s.sessions, s.orders.as_ref(), &session, r).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

#[derive(Debug, Deserialize)]
pub(super) struct WhatsAppParams {
    name: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct WhatsAppLink {
    message: String,
    url: String,
}

pub(super) async fn whatsapp_link(State(s): State<AppState>, Path(session): Path<String>, Query(p): Query<WhatsAppParams>) -> Result<Json<WhatsAppLink>, ApiError> {
    let number = s.storefront.whatsapp_number.as_deref().ok_or(ShopError::WhatsAppDisabled)?;
    let cart = s.sessions.cart(&session).await?;
    let message = whatsapp::order_message(&cart, &s.storefront.currency_symbol, p.name.as_deref())?;
    let url = whatsapp::order_link(number, &message);
    Ok(Json(WhatsAppLink { message, url }))
}
