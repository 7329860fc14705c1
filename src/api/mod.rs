//! HTTP surface of the storefront.

mod cart;
mod checkout;
mod products;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::catalog::CatalogProvider;
use crate::checkout::OrderSubmitter;
use crate::domain::aggregates::OrderError;
use crate::sessions::CartSessions;
use crate::ShopError;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogProvider>,
    pub sessions: Arc<CartSessions>,
    pub orders: Arc<dyn OrderSubmitter>,
    pub storefront: Arc<StorefrontSettings>,
}

/// Presentation settings for the WhatsApp funnel.
#[derive(Debug, Clone)]
pub struct StorefrontSettings {
    /// Digits only.
    pub whatsapp_number: Option<String>,
    pub currency_symbol: String,
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "shopwhats"})) }))
        .route("/api/v1/products", get(products::list_products))
        .route("/api/v1/products/:id", get(products::get_product))
        .route("/api/v1/categories", get(products::list_categories))
        .route("/api/v1/cart/:session", get(cart::get_cart).delete(cart::clear_cart))
        .route("/api/v1/cart/:session/items", post(cart::add_item))
        .route("/api/v1/cart/:session/items/:product_id", put(cart::update_quantity).delete(cart::remove_item))
        .route("/api/v1/checkout/:session", post(checkout::place_order))
        .route("/api/v1/checkout/:session/whatsapp", get(checkout::whatsapp_link))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug)]
pub struct ApiError(ShopError);

impl<E: Into<ShopError>> From<E> for ApiError {
    fn from(e: E) -> Self { Self(e.into()) }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            ShopError::ProductNotFound(_) => (StatusCode::NOT_FOUND, "product_not_found"),
            ShopError::WhatsAppDisabled => (StatusCode::NOT_FOUND, "whatsapp_disabled"),
            ShopError::InvalidSession => (StatusCode::BAD_REQUEST, "invalid_session"),
            ShopError::Order(OrderError::EmptyCart) => (StatusCode::BAD_REQUEST, "empty_cart"),
            ShopError::InvalidQuantity => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_quantity"),
            ShopError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_failed"),
            ShopError::Product(_) | ShopError::Storage(_) | ShopError::Serialization(_) | ShopError::Io(_) => {
                tracing::error!(error = %self.0, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR { "internal server error".to_string() } else { self.0.to_string() };
        (status, Json(serde_json::json!({ "error": ErrorBody { code, message } }))).into_response()
    }
}
