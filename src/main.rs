//! ShopWhats - storefront service

use std::sync::Arc;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shopwhats::api::{build_app, AppState, StorefrontSettings};
use shopwhats::catalog::{CatalogProvider, InMemoryCatalog, PgCatalog};
use shopwhats::checkout::{InMemoryOrders, OrderSubmitter, PgOrderSubmitter};
use shopwhats::config::load_app_config;
use shopwhats::events::EventPublisher;
use shopwhats::mirror::{CartMirror, InMemoryMirror, PgCartMirror};
use shopwhats::sessions::CartSessions;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = load_app_config()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| cfg.log_level.as_str().into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let nats = match &cfg.nats_url {
        Some(url) => match async_nats::connect(url.as_str()).await {
            Ok(client) => Some(client),
            Err(e) => { tracing::warn!(error = %e, "NATS unavailable, events will not be published"); None }
        },
        None => None,
    };
    let events = EventPublisher::new(nats);

    let catalog: Arc<dyn CatalogProvider>;
    let orders: Arc<dyn OrderSubmitter>;
    let mirror: Arc<dyn CartMirror>;
    match &cfg.database_url {
        Some(url) => {
            let db = PgPoolOptions::new().max_connections(cfg.db_max_connections).connect(url).await?;
            sqlx::migrate!("./migrations").run(&db).await?;
            catalog = Arc::new(PgCatalog::new(db.clone()));
            orders = Arc::new(PgOrderSubmitter::new(db.clone()));
            mirror = Arc::new(PgCartMirror::new(db));
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory stores");
            catalog = Arc::new(match &cfg.catalog_path {
                Some(path) => InMemoryCatalog::from_json_file(path).await?,
                None => InMemoryCatalog::default(),
            });
            orders = Arc::new(InMemoryOrders::new());
            mirror = Arc::new(InMemoryMirror::new());
        }
    }

    let state = AppState {
        catalog,
        sessions: Arc::new(CartSessions::new(mirror, events)),
        orders,
        storefront: Arc::new(StorefrontSettings { whatsapp_number: cfg.whatsapp_number.clone(), currency_symbol: cfg.currency_symbol.clone() }),
    };

    tracing::info!("ShopWhats listening on {}", cfg.bind_addr);
    axum::serve(tokio::net::TcpListener::bind(cfg.bind_addr).await?, build_app(state)).await?;
    Ok(())
}
