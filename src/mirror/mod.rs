//! Persistence mirror for session carts.
//!
//! The cart itself never touches storage. The session layer saves a
//! [`CartSnapshot`] after every change and loads it again when a session is
//! first seen, so a cart survives a restart.

mod postgres;

pub use postgres::PgCartMirror;

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::aggregates::CartSnapshot;
use crate::Result;

#[async_trait]
pub trait CartMirror: Send + Sync {
    async fn load(&self, session: &str) -> Result<Option<CartSnapshot>>;

    async fn save(&self, session: &str, snapshot: &CartSnapshot) -> Result<()>;

    async fn remove(&self, session: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct InMemoryMirror {
    snapshots: RwLock<HashMap<String, CartSnapshot>>,
}

impl InMemoryMirror {
    pub fn new() -> Self { Self::default() }
}

#[async_trait]
impl CartMirror for InMemoryMirror {
    async fn load(&self, session: &str) -> Result<Option<CartSnapshot>> {
        Ok(self.snapshots.read().await.get(session).cloned())
    }

    async fn save(&self, session: &str, snapshot: &CartSnapshot) -> Result<()> {
        self.snapshots.write().await.insert(session.to_string(), snapshot.clone());
        Ok(())
    }

    async fn remove(&self, session: &str) -> Result<()> {
        self.snapshots.write().await.remove(session);
        Ok(())
    }
}
