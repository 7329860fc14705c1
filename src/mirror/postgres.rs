use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;

use super::CartMirror;
use crate::domain::aggregates::CartSnapshot;
use crate::Result;

/// Snapshots stored as `jsonb` in `cart_snapshots`, one row per session.
#[derive(Debug, Clone)]
pub struct PgCartMirror {
    db: PgPool,
}

impl PgCartMirror {
    pub fn new(db: PgPool) -> Self { Self { db } }
}

#[async_trait]
impl CartMirror for PgCartMirror {
    async fn load(&self, session: &str) -> Result<Option<CartSnapshot>> {
        let row: Option<(Json<CartSnapshot>,)> = sqlx::query_as("SELECT snapshot FROM cart_snapshots WHERE session_id = $1")
            .bind(session)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(|(Json(snapshot),)| snapshot))
    }

    async fn save(&self, session: &str, snapshot: &CartSnapshot) -> Result<()> {
        sqlx::query("INSERT INTO cart_snapshots (session_id, snapshot, updated_at) VALUES ($1, $2, NOW()) \
             ON CONFLICT (session_id) DO UPDATE SET snapshot = EXCLUDED.snapshot, updated_at = NOW()")
            .bind(session)
            .bind(Json(snapshot))
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn remove(&self, session: &str) -> Result<()> {
        sqlx::query("DELETE FROM cart_snapshots WHERE session_id = $1").bind(session).execute(&self.db).await?;
        Ok(())
    }
}
