//! One cart per browsing session.
//!
//! `CartSessions` is built once at startup and handed to whoever needs it.
//! Each session's cart sits behind its own mutex, held for the whole of an
//! operation including the mirror write, so operations on one session run
//! strictly one after another.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::domain::aggregates::{Cart, Product, ProductId};
use crate::events::EventPublisher;
use crate::mirror::CartMirror;
use crate::{Result, ShopError};

pub type CartHandle = Arc<Mutex<Cart>>;

/// A session's cart, locked for the duration of an operation.
pub type LockedCart = OwnedMutexGuard<Cart>;

pub struct CartSessions {
    carts: RwLock<HashMap<String, CartHandle>>,
    mirror: Arc<dyn CartMirror>,
    events: EventPublisher,
}

impl std::fmt::Debug for CartSessions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartSessions").field("events", &self.events).finish_non_exhaustive()
    }
}

/// Session ids are 1 to 128 characters of `[A-Za-z0-9_-]`.
pub fn validate_session_id(session: &str) -> Result<()> {
    let valid = !session.is_empty()
        && session.len() <= 128
        && session.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid { Ok(()) } else { Err(ShopError::InvalidSession) }
}

impl CartSessions {
    pub fn new(mirror: Arc<dyn CartMirror>, events: EventPublisher) -> Self {
        Self { carts: RwLock::new(HashMap::new()), mirror, events }
    }

    pub fn events(&self) -> &EventPublisher { &self.events }

    /// Number of carts currently held in memory.
    pub async fn active(&self) -> usize { self.carts.read().await.len() }

    /// Mirrored cart for `session`, or an empty one when nothing is stored or
    /// the mirror cannot be read.
    async fn load(&self, session: &str) -> Cart {
        match self.mirror.load(session).await {
            Ok(Some(snapshot)) => {
                let cart = Cart::restore(&snapshot);
                if cart.items().len() != snapshot.lines.len() {
                    tracing::warn!(session, kept = cart.items().len(), stored = snapshot.lines.len(), "mirrored cart repaired on restore");
                }
                cart
            }
            Ok(None) => Cart::new(),
            Err(e) => {
                tracing::error!(session, error = %e, "cart mirror load failed, starting empty");
                Cart::new()
            }
        }
    }

    async fn handle(&self, session: &str) -> CartHandle {
        if let Some(handle) = self.carts.read().await.get(session) {
            return handle.clone();
        }
        let restored = self.load(session).await;

        // Another request may have created the cart while the mirror was read.
        let mut carts = self.carts.write().await;
        carts.entry(session.to_string()).or_insert_with(|| Arc::new(Mutex::new(restored))).clone()
    }

    /// Locks the session's cart, rehydrating it from the mirror on first use.
    /// A cart evicted while this call waited for its lock is skipped in favour
    /// of the session's current one.
    pub async fn lock(&self, session: &str) -> Result<LockedCart> {
        validate_session_id(session)?;
        loop {
            let handle = self.handle(session).await;
            let cart = handle.clone().lock_owned().await;
            if self.carts.read().await.get(session).is_some_and(|current| Arc::ptr_eq(current, &handle)) {
                return Ok(cart);
            }
        }
    }

    /// Drops the session's in-memory cart once it is empty. The mirror holds
    /// nothing for an empty cart either, so the next use starts fresh.
    pub async fn release(&self, session: &str, cart: &LockedCart) {
        if !cart.is_empty() { return; }
        let mut carts = self.carts.write().await;
        if carts.get(session).is_some_and(|current| Arc::ptr_eq(current, OwnedMutexGuard::mutex(cart))) {
            carts.remove(session);
        }
    }

    /// Mirrors the cart, publishes its pending events and releases it if it
    /// ended up empty. Mirror failures are logged, not returned.
    pub async fn persist(&self, session: &str, cart: &mut LockedCart) {
        let result = if cart.is_empty() {
            self.mirror.remove(session).await
        } else {
            self.mirror.save(session, &cart.snapshot()).await
        };
        if let Err(e) = result {
            tracing::error!(session, error = %e, "cart mirror write failed");
        }
        self.events.publish_all(cart.take_events()).await;
        self.release(session, cart).await;
    }

    /// Applies `op` to the session's cart and returns the resulting cart.
    pub async fn mutate<F>(&self, session: &str, op: F) -> Result<Cart>
    where
        F: FnOnce(&mut Cart) + Send,
    {
        let mut cart = self.lock(session).await?;
        op(&mut *cart);
        self.persist(session, &mut cart).await;
        Ok(cart.clone())
    }

    /// Current cart of the session. Reading never keeps a cart in memory that
    /// was not already there.
    pub async fn cart(&self, session: &str) -> Result<Cart> {
        validate_session_id(session)?;
        let handle = self.carts.read().await.get(session).cloned();
        match handle {
            Some(handle) => Ok(handle.lock().await.clone()),
            None => Ok(self.load(session).await),
        }
    }

    pub async fn add_item(&self, session: &str, product: &Product, quantity: u32) -> Result<Cart> {
        if quantity == 0 { return Err(ShopError::InvalidQuantity); }
        tracing::debug!(session, product_id = product.id(), quantity, "add to cart");
        self.mutate(session, |cart| cart.add_item(product, quantity)).await
    }

    pub async fn update_quantity(&self, session: &str, product_id: ProductId, quantity: i64) -> Result<Cart> {
        tracing::debug!(session, product_id, quantity, "update cart quantity");
        self.mutate(session, |cart| cart.update_quantity(product_id, quantity)).await
    }

    pub async fn remove_item(&self, session: &str, product_id: ProductId) -> Result<Cart> {
        tracing::debug!(session, product_id, "remove from cart");
        self.mutate(session, |cart| { cart.remove_item(product_id); }).await
    }

    pub async fn clear(&self, session: &str) -> Result<Cart> {
        tracing::debug!(session, "clear cart");
        self.mutate(session, Cart::clear).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::CartSnapshot;
    use crate::domain::value_objects::Money;
    use crate::mirror::InMemoryMirror;
    use async_trait::async_trait;
    use rust_decimal::Decimal;

    /// Mirror whose storage is down.
    struct BrokenMirror;

    #[async_trait]
    impl CartMirror for BrokenMirror {
        async fn load(&self, _session: &str) -> Result<Option<CartSnapshot>> { Err(ShopError::Storage(sqlx::Error::PoolClosed)) }
        async fn save(&self, _session: &str, _snapshot: &CartSnapshot) -> Result<()> { Err(ShopError::Storage(sqlx::Error::PoolClosed)) }
        async fn remove(&self, _session: &str) -> Result<()> { Err(ShopError::Storage(sqlx::Error::PoolClosed)) }
    }

    fn product(id: ProductId, price: i64) -> Product {
        Product::new(id, format!("P{id}"), Money::new(Decimal::new(price, 0))).unwrap()
    }

    fn sessions(mirror: Arc<InMemoryMirror>) -> CartSessions {
        CartSessions::new(mirror, EventPublisher::disabled())
    }

    #[test]
    fn test_session_id_rules() {
        assert!(validate_session_id("abc-DEF_123").is_ok());
        assert!(validate_session_id("").is_err());
        assert!(validate_session_id("a/b").is_err());
        assert!(validate_session_id(&"x".repeat(129)).is_err());
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let s = sessions(Arc::new(InMemoryMirror::new()));
        s.add_item("a", &product(1, 10), 2).await.unwrap();
        assert_eq!(s.cart("a").await.unwrap().item_count(), 2);
        assert!(s.cart("b").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mutations_are_mirrored() {
        let mirror = Arc::new(InMemoryMirror::new());
        let s = sessions(mirror.clone());
        s.add_item("a", &product(1, 10), 2).await.unwrap();
        s.add_item("a", &product(2, 5), 1).await.unwrap();
        let saved = mirror.load("a").await.unwrap().unwrap();
        assert_eq!(saved.lines.iter().map(|l| (l.product_id, l.quantity)).collect::<Vec<_>>(), vec![(1, 2), (2, 1)]);

        s.clear("a").await.unwrap();
        assert!(mirror.load("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rehydrates_from_mirror() {
        let mirror = Arc::new(InMemoryMirror::new());
        let mut cart = Cart::new();
        cart.add_item(&product(3, 7), 4);
        mirror.save("returning", &cart.snapshot()).await.unwrap();

        let s = sessions(mirror);
        let restored = s.cart("returning").await.unwrap();
        assert_eq!(restored.total().amount(), Decimal::new(28, 0));
    }

    #[tokio::test]
    async fn test_zero_add_rejected() {
        let s = sessions(Arc::new(InMemoryMirror::new()));
        assert!(matches!(s.add_item("a", &product(1, 10), 0).await, Err(ShopError::InvalidQuantity)));
    }

    #[tokio::test]
    async fn test_concurrent_adds_do_not_lose_updates() {
        let s = Arc::new(sessions(Arc::new(InMemoryMirror::new())));
        let p = product(1, 1);
        let tasks: Vec<_> = (0..20).map(|_| {
            let s = s.clone();
            let p = p.clone();
            tokio::spawn(async move { s.add_item("shared", &p, 1).await.map(|_| ()) })
        }).collect();
        for t in tasks { t.await.unwrap().unwrap(); }
        let cart = s.cart("shared").await.unwrap();
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.item_count(), 20);
    }

    #[tokio::test]
    async fn test_reads_do_not_hold_carts() {
        let s = sessions(Arc::new(InMemoryMirror::new()));
        for i in 0..1000 {
            assert!(s.cart(&format!("visitor-{i}")).await.unwrap().is_empty());
        }
        assert_eq!(s.active().await, 0);
    }

    #[tokio::test]
    async fn test_read_sees_mirrored_cart_without_holding_it() {
        let mirror = Arc::new(InMemoryMirror::new());
        let mut cart = Cart::new();
        cart.add_item(&product(1, 3), 2);
        mirror.save("returning", &cart.snapshot()).await.unwrap();

        let s = sessions(mirror);
        assert_eq!(s.cart("returning").await.unwrap().item_count(), 2);
        assert_eq!(s.active().await, 0);
    }

    #[tokio::test]
    async fn test_emptied_carts_are_released() {
        let s = sessions(Arc::new(InMemoryMirror::new()));
        s.add_item("a", &product(1, 10), 1).await.unwrap();
        s.add_item("b", &product(1, 10), 1).await.unwrap();
        assert_eq!(s.active().await, 2);

        s.clear("a").await.unwrap();
        s.remove_item("b", 1).await.unwrap();
        assert_eq!(s.active().await, 0);

        let cart = s.add_item("a", &product(2, 4), 1).await.unwrap();
        assert_eq!(cart.total().amount(), Decimal::new(4, 0));
        assert_eq!(s.active().await, 1);
    }

    #[tokio::test]
    async fn test_mirror_write_failure_does_not_fail_mutation() {
        let s = CartSessions::new(Arc::new(BrokenMirror), EventPublisher::disabled());
        let cart = s.add_item("a", &product(1, 10), 2).await.unwrap();
        assert_eq!(cart.item_count(), 2);
        assert_eq!(s.cart("a").await.unwrap().item_count(), 2);
        assert!(s.clear("a").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mirror_load_failure_starts_empty() {
        let s = CartSessions::new(Arc::new(BrokenMirror), EventPublisher::disabled());
        assert!(s.cart("a").await.unwrap().is_empty());
        let cart = s.update_quantity("a", 1, 3).await.unwrap();
        assert!(cart.is_empty());
    }
}
