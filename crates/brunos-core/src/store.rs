//! Order storage port.
//!
//! The hub only ever reads through [`OrderStore::list_all`]; every other
//! method is used by the order service.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::OrderResult;
use crate::order::model::{NewOrder, Order};

/// Durable storage for orders.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// All orders, oldest first.
    async fn list_all(&self) -> OrderResult<Vec<Order>>;

    /// Persist a new order and return it with its assigned id.
    async fn insert(&self, order: NewOrder) -> OrderResult<Order>;

    async fn find_by_name_and_article(
        &self,
        name: Option<&str>,
        article: &str,
    ) -> OrderResult<Vec<Order>>;

    /// Delete one order. Returns `false` if it was already gone.
    async fn delete(&self, id: i64) -> OrderResult<bool>;

    /// Delete every order and return how many were removed.
    async fn delete_all(&self) -> OrderResult<usize>;

    async fn count(&self) -> OrderResult<usize>;
}

/// In-process store, used when no Redis URL is configured and in tests.
#[derive(Default)]
pub struct MemoryOrderStore {
    inner: RwLock<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    next_id: i64,
    orders: BTreeMap<i64, Order>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn list_all(&self) -> OrderResult<Vec<Order>> {
        let inner = self.inner.read().await;
        Ok(inner.orders.values().cloned().collect())
    }

    async fn insert(&self, order: NewOrder) -> OrderResult<Order> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let order = order.into_order(inner.next_id);
        inner.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn find_by_name_and_article(
        &self,
        name: Option<&str>,
        article: &str,
    ) -> OrderResult<Vec<Order>> {
        let inner = self.inner.read().await;
        Ok(inner
            .orders
            .values()
            .filter(|o| o.matches(name, article))
            .cloned()
            .collect())
    }

    async fn delete(&self, id: i64) -> OrderResult<bool> {
        let mut inner = self.inner.write().await;
        Ok(inner.orders.remove(&id).is_some())
    }

    async fn delete_all(&self) -> OrderResult<usize> {
        let mut inner = self.inner.write().await;
        let count = inner.orders.len();
        inner.orders.clear();
        Ok(count)
    }

    async fn count(&self) -> OrderResult<usize> {
        Ok(self.inner.read().await.orders.len())
    }
}
