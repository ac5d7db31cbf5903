//! [`OrderStore`] backed by Redis.

use async_trait::async_trait;
use brunos_core::{NewOrder, Order, OrderResult, OrderStore};

use crate::client::RedisPool;
use crate::queries::orders as queries;

pub struct RedisOrderStore {
    pool: RedisPool,
}

impl RedisOrderStore {
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    /// Connect to `redis_url` and wrap the pool.
    pub async fn connect(redis_url: &str) -> OrderResult<Self> {
        let pool = crate::client::init_pool(redis_url).await?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl OrderStore for RedisOrderStore {
    async fn list_all(&self) -> OrderResult<Vec<Order>> {
        Ok(queries::list_orders(&self.pool).await?)
    }

    async fn insert(&self, order: NewOrder) -> OrderResult<Order> {
        Ok(queries::create_order(&self.pool, order).await?)
    }

    async fn find_by_name_and_article(
        &self,
        name: Option<&str>,
        article: &str,
    ) -> OrderResult<Vec<Order>> {
        let orders = queries::list_orders(&self.pool).await?;
        Ok(orders
            .into_iter()
            .filter(|o| o.matches(name, article))
            .collect())
    }

    async fn delete(&self, id: i64) -> OrderResult<bool> {
        Ok(queries::delete_order(&self.pool, id).await?)
    }

    async fn delete_all(&self) -> OrderResult<usize> {
        Ok(queries::delete_all_orders(&self.pool).await?)
    }

    async fn count(&self) -> OrderResult<usize> {
        Ok(queries::count_orders(&self.pool).await?)
    }
}
