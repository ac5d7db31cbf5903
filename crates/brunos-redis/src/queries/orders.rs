//! Order queries — Redis implementation.
//!
//! Layout:
//! - `brunos:order:{id}` hash, field `data` holds the JSON order
//! - `brunos:orders` sorted set of ids, scored by id
//! - `brunos:orders:next_id` counter

use brunos_core::{NewOrder, Order};
use redis::AsyncCommands;

use crate::client::{RedisPool, RedisResult};

const ORDERS_KEY: &str = "brunos:orders";
const NEXT_ID_KEY: &str = "brunos:orders:next_id";

pub(crate) fn order_key(id: i64) -> String {
    format!("brunos:order:{}", id)
}

/// Index and payload of one order, written in one transaction.
fn insert_pipeline(order: &Order, json: &str) -> redis::Pipeline {
    let mut pipe = redis::pipe();
    pipe.atomic()
        .hset(order_key(order.id), "data", json)
        .ignore()
        .zadd(ORDERS_KEY, order.id, order.id)
        .ignore();
    pipe
}

/// Read and drop the whole index in one transaction, so an order indexed
/// concurrently is either returned here or survives the clear.
fn take_index_pipeline() -> redis::Pipeline {
    let mut pipe = redis::pipe();
    pipe.atomic().zrange(ORDERS_KEY, 0, -1).del(ORDERS_KEY).ignore();
    pipe
}

pub async fn create_order(pool: &RedisPool, order: NewOrder) -> RedisResult<Order> {
    let mut conn = pool.clone();
    let id: i64 = conn.incr(NEXT_ID_KEY, 1).await?;
    let order = order.into_order(id);

    let json = serde_json::to_string(&order)?;
    let () = insert_pipeline(&order, &json).query_async(&mut conn).await?;
    Ok(order)
}

pub async fn list_orders(pool: &RedisPool) -> RedisResult<Vec<Order>> {
    let mut conn = pool.clone();
    let ids: Vec<i64> = conn.zrange(ORDERS_KEY, 0, -1).await?;
    let mut orders = Vec::with_capacity(ids.len());
    for id in ids {
        let json: Option<String> = conn.hget(order_key(id), "data").await?;
        if let Some(j) = json {
            match serde_json::from_str::<Order>(&j) {
                Ok(order) => orders.push(order),
                Err(e) => tracing::warn!(order_id = id, error = %e, "Skipping unreadable order"),
            }
        }
    }
    Ok(orders)
}

/// Remove one order. Returns `false` if it was not indexed.
pub async fn delete_order(pool: &RedisPool, id: i64) -> RedisResult<bool> {
    let mut conn = pool.clone();
    let (removed,): (i64,) = redis::pipe()
        .atomic()
        .zrem(ORDERS_KEY, id)
        .del(order_key(id))
        .ignore()
        .query_async(&mut conn)
        .await?;
    Ok(removed > 0)
}

/// Remove every order. The id counter is kept so ids are never reused.
pub async fn delete_all_orders(pool: &RedisPool) -> RedisResult<usize> {
    let mut conn = pool.clone();
    let (ids,): (Vec<i64>,) = take_index_pipeline().query_async(&mut conn).await?;
    if ids.is_empty() {
        return Ok(0);
    }
    // Payloads are unreachable once unindexed.
    let keys: Vec<String> = ids.iter().map(|id| order_key(*id)).collect();
    conn.del::<_, ()>(keys).await?;
    Ok(ids.len())
}

pub async fn count_orders(pool: &RedisPool) -> RedisResult<usize> {
    let mut conn = pool.clone();
    let count: usize = conn.zcard(ORDERS_KEY).await?;
    Ok(count)
}
