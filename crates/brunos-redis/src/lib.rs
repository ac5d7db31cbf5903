//! Bruno's Redis Data Layer
//!
//! Async Redis persistence for orders, exposed to the rest of the
//! application through [`brunos_core::OrderStore`].

pub mod client;
pub mod queries;
pub mod store;

pub use client::{init_pool, RedisError, RedisPool, RedisResult};
pub use queries::orders;
pub use store::RedisOrderStore;
