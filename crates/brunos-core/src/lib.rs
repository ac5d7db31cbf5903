//! Bruno's Core Library
//!
//! Order model, storage port and the order service that drives the
//! kitchen display notifications.

pub mod config;
pub mod error;
pub mod notifier;
pub mod order;
pub mod store;

pub use config::Config;
pub use error::{OrderError, OrderResult};
pub use notifier::{NoopNotifier, OrderNotifier};
pub use order::model::{NewOrder, Order};
pub use order::OrderService;
pub use store::{MemoryOrderStore, OrderStore};
