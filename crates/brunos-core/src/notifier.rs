//! Notification port between the order service and the display hub.

use async_trait::async_trait;

use crate::order::model::Order;

/// Receives a call after each committed order mutation.
///
/// Implementations must not fail: delivery problems are theirs to log.
#[async_trait]
pub trait OrderNotifier: Send + Sync {
    async fn order_created(&self, order: &Order);

    async fn order_deleted(&self, order: &Order);

    async fn all_cleared(&self);

    async fn menu_changed(&self);
}

/// Notifier that drops everything. Used by offline commands such as `report`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

#[async_trait]
impl OrderNotifier for NoopNotifier {
    async fn order_created(&self, _order: &Order) {}

    async fn order_deleted(&self, _order: &Order) {}

    async fn all_cleared(&self) {}

    async fn menu_changed(&self) {}
}
