//! Order management.
//!
//! Every mutation is committed to the store first and only then reported
//! to the notifier, so displays never hear about an order the store lost.

pub mod model;
pub mod report;

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::OrderResult;
use crate::notifier::OrderNotifier;
use crate::store::OrderStore;
use model::{NewOrder, Order};

/// Order service shared by the HTTP handlers.
#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn OrderStore>,
    notifier: Arc<dyn OrderNotifier>,
}

impl OrderService {
    pub fn new(store: Arc<dyn OrderStore>, notifier: Arc<dyn OrderNotifier>) -> Self {
        Self { store, notifier }
    }

    pub fn store(&self) -> &Arc<dyn OrderStore> {
        &self.store
    }

    /// Save an order, unless the same person already ordered the same article.
    ///
    /// A duplicate returns the existing order and notifies nobody.
    pub async fn save(&self, order: NewOrder) -> OrderResult<Order> {
        let order = order.normalized()?;

        let existing = self
            .store
            .find_by_name_and_article(order.name.as_deref(), &order.article)
            .await?;
        if let Some(existing) = existing.into_iter().next() {
            warn!(order_id = existing.id, article = %existing.article, "Order already exists");
            return Ok(existing);
        }

        let saved = self.store.insert(order).await?;
        info!(order_id = saved.id, article = %saved.article, "Order saved");
        self.notifier.order_created(&saved).await;
        Ok(saved)
    }

    /// Delete every order matching the name and article. Returns the count.
    pub async fn delete(&self, order: NewOrder) -> OrderResult<usize> {
        let order = order.normalized()?;
        let matches = self
            .store
            .find_by_name_and_article(order.name.as_deref(), &order.article)
            .await?;

        let mut deleted = 0;
        for existing in matches {
            info!(order_id = existing.id, article = %existing.article, "Deleting order");
            if self.store.delete(existing.id).await? {
                deleted += 1;
                self.notifier.order_deleted(&existing).await;
            }
        }
        Ok(deleted)
    }

    /// Remove all orders and tell the displays to reset.
    pub async fn delete_all(&self) -> OrderResult<usize> {
        let deleted = self.store.delete_all().await?;
        info!(deleted, "Cleared all orders");
        self.notifier.all_cleared().await;
        Ok(deleted)
    }

    pub async fn find_all(&self) -> OrderResult<Vec<Order>> {
        self.store.list_all().await
    }

    /// Plain-text summary of the current orders.
    pub async fn generate_report(&self) -> OrderResult<String> {
        let orders = self.store.list_all().await?;
        Ok(report::render(&orders))
    }

    /// Forward a menu change. The image itself is stored by the caller.
    pub async fn menu_updated(&self) {
        self.notifier.menu_changed().await;
    }
}
