//! Order sync hub: composition root of the display side.

use std::sync::Arc;

use async_trait::async_trait;
use brunos_core::config::HubConfig;
use brunos_core::{Order, OrderNotifier, OrderStore};
use serde_json::Value;
use tracing::info;

use crate::dispatcher::{BroadcastReport, Dispatcher};
use crate::event::OrderEvent;
use crate::lifecycle::LifecycleHandler;
use crate::registry::ClientRegistry;
use crate::session::SessionId;

/// Relays committed order changes to every connected display.
///
/// Cheap to clone; all clones share one registry.
#[derive(Clone)]
pub struct OrderSyncHub {
    registry: Arc<ClientRegistry>,
    dispatcher: Arc<Dispatcher>,
    lifecycle: Arc<LifecycleHandler>,
}

impl OrderSyncHub {
    pub fn new(store: Arc<dyn OrderStore>, config: &HubConfig) -> Self {
        let registry = Arc::new(ClientRegistry::new());
        let dispatcher = Arc::new(Dispatcher::new(registry.clone(), config.send_timeout()));
        let lifecycle = Arc::new(LifecycleHandler::new(
            registry.clone(),
            dispatcher.clone(),
            store,
            config.initial_sync_delay(),
        ));
        Self {
            registry,
            dispatcher,
            lifecycle,
        }
    }

    pub fn registry(&self) -> &ClientRegistry {
        &self.registry
    }

    /// Connect/disconnect callbacks for the transport.
    pub fn lifecycle(&self) -> &LifecycleHandler {
        &self.lifecycle
    }

    pub async fn order_created(&self, order: &Order) -> BroadcastReport {
        info!(order_id = order.id, "Sending order to displays");
        self.dispatcher.broadcast(&OrderEvent::OrderAdded(order.clone())).await
    }

    pub async fn order_deleted(&self, order: &Order) -> BroadcastReport {
        info!(order_id = order.id, "Removing order from displays");
        self.dispatcher.broadcast(&OrderEvent::OrderRemoved(order.clone())).await
    }

    pub async fn all_cleared(&self) -> BroadcastReport {
        info!("Resetting displays");
        self.dispatcher.broadcast(&OrderEvent::Reset).await
    }

    pub async fn menu_changed(&self) -> BroadcastReport {
        info!("Announcing menu update");
        self.dispatcher.broadcast(&OrderEvent::MenuUpdated).await
    }

    /// Forward a display's `post` message to every other session.
    pub async fn relay_post(&self, sender: SessionId, payload: Value) -> BroadcastReport {
        info!(session_id = %sender, "Relaying post");
        self.dispatcher
            .broadcast_except(sender, &OrderEvent::Post(payload))
            .await
    }
}

// Forwards to the inherent methods and drops the report.
#[async_trait]
impl OrderNotifier for OrderSyncHub {
    async fn order_created(&self, order: &Order) {
        OrderSyncHub::order_created(self, order).await;
    }

    async fn order_deleted(&self, order: &Order) {
        OrderSyncHub::order_deleted(self, order).await;
    }

    async fn all_cleared(&self) {
        OrderSyncHub::all_cleared(self).await;
    }

    async fn menu_changed(&self) {
        OrderSyncHub::menu_changed(self).await;
    }
}
