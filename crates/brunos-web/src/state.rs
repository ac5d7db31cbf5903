//! Application state.

use std::path::PathBuf;
use std::sync::Arc;

use brunos_core::{Config, OrderService, OrderStore};
use brunos_hub::OrderSyncHub;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub orders: OrderService,
    pub hub: OrderSyncHub,
    pub upload_dir: PathBuf,
    pub session_buffer: usize,
    pub trust_forwarded_for: bool,
}

impl AppState {
    pub fn new(store: Arc<dyn OrderStore>, config: &Config) -> Self {
        let hub = OrderSyncHub::new(store.clone(), &config.hub);
        let orders = OrderService::new(store, Arc::new(hub.clone()));
        Self {
            orders,
            hub,
            upload_dir: PathBuf::from(&config.server.upload_dir),
            session_buffer: config.hub.session_buffer,
            trust_forwarded_for: config.server.trust_forwarded_for,
        }
    }
}
