//! Connection lifecycle handling.
//!
//! Turns transport open/close signals into registry changes and replays
//! the order list to devices the registry had not seen.

use std::sync::Arc;
use std::time::Duration;

use brunos_core::OrderStore;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::dispatcher::Dispatcher;
use crate::error::HubResult;
use crate::event::OrderEvent;
use crate::registry::{ClientRegistry, Registration};
use crate::session::{DeviceIdentity, Session, SessionId};

/// What happened to a session that just opened.
#[derive(Debug)]
pub enum ConnectOutcome {
    /// No usable identity, or the registry rejected it. The session was
    /// disconnected.
    Refused,
    /// First session for this device; the full order dump runs in `sync`.
    NewDevice { sync: JoinHandle<()> },
    /// The device was already connected; no resync.
    AdditionalSession,
}

pub struct LifecycleHandler {
    registry: Arc<ClientRegistry>,
    dispatcher: Arc<Dispatcher>,
    store: Arc<dyn OrderStore>,
    sync_delay: Duration,
}

impl LifecycleHandler {
    pub fn new(
        registry: Arc<ClientRegistry>,
        dispatcher: Arc<Dispatcher>,
        store: Arc<dyn OrderStore>,
        sync_delay: Duration,
    ) -> Self {
        Self {
            registry,
            dispatcher,
            store,
            sync_delay,
        }
    }

    /// Transport reported a new session.
    pub async fn on_session_opened(
        &self,
        identity: Option<DeviceIdentity>,
        session: Arc<dyn Session>,
    ) -> ConnectOutcome {
        let session_id = session.id();
        let Some(identity) = identity else {
            warn!(session_id = %session_id, "Connection refused, no usable device address");
            session.disconnect().await;
            return ConnectOutcome::Refused;
        };

        match self.registry.register(identity, session.clone()).await {
            Ok(Registration::NewDevice) => {
                info!(device = %identity, session_id = %session_id, "Display connected");
                let sync = tokio::spawn(initial_sync(
                    self.dispatcher.clone(),
                    self.store.clone(),
                    session,
                    self.sync_delay,
                ));
                ConnectOutcome::NewDevice { sync }
            }
            Ok(Registration::AdditionalSession) => {
                debug!(
                    device = %identity,
                    session_id = %session_id,
                    "Additional session for connected display, no resync"
                );
                ConnectOutcome::AdditionalSession
            }
            Err(e) => {
                error!(device = %identity, session_id = %session_id, error = %e, "Refusing session");
                session.disconnect().await;
                ConnectOutcome::Refused
            }
        }
    }

    /// Transport reported a closed session. Safe to call more than once.
    pub async fn on_session_closed(&self, identity: &DeviceIdentity, session_id: SessionId) -> bool {
        let removed = self.registry.unregister(identity, session_id).await;
        info!(device = %identity, session_id = %session_id, removed, "Display session closed");
        removed
    }
}

/// Send `init` followed by one `order` per stored order.
///
/// The order list is a snapshot; orders created meanwhile reach the
/// display through the regular broadcast.
async fn initial_sync(
    dispatcher: Arc<Dispatcher>,
    store: Arc<dyn OrderStore>,
    session: Arc<dyn Session>,
    delay: Duration,
) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    match push_all_orders(&dispatcher, store.as_ref(), session.as_ref()).await {
        Ok((sent, total)) => {
            debug!(session_id = %session.id(), sent, total, "Initial sync done");
        }
        Err(e) => {
            error!(session_id = %session.id(), error = %e, "Initial sync failed");
        }
    }
}

async fn push_all_orders(
    dispatcher: &Dispatcher,
    store: &dyn OrderStore,
    session: &dyn Session,
) -> HubResult<(usize, usize)> {
    if let Err(e) = dispatcher.send_to(session, &OrderEvent::Init).await {
        error!(session_id = %session.id(), error = %e, "Failed to send init, dumping orders anyway");
    }

    let orders = store.list_all().await?;
    let total = orders.len();
    let mut sent = 0;
    for order in orders {
        let order_id = order.id;
        match dispatcher.send_to(session, &OrderEvent::OrderAdded(order)).await {
            Ok(()) => sent += 1,
            Err(e) => {
                error!(session_id = %session.id(), order_id, error = %e, "Failed to sync order");
            }
        }
    }
    Ok((sent, total))
}
