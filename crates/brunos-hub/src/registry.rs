//! Client registry.
//!
//! Maps each device to its live sessions. A device may hold several
//! sessions at once (tab reopened, transport upgrade, reconnect race), and
//! the "new device" signal fires only when the device itself appears.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{HubError, HubResult};
use crate::session::{DeviceIdentity, Session, SessionId};

/// Result of registering a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// The device had no live session before this one.
    NewDevice,
    /// The device was already connected through another session.
    AdditionalSession,
}

#[derive(Default)]
struct RegistryInner {
    devices: HashMap<DeviceIdentity, HashMap<SessionId, Arc<dyn Session>>>,
    /// Reverse index; a session belongs to exactly one device.
    owners: HashMap<SessionId, DeviceIdentity>,
}

/// Live sessions grouped by device.
#[derive(Default)]
pub struct ClientRegistry {
    inner: RwLock<RegistryInner>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `session` under `identity`.
    ///
    /// Registering a session id already owned by another device is an
    /// invariant violation and leaves the registry untouched.
    pub async fn register(
        &self,
        identity: DeviceIdentity,
        session: Arc<dyn Session>,
    ) -> HubResult<Registration> {
        let session_id = session.id();
        let mut inner = self.inner.write().await;

        if let Some(owner) = inner.owners.get(&session_id) {
            if *owner != identity {
                return Err(HubError::RegistryInvariant(format!(
                    "session {} already belongs to device {}, refused for {}",
                    session_id, owner, identity
                )));
            }
            return Ok(Registration::AdditionalSession);
        }

        let sessions = inner.devices.entry(identity).or_default();
        let registration = if sessions.is_empty() {
            Registration::NewDevice
        } else {
            Registration::AdditionalSession
        };
        sessions.insert(session_id, session);
        inner.owners.insert(session_id, identity);

        debug!(
            device = %identity,
            session_id = %session_id,
            ?registration,
            "Session registered"
        );
        Ok(registration)
    }

    /// Remove `session_id` from `identity`. Returns `false` when there was
    /// nothing to remove.
    pub async fn unregister(&self, identity: &DeviceIdentity, session_id: SessionId) -> bool {
        let mut inner = self.inner.write().await;

        match inner.owners.get(&session_id) {
            None => return false,
            Some(owner) if owner != identity => {
                warn!(
                    device = %identity,
                    owner = %owner,
                    session_id = %session_id,
                    "Ignoring unregister for a session owned by another device"
                );
                return false;
            }
            Some(_) => {}
        }
        inner.owners.remove(&session_id);

        let now_empty = match inner.devices.get_mut(identity) {
            Some(sessions) => {
                sessions.remove(&session_id);
                sessions.is_empty()
            }
            None => false,
        };
        if now_empty {
            inner.devices.remove(identity);
            debug!(device = %identity, "Last session closed, device removed");
        }
        true
    }

    /// Snapshot of every live session. Later registry changes do not
    /// affect the returned iterator.
    pub async fn all_sessions(&self) -> std::vec::IntoIter<Arc<dyn Session>> {
        let inner = self.inner.read().await;
        let snapshot: Vec<Arc<dyn Session>> = inner
            .devices
            .values()
            .flat_map(|sessions| sessions.values().cloned())
            .collect();
        snapshot.into_iter()
    }

    /// Snapshot of the sessions of one device.
    pub async fn sessions_for(&self, identity: &DeviceIdentity) -> Vec<Arc<dyn Session>> {
        let inner = self.inner.read().await;
        inner
            .devices
            .get(identity)
            .map(|sessions| sessions.values().cloned().collect())
            .unwrap_or_default()
    }

    pub async fn is_connected(&self, identity: &DeviceIdentity) -> bool {
        self.inner.read().await.devices.contains_key(identity)
    }

    pub async fn device_count(&self) -> usize {
        self.inner.read().await.devices.len()
    }

    pub async fn session_count(&self) -> usize {
        self.inner.read().await.owners.len()
    }
}
