//! Transport-facing types: who is connected and how to reach them.

use std::fmt;
use std::net::{IpAddr, SocketAddr};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::HubResult;
use crate::event::Frame;

/// Token for one live transport connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A display device, identified by its network address.
///
/// Devices behind the same NAT share one identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceIdentity(IpAddr);

impl DeviceIdentity {
    /// `None` for addresses that cannot name a device (e.g. `0.0.0.0`).
    pub fn new(addr: IpAddr) -> Option<Self> {
        if addr.is_unspecified() {
            None
        } else {
            Some(Self(addr))
        }
    }

    /// Resolve the identity of a connecting client.
    ///
    /// `forwarded_for` is the raw `X-Forwarded-For` value and must only be
    /// passed when the transport trusts its proxy. Its first entry wins when
    /// it parses; otherwise the peer address of the socket is used.
    pub fn resolve(peer: Option<SocketAddr>, forwarded_for: Option<&str>) -> Option<Self> {
        let forwarded = forwarded_for
            .and_then(|v| v.split(',').next())
            .and_then(|v| v.trim().parse::<IpAddr>().ok());
        forwarded
            .or_else(|| peer.map(|p| p.ip()))
            .and_then(Self::new)
    }

    pub fn addr(&self) -> IpAddr {
        self.0
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// One live connection to a display.
#[async_trait]
pub trait Session: Send + Sync {
    fn id(&self) -> SessionId;

    /// Push one frame. May wait on a slow client; callers bound it.
    async fn send(&self, frame: &Frame) -> HubResult<()>;

    /// Close the connection from the server side.
    async fn disconnect(&self);
}
