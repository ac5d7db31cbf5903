//! Recording session used by the hub tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{HubError, HubResult};
use crate::event::Frame;
use crate::session::{DeviceIdentity, Session, SessionId};

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum Behavior {
    Ok,
    Fail,
    /// Fail the first `n` sends, then record normally.
    FailFirst(usize),
    Hang,
}

pub(crate) struct RecordingSession {
    id: SessionId,
    behavior: Behavior,
    frames: Mutex<Vec<Frame>>,
    attempts: Mutex<usize>,
    disconnected: AtomicBool,
}

impl RecordingSession {
    pub(crate) fn new() -> Arc<Self> {
        Self::with_behavior(Behavior::Ok)
    }

    pub(crate) fn with_behavior(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            id: SessionId::new(),
            behavior,
            frames: Mutex::new(Vec::new()),
            attempts: Mutex::new(0),
            disconnected: AtomicBool::new(false),
        })
    }

    pub(crate) fn frames(&self) -> Vec<Frame> {
        self.frames.lock().unwrap().clone()
    }

    pub(crate) fn events(&self) -> Vec<&'static str> {
        self.frames().iter().map(|f| f.event).collect()
    }

    pub(crate) fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }

    pub(crate) fn is_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Session for RecordingSession {
    fn id(&self) -> SessionId {
        self.id
    }

    async fn send(&self, frame: &Frame) -> HubResult<()> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            *attempts += 1;
            *attempts
        };
        match self.behavior {
            Behavior::FailFirst(n) if attempt <= n => Err(HubError::SessionClosed(self.id)),
            Behavior::Ok | Behavior::FailFirst(_) => {
                self.frames.lock().unwrap().push(frame.clone());
                Ok(())
            }
            Behavior::Fail => Err(HubError::SessionClosed(self.id)),
            Behavior::Hang => std::future::pending().await,
        }
    }

    async fn disconnect(&self) {
        self.disconnected.store(true, Ordering::SeqCst);
    }
}

pub(crate) fn device(last_octet: u8) -> DeviceIdentity {
    DeviceIdentity::new(std::net::IpAddr::from([192, 168, 1, last_octet])).unwrap()
}
