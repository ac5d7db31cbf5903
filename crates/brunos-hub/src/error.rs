//! Hub error types.

use std::time::Duration;

use thiserror::Error;

use crate::session::SessionId;

#[derive(Error, Debug)]
pub enum HubError {
    #[error("Session {0} is closed")]
    SessionClosed(SessionId),

    #[error("Send to session {session} timed out after {after:?}")]
    Timeout { session: SessionId, after: Duration },

    /// A session showed up under two devices. Not recoverable by the caller.
    #[error("Registry invariant violated: {0}")]
    RegistryInvariant(String),

    #[error("Encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(#[from] brunos_core::OrderError),
}

/// Result type for hub operations.
pub type HubResult<T> = Result<T, HubError>;
