//! Bruno's Display Hub
//!
//! Keeps every connected kitchen display in sync with the order store:
//! tracks live sessions per device, fans order events out to them and
//! replays the full order list to devices it has not seen before.

pub mod dispatcher;
pub mod error;
pub mod event;
pub mod hub;
pub mod lifecycle;
pub mod registry;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use dispatcher::{BroadcastReport, Dispatcher};
pub use error::{HubError, HubResult};
pub use event::{Frame, InboundFrame, OrderEvent};
pub use hub::OrderSyncHub;
pub use lifecycle::{ConnectOutcome, LifecycleHandler};
pub use registry::{ClientRegistry, Registration};
pub use session::{DeviceIdentity, Session, SessionId};
