//! Events pushed to the displays and their wire frames.
//!
//! Event names are part of the display protocol and must not change.

use brunos_core::Order;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::HubResult;

pub const INIT_EVENT: &str = "init";
pub const ORDER_EVENT: &str = "order";
pub const DELETE_EVENT: &str = "delete";
pub const RESET_EVENT: &str = "reset";
pub const MENU_UPDATED_EVENT: &str = "menu-updated";
pub const POST_EVENT: &str = "post";

/// Something a display needs to hear about.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderEvent {
    /// Sent to a newly seen device right before its order dump.
    Init,
    OrderAdded(Order),
    OrderRemoved(Order),
    Reset,
    MenuUpdated,
    /// Free-form message relayed from one display to the others.
    Post(Value),
}

impl OrderEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Init => INIT_EVENT,
            Self::OrderAdded(_) => ORDER_EVENT,
            Self::OrderRemoved(_) => DELETE_EVENT,
            Self::Reset => RESET_EVENT,
            Self::MenuUpdated => MENU_UPDATED_EVENT,
            Self::Post(_) => POST_EVENT,
        }
    }

    /// Encode into the frame sent over the transport.
    pub fn frame(&self) -> HubResult<Frame> {
        let data = match self {
            Self::OrderAdded(order) | Self::OrderRemoved(order) => serde_json::to_value(order)?,
            Self::Post(payload) => payload.clone(),
            Self::Init | Self::Reset | Self::MenuUpdated => Value::Null,
        };
        Ok(Frame {
            event: self.name(),
            data,
        })
    }
}

/// Outbound wire frame: `{"event": "...", "data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub event: &'static str,
    pub data: Value,
}

impl Frame {
    pub fn to_text(&self) -> HubResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Frame received from a display.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundFrame {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}
