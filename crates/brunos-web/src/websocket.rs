//! WebSocket transport for the kitchen displays.
//!
//! Each socket becomes a hub [`Session`]: frames are queued on a bounded
//! channel and written by a dedicated task, so a slow socket only ever
//! blocks its own queue.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        ConnectInfo, State,
    },
    http::HeaderMap,
    response::IntoResponse,
};
use brunos_hub::event::POST_EVENT;
use brunos_hub::{
    ConnectOutcome, DeviceIdentity, Frame, HubError, HubResult, InboundFrame, OrderSyncHub,
    Session, SessionId,
};
use futures::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::state::AppState;

#[derive(Debug)]
pub(crate) enum Outbound {
    Text(String),
    Close,
}

/// Hub-side handle of one WebSocket connection.
pub struct WsSession {
    id: SessionId,
    tx: mpsc::Sender<Outbound>,
}

impl WsSession {
    pub(crate) fn new(tx: mpsc::Sender<Outbound>) -> Self {
        Self {
            id: SessionId::new(),
            tx,
        }
    }
}

#[async_trait]
impl Session for WsSession {
    fn id(&self) -> SessionId {
        self.id
    }

    async fn send(&self, frame: &Frame) -> HubResult<()> {
        let text = frame.to_text()?;
        self.tx
            .send(Outbound::Text(text))
            .await
            .map_err(|_| HubError::SessionClosed(self.id))
    }

    async fn disconnect(&self) {
        if self.tx.try_send(Outbound::Close).is_err() {
            debug!(session_id = %self.id, "Close not queued, writer already gone or full");
        }
    }
}

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let identity = client_identity(peer, &headers, state.trust_forwarded_for);
    debug!(peer = %peer, ?identity, "WebSocket connection request");

    ws.on_upgrade(move |socket| handle_socket(socket, state, identity))
}

/// Device identity of a connecting client. The socket peer decides unless
/// the server is configured to trust a forwarding proxy.
pub(crate) fn client_identity(
    peer: SocketAddr,
    headers: &HeaderMap,
    trust_forwarded_for: bool,
) -> Option<DeviceIdentity> {
    let forwarded_for = if trust_forwarded_for {
        headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
    } else {
        None
    };
    DeviceIdentity::resolve(Some(peer), forwarded_for)
}

/// Handle individual WebSocket connection.
async fn handle_socket(socket: WebSocket, state: AppState, identity: Option<DeviceIdentity>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel(state.session_buffer);
    let session = Arc::new(WsSession::new(tx));
    let session_id = session.id();

    // Forward queued frames to this client
    let mut send_task = tokio::spawn(async move {
        while let Some(outbound) = rx.recv().await {
            match outbound {
                Outbound::Text(text) => {
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        debug!("WebSocket send failed, client disconnected");
                        break;
                    }
                }
                Outbound::Close => {
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    });

    let hub = state.hub.clone();
    let outcome = hub.lifecycle().on_session_opened(identity, session).await;
    let identity = match (identity, outcome) {
        (Some(identity), ConnectOutcome::NewDevice { .. } | ConnectOutcome::AdditionalSession) => {
            identity
        }
        _ => {
            let _ = send_task.await;
            return;
        }
    };

    // Handle incoming messages from client
    let recv_hub = hub.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => handle_inbound(&recv_hub, session_id, text.as_str()).await,
                Message::Close(_) => {
                    debug!("WebSocket client sent close frame");
                    break;
                }
                _ => {}
            }
        }
    });

    // Wait for either task to complete
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    hub.lifecycle().on_session_closed(&identity, session_id).await;
    info!(device = %identity, session_id = %session_id, "WebSocket client disconnected");
}

async fn handle_inbound(hub: &OrderSyncHub, session_id: SessionId, text: &str) {
    match serde_json::from_str::<InboundFrame>(text) {
        Ok(frame) if frame.event == POST_EVENT => {
            hub.relay_post(session_id, frame.data).await;
        }
        Ok(frame) => {
            debug!(session_id = %session_id, event = %frame.event, "Ignoring client event");
        }
        Err(e) => {
            warn!(session_id = %session_id, error = %e, "Unreadable client frame");
        }
    }
}
