use async_trait::async_trait;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

use crate::api::ApiState;
use crate::error::{Error, Result};
use crate::hub::Subscriber;

/// Depth of the per-connection outbound queue. A client that falls this far
/// behind is treated as dead and pruned on the next push.
const OUTBOUND_QUEUE: usize = 32;

/// Bridges one WebSocket connection to the broadcast hub.
///
/// Push hands the payload to a bounded channel and never waits on socket
/// I/O, so a slow client cannot stall a broadcast pass; the forwarding task
/// does the actual writes.
struct WsSubscriber {
    tx: mpsc::Sender<String>,
}

#[async_trait]
impl Subscriber for WsSubscriber {
    async fn push(&self, payload: &str) -> Result<()> {
        self.tx.try_send(payload.to_string()).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => Error::SubscriberBusy,
            mpsc::error::TrySendError::Closed(_) => Error::SubscriberClosed,
        })
    }
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ApiState>>,
) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<ApiState>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<String>(OUTBOUND_QUEUE);

    // Registration pushes the current snapshot right away, so the client is
    // never stale while waiting for the next change.
    let id = state.hub.register(Arc::new(WsSubscriber { tx })).await;

    let mut send_task = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if sender.send(Message::Text(payload)).await.is_err() {
                break;
            }
        }
    });

    // Inbound liveness detection only; clients have nothing to say.
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    }

    state.hub.unregister(id).await;
    debug!(subscriber = id, "websocket connection closed");
}
