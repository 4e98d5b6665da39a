//! WebSocket support for real-time queue updates.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};
use tubestream_core::{QueueEvent, QueueItem};
use tubestream_core::queue::QueueUpdateCallback;

use crate::metrics::{WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_LAG_EVENTS, WS_MESSAGES_SENT};
use crate::state::AppState;

/// Interval between heartbeats on an idle connection.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// WebSocket message sent to clients for real-time updates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// An item was added or changed. Carries the full record.
    ItemUpdate { item: QueueItem },
    /// An item was removed.
    ItemRemoved { id: String },
    /// The queue was emptied.
    QueueCleared,
    /// A batch started or finished.
    BatchStatus { running: bool },
    /// Server heartbeat (sent periodically to keep connection alive).
    Heartbeat { timestamp: i64 },
}

impl WsMessage {
    fn type_label(&self) -> &'static str {
        match self {
            WsMessage::ItemUpdate { .. } => "item_update",
            WsMessage::ItemRemoved { .. } => "item_removed",
            WsMessage::QueueCleared => "queue_cleared",
            WsMessage::BatchStatus { .. } => "batch_status",
            WsMessage::Heartbeat { .. } => "heartbeat",
        }
    }
}

impl From<&QueueEvent> for WsMessage {
    fn from(event: &QueueEvent) -> Self {
        match event {
            QueueEvent::ItemUpdated(item) => WsMessage::ItemUpdate { item: item.clone() },
            QueueEvent::ItemRemoved { id } => WsMessage::ItemRemoved { id: id.clone() },
            QueueEvent::Cleared => WsMessage::QueueCleared,
            QueueEvent::BatchActive(running) => WsMessage::BatchStatus { running: *running },
        }
    }
}

/// Broadcaster for WebSocket messages using tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct WsBroadcaster {
    sender: broadcast::Sender<WsMessage>,
}

impl WsBroadcaster {
    /// Create a new broadcaster with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Broadcast a message to all connected clients.
    pub fn broadcast(&self, msg: WsMessage) {
        // No receivers just means no client is connected
        let _ = self.sender.send(msg);
    }

    /// Subscribe to receive messages.
    pub fn subscribe(&self) -> broadcast::Receiver<WsMessage> {
        self.sender.subscribe()
    }

    /// Queue callback forwarding every queue change to connected clients.
    pub fn queue_callback(&self) -> QueueUpdateCallback {
        let broadcaster = self.clone();
        Arc::new(move |event: &QueueEvent| broadcaster.broadcast(WsMessage::from(event)))
    }
}

impl Default for WsBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle a single WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let mut rx = state.ws_broadcaster().subscribe();

    WS_CONNECTIONS_TOTAL.inc();
    WS_CONNECTIONS_ACTIVE.inc();

    info!("WebSocket client connected");

    let send_task = tokio::spawn(async move {
        let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
        heartbeat.tick().await;

        loop {
            let msg = tokio::select! {
                result = rx.recv() => match result {
                    Ok(msg) => msg,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("WebSocket client lagged, skipped {} messages", n);
                        WS_LAG_EVENTS.inc();
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("Broadcast channel closed");
                        break;
                    }
                },
                _ = heartbeat.tick() => WsMessage::Heartbeat {
                    timestamp: chrono::Utc::now().timestamp(),
                },
            };

            WS_MESSAGES_SENT.with_label_values(&[msg.type_label()]).inc();

            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        debug!("WebSocket send failed, client disconnected");
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to serialize WsMessage: {}", e);
                }
            }
        }
    });

    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Close(_)) => {
                debug!("WebSocket client requested close");
                break;
            }
            Ok(Message::Text(text)) => {
                debug!("Ignoring client message: {}", text);
            }
            Ok(_) => {}
            Err(e) => {
                warn!("WebSocket receive error: {}", e);
                break;
            }
        }
    }

    send_task.abort();
    WS_CONNECTIONS_ACTIVE.dec();
    info!("WebSocket client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubestream_core::UploadQueue;

    #[test]
    fn test_message_serialization() {
        let json = serde_json::to_value(WsMessage::BatchStatus { running: true }).unwrap();
        assert_eq!(json["type"], "batch_status");
        assert_eq!(json["running"], true);

        let json = serde_json::to_value(WsMessage::QueueCleared).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "queue_cleared" }));
    }

    #[tokio::test]
    async fn test_queue_callback_forwards_events() {
        let broadcaster = WsBroadcaster::default();
        let mut rx = broadcaster.subscribe();
        let queue = UploadQueue::default().with_update_callback(broadcaster.queue_callback());

        let item = queue.enqueue("https://x.test/a.mp4").remove(0);
        queue.remove(&item.id).unwrap();

        match rx.recv().await.unwrap() {
            WsMessage::ItemUpdate { item: sent } => assert_eq!(sent, item),
            other => panic!("unexpected message: {:?}", other),
        }
        match rx.recv().await.unwrap() {
            WsMessage::ItemRemoved { id } => assert_eq!(id, item.id),
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_broadcast_without_subscribers() {
        WsBroadcaster::new(4).broadcast(WsMessage::QueueCleared);
    }
}
