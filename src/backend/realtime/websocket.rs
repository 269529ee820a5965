//! WebSocket live-update transport (GET /ws)

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;

use crate::backend::error::ValidUpgrade;
use crate::backend::realtime::hub::{BroadcastHub, SubscriberId};
use crate::shared::event::LiveMessage;

/// WebSocket upgrade handler
pub async fn handle_live_socket(
    ValidUpgrade(ws): ValidUpgrade,
    State(hub): State<BroadcastHub>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| run_session(socket, hub))
}

/// Drive one connection until either side goes away.
///
/// The writer owns the subscription and drains it onto the socket; the
/// reader echoes client text back through the hub into the same queue, so
/// echoes keep their place among broadcasts.
async fn run_session(socket: WebSocket, hub: BroadcastHub) {
    let mut subscription = hub.register();
    let id = subscription.id();
    tracing::info!("[WebSocket] Client {} connected", id);

    let (mut sender, mut receiver) = socket.split();

    let mut writer = tokio::spawn(async move {
        while let Some(message) = subscription.recv().await {
            let text = match serde_json::to_string(&message) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!("[WebSocket] Failed to serialize {}: {:?}", message.type_name(), e);
                    continue;
                }
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                subscription.mark_closing();
                break;
            }
        }
        let _ = sender.close().await;
    });

    let echo_hub = hub.clone();
    let mut reader = tokio::spawn(async move {
        while let Some(frame) = receiver.next().await {
            match frame {
                Ok(Message::Text(text)) => echo(&echo_hub, id, text.as_str()),
                Ok(Message::Close(_)) => break,
                Ok(_) => continue,
                Err(e) => {
                    tracing::debug!("[WebSocket] Read error: {:?}", e);
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut writer => reader.abort(),
        _ = &mut reader => writer.abort(),
    }

    hub.unregister(id);
    tracing::info!("[WebSocket] Client {} disconnected", id);
}

fn echo(hub: &BroadcastHub, id: SubscriberId, text: &str) {
    let payload = serde_json::from_str::<Value>(text).unwrap_or_else(|_| Value::String(text.to_string()));
    if !hub.send_to(id, LiveMessage::Echo(payload)) {
        tracing::debug!("[WebSocket] Echo dropped for {}", id);
    }
}
