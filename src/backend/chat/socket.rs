/**
 * Chat WebSocket Handler (GET /ws)
 *
 * Connection lifecycle:
 * 1. register a fresh session id with the registry
 * 2. queue `HANDSHAKE`, then the caller's JWT subject
 * 3. run three tasks: outbound pump, inbound reader, heartbeat
 * 4. when any task ends, abort the others and unregister
 *
 * Frames are JSON `{from, to, content}` text messages. Unparsable frames are
 * logged and dropped; the connection stays open.
 */

use std::time::Duration;

use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use uuid::Uuid;

use crate::backend::chat::registry::SessionRegistry;
use crate::backend::middleware::AuthUser;
use crate::shared::message::HANDSHAKE;
use crate::shared::Message;

pub async fn handle_chat_socket(
    ws: WebSocketUpgrade,
    State(registry): State<SessionRegistry>,
    AuthUser(user): AuthUser,
) -> Response {
    ws.on_upgrade(move |socket| run_session(socket, registry, user.subject))
}

async fn run_session(socket: WebSocket, registry: SessionRegistry, subject: String) {
    let session_id = Uuid::new_v4().to_string();
    let Some(mut outbound) = registry.register_session(&session_id) else {
        return;
    };

    registry.send(Message::system(&session_id, HANDSHAKE), &session_id);
    registry.send(Message::system(&session_id, subject), &session_id);

    let (mut sender, mut receiver) = socket.split();

    let mut pump = tokio::spawn(async move {
        while let Some(message) = outbound.recv().await {
            match serde_json::to_string(&message) {
                Ok(json) => {
                    tracing::debug!("ws: [chat] tx: {}", json);
                    if sender.send(WsMessage::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => tracing::warn!("ws: [chat] failed to serialize message: {}", e),
            }
        }
        let _ = sender.close().await;
    });

    let mut reader = tokio::spawn({
        let registry = registry.clone();
        let session_id = session_id.clone();
        async move {
            while let Some(frame) = receiver.next().await {
                match frame {
                    Ok(WsMessage::Text(text)) => handle_inbound(&registry, &session_id, text.as_str()),
                    Ok(WsMessage::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!("ws: [chat] error in session {}: {}", session_id, e);
                        break;
                    }
                }
            }
        }
    });

    let mut heartbeat = tokio::spawn(heartbeat(
        registry.clone(),
        session_id.clone(),
        registry.heartbeat_interval(),
    ));

    tokio::select! {
        _ = &mut pump => {}
        _ = &mut reader => {}
        _ = &mut heartbeat => {}
    }

    pump.abort();
    reader.abort();
    heartbeat.abort();

    tracing::info!("ws: [chat] disconnect chat session: {}", session_id);
    registry.unregister_session(&session_id);
}

/// Apply one inbound text frame
pub fn handle_inbound(registry: &SessionRegistry, session_id: &str, text: &str) {
    match Message::parse(text) {
        Ok(message) if message.is_pong() => registry.update_last_pong(session_id),
        Ok(message) => {
            tracing::info!("ws: [chat] rx: {:?}", message);
            registry.route(message);
        }
        Err(e) => tracing::error!("ws: [chat] failed to parse message: {} ({})", text, e),
    }
}

/// Queue a `ping` for the session every `period` until it is gone
async fn heartbeat(registry: SessionRegistry, session_id: String, period: Duration) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        tracing::debug!("ws: [chat] sending heartbeat to session: {}", session_id);
        if !registry.send(Message::ping(&session_id), &session_id) {
            break;
        }
    }
}
