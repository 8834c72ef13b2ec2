/**
 * User Update Subscription Handler (GET /update/user)
 *
 * Streams Server-Sent Events to the client:
 *
 * - `heartbeat` every few seconds, data `{"from":"SYSTEM","to":"ALL","content":"ping"}`
 * - `update` for every message broadcast through `UserUpdateEmitter`
 *
 * A lagging subscriber skips what it missed and carries on. Proxies are told
 * not to cache or buffer the stream.
 */

use std::convert::Infallible;

use axum::{
    extract::State,
    http::{header, HeaderName},
    response::{
        sse::{Event, Sse},
        IntoResponse,
    },
};
use futures_util::stream::{self, Stream};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use crate::backend::realtime::broadcast::UserUpdateEmitter;
use crate::shared::message::{ALL, PING};
use crate::shared::Message;

pub const HEARTBEAT_EVENT: &str = "heartbeat";
pub const UPDATE_EVENT: &str = "update";

/// Logs the disconnect when the stream is dropped
struct SubscriberGuard;

impl Drop for SubscriberGuard {
    fn drop(&mut self) {
        tracing::info!("[Realtime] SSE client disconnected");
    }
}

struct StreamState {
    rx: broadcast::Receiver<Message>,
    heartbeat: Interval,
    _guard: SubscriberGuard,
}

fn sse_event(name: &str, message: &Message) -> Option<Event> {
    match serde_json::to_string(message) {
        Ok(data) => Some(Event::default().event(name).data(data)),
        Err(e) => {
            tracing::error!("[Realtime] Failed to serialize message: {:?}", e);
            None
        }
    }
}

/// Merged heartbeat and update stream for one subscriber
pub fn user_update_stream(
    emitter: &UserUpdateEmitter,
) -> impl Stream<Item = Result<Event, Infallible>> + Send + 'static {
    let period = emitter.heartbeat();
    let mut heartbeat = interval_at(Instant::now() + period, period);
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!("[Realtime] New SSE client subscribed");
    let state = StreamState {
        rx: emitter.subscribe(),
        heartbeat,
        _guard: SubscriberGuard,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            tokio::select! {
                _ = state.heartbeat.tick() => {
                    let ping = Message::system(ALL, PING);
                    if let Some(event) = sse_event(HEARTBEAT_EVENT, &ping) {
                        return Some((Ok(event), state));
                    }
                }
                received = state.rx.recv() => match received {
                    Ok(message) => {
                        if let Some(event) = sse_event(UPDATE_EVENT, &message) {
                            return Some((Ok(event), state));
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("[Realtime] Receiver lagged, skipped {} events", skipped);
                        continue;
                    }
                    Err(RecvError::Closed) => {
                        tracing::warn!("[Realtime] Broadcast channel closed, ending stream");
                        return None;
                    }
                },
            }
        }
    })
}

/// Handle user update subscription (GET /update/user)
pub async fn handle_user_updates(State(emitter): State<UserUpdateEmitter>) -> impl IntoResponse {
    (
        [
            (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
            (HeaderName::from_static("x-accel-buffering"), "no"),
        ],
        Sse::new(user_update_stream(&emitter)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_then_update() {
        let emitter = UserUpdateEmitter::new(Duration::from_secs(10));
        let stream = user_update_stream(&emitter);
        tokio::pin!(stream);

        // first item is the heartbeat once the clock reaches 10s
        assert!(stream.next().await.is_some());

        emitter.broadcast(&Message::system(ALL, "USER_CREATED: 9"));
        assert!(stream.next().await.is_some());
        assert_eq!(emitter.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn test_dropping_stream_unsubscribes() {
        let emitter = UserUpdateEmitter::new(Duration::from_secs(10));
        let stream = user_update_stream(&emitter);
        assert_eq!(emitter.subscriber_count(), 1);
        drop(stream);
        assert_eq!(emitter.subscriber_count(), 0);
        assert!(!emitter.broadcast(&Message::system(ALL, "gone")));
    }
}
