/**
 * User Update Broadcasting
 *
 * `UserUpdateEmitter` is the multicast side of the `/update/user` SSE stream.
 * It wraps a `tokio::sync::broadcast` channel with a small buffer: a
 * subscriber that falls behind loses the oldest events instead of blocking
 * writers.
 */

use std::time::Duration;

use tokio::sync::broadcast;

use crate::shared::Message;

/// Buffer of the multicast channel
pub const SMALL_BUFFER_SIZE: usize = 256;

/// Multicast of user-change messages to SSE subscribers
#[derive(Clone, Debug)]
pub struct UserUpdateEmitter {
    tx: broadcast::Sender<Message>,
    heartbeat: Duration,
}

impl UserUpdateEmitter {
    pub fn new(heartbeat: Duration) -> Self {
        let (tx, _) = broadcast::channel(SMALL_BUFFER_SIZE);
        Self { tx, heartbeat }
    }

    /// Interval of `heartbeat` events on each subscription
    pub fn heartbeat(&self) -> Duration {
        self.heartbeat
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Message> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Broadcast a message to all subscribers
    ///
    /// Returns `false` when nobody is listening.
    pub fn broadcast(&self, message: &Message) -> bool {
        match self.tx.send(message.clone()) {
            Ok(subscriber_count) => {
                tracing::debug!(
                    "[Realtime] Message broadcast to {} subscribers: {}",
                    subscriber_count,
                    message.content
                );
                true
            }
            Err(_) => {
                tracing::debug!("[Realtime] No subscribers to receive message");
                false
            }
        }
    }
}
