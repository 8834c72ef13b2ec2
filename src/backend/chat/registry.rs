/**
 * Chat Session Registry
 *
 * Tracks every open chat socket by session id. Each session owns an
 * unbounded outbound queue; the socket's pump task drains it. Dropping the
 * queue's sender (unregister, stale sweep) ends the pump and with it the
 * connection.
 *
 * # Liveness
 *
 * Every session records when it was last heard from. Clients answer the
 * server's `ping` with `{to: "SYSTEM", content: "pong"}`, which refreshes that
 * time. With stale checking enabled, one sweeper task per registry runs every
 * heartbeat interval and evicts sessions silent for longer than the stale
 * threshold. The sweeper starts on the first registration made inside a tokio
 * runtime and stops once the registry is dropped.
 *
 * # Locking
 *
 * A single `std::sync::Mutex` guards the session map. It is never held
 * across an `.await`.
 */

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::shared::config::ChatSettings;
use crate::shared::Message;

struct Session {
    tx: UnboundedSender<Message>,
    last_seen: Instant,
}

struct Inner {
    sessions: Mutex<HashMap<String, Session>>,
    settings: ChatSettings,
    /// Set only once a sweeper task is actually running
    sweeper_started: AtomicBool,
}

impl Inner {
    fn sessions(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        // a panic while holding the lock cannot leave the map half-updated
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Registry of open chat sessions
#[derive(Clone)]
pub struct SessionRegistry {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("sessions", &self.session_count())
            .field("settings", &self.inner.settings)
            .finish()
    }
}

impl SessionRegistry {
    pub fn new(settings: ChatSettings) -> Self {
        Self {
            inner: Arc::new(Inner {
                sessions: Mutex::new(HashMap::new()),
                settings,
                sweeper_started: AtomicBool::new(false),
            }),
        }
    }

    pub fn heartbeat_interval(&self) -> Duration {
        self.inner.settings.heartbeat_interval
    }

    /// Create the outbound queue for `session_id`
    ///
    /// Returns `None`, leaving the existing queue in place, if the id is
    /// already registered.
    pub fn register_session(&self, session_id: &str) -> Option<UnboundedReceiver<Message>> {
        let rx = {
            let mut sessions = self.inner.sessions();
            if sessions.contains_key(session_id) {
                tracing::warn!("ws: [chat] attempting to register existing session: {}", session_id);
                return None;
            }
            let (tx, rx) = mpsc::unbounded_channel();
            sessions.insert(
                session_id.to_string(),
                Session {
                    tx,
                    last_seen: Instant::now(),
                },
            );
            rx
        };

        tracing::info!("ws: [chat] new session: {}", session_id);
        if self.inner.settings.stale_check {
            self.ensure_sweeper();
        }
        Some(rx)
    }

    /// Drop the session's queue, closing its outbound stream
    pub fn unregister_session(&self, session_id: &str) -> bool {
        let removed = self.inner.sessions().remove(session_id).is_some();
        if removed {
            tracing::info!("ws: [chat] session removed: {}", session_id);
        }
        removed
    }

    /// Enqueue `message` for one session
    pub fn send(&self, message: Message, session_id: &str) -> bool {
        let sessions = self.inner.sessions();
        match sessions.get(session_id) {
            Some(session) => session.tx.send(message).is_ok(),
            None => {
                tracing::warn!("ws: [chat] attempting to send to non-existent session: {}", session_id);
                false
            }
        }
    }

    /// Enqueue `message` for every session, returning how many accepted it
    pub fn broadcast(&self, message: Message) -> usize {
        let sessions = self.inner.sessions();
        sessions
            .values()
            .filter(|session| session.tx.send(message.clone()).is_ok())
            .count()
    }

    /// `ALL` goes to everyone, anything else to the addressed session
    pub fn route(&self, message: Message) -> usize {
        if message.is_broadcast() {
            self.broadcast(message)
        } else {
            let to = message.to.clone();
            usize::from(self.send(message, &to))
        }
    }

    pub fn update_last_pong(&self, session_id: &str) {
        if let Some(session) = self.inner.sessions().get_mut(session_id) {
            session.last_seen = Instant::now();
            tracing::debug!("ws: [chat] received pong from session: {}", session_id);
        }
    }

    /// Unregister sessions silent for longer than `threshold`
    pub fn sweep_stale(&self, threshold: Duration) -> Vec<String> {
        let now = Instant::now();
        let mut sessions = self.inner.sessions();
        let stale: Vec<String> = sessions
            .iter()
            .filter(|(_, session)| now.duration_since(session.last_seen) > threshold)
            .map(|(id, _)| id.clone())
            .collect();

        for id in &stale {
            sessions.remove(id);
            tracing::info!("ws: [chat] removing stale session: {}", id);
        }
        stale
    }

    pub fn session_count(&self) -> usize {
        self.inner.sessions().len()
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.inner.sessions().contains_key(session_id)
    }

    fn ensure_sweeper(&self) {
        let claimed = self
            .inner
            .sweeper_started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if claimed && !self.spawn_sweeper() {
            // let a later registration inside a runtime try again
            self.inner.sweeper_started.store(false, Ordering::Release);
        }
    }

    fn spawn_sweeper(&self) -> bool {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("ws: [chat] no runtime available, stale check deferred");
            return false;
        };

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let period = self.inner.settings.heartbeat_interval;
        let threshold = self.inner.settings.stale_threshold;

        handle.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                let evicted = SessionRegistry { inner }.sweep_stale(threshold);
                if !evicted.is_empty() {
                    tracing::info!("ws: [chat] stale check evicted {} session(s)", evicted.len());
                }
            }
            tracing::debug!("ws: [chat] stale check stopped");
        });
        tracing::info!(
            "ws: [chat] stale check started (every {:?}, threshold {:?})",
            period,
            threshold
        );
        true
    }
}
