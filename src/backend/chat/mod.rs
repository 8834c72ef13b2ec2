//! Chat Backend Module
//!
//! WebSocket chat between connected admin sessions, plus server-originated
//! broadcasts (application events) to all of them.
//!
//! # Architecture
//!
//! - **`registry`** - session map, per-session outbound queues, routing and
//!   the stale-session sweeper
//! - **`socket`** - the `/ws` upgrade handler and per-connection tasks
//!
//! Log lines from this module carry the `ws: [chat]` prefix.
//!
//! # Example
//!
//! ```rust,no_run
//! use userhub::backend::chat::SessionRegistry;
//! use userhub::shared::config::ChatSettings;
//! use userhub::shared::Message;
//!
//! # async fn example() {
//! let registry = SessionRegistry::new(ChatSettings::default());
//! let mut rx = registry.register_session("s1").unwrap();
//! registry.route(Message::new("s2", "ALL", "hello"));
//! let _ = rx.recv().await;
//! # }
//! ```

/// Session registry and message routing
pub mod registry;

/// WebSocket handler
pub mod socket;

pub use registry::SessionRegistry;
pub use socket::handle_chat_socket;
