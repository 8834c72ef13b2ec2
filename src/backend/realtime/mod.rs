//! Real-time Update Module
//!
//! Server-to-client notifications about user changes.
//!
//! # Architecture
//!
//! - **`broadcast`** - `UserUpdateEmitter`, the multicast channel behind the SSE stream
//! - **`subscription`** - `GET /update/user` Server-Sent Events handler
//! - **`events`** - `EventPublisher`, which fans application events out to
//!   chat sessions, SSE subscribers and outbound `EventSink`s
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs          - Module exports and documentation
//! ├── broadcast.rs    - UserUpdateEmitter
//! ├── subscription.rs - SSE subscription handler
//! └── events.rs       - EventPublisher
//! ```
//!
//! # SSE Event Types
//!
//! - `heartbeat` - periodic `ping` from `SYSTEM` so idle proxies keep the stream open
//! - `update` - a broadcast message, e.g. `USER_CREATED: <id>`

/// User update broadcasting
pub mod broadcast;

/// Server-Sent Events subscription handler
pub mod subscription;

/// Application event fan-out
pub mod events;

// Re-export commonly used types and functions
pub use broadcast::UserUpdateEmitter;
pub use events::{current_trace, EventPublisher, EventSink};
pub use subscription::handle_user_updates;
