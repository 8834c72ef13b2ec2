//! Backend Module
//!
//! All server-side code: an Axum HTTP server over the permission and user
//! services, plus the realtime chat and SSE channels.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - state assembly, store selection, app creation
//! - **`routes`** - route configuration and router assembly
//! - **`permissions`** / **`users`** - services and HTTP handlers
//! - **`store`** - repository traits, memory and Postgres implementations
//! - **`chat`** - WebSocket session registry and socket handler
//! - **`realtime`** - SSE emitter and application event fan-out
//! - **`files`** - file storage in an S3-compatible bucket
//! - **`kafka`** - Kafka record handling, and the broker transport behind
//!   the `kafka` feature
//! - **`auth`** - JWT claims, verification and signing
//! - **`middleware`** - admin checks and identity extractors
//! - **`error`** - `BackendError` and its JSON responses
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Server binary
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── permissions/    - Permission service and handlers
//! ├── users/          - User service and handlers
//! ├── store/          - Persistence
//! ├── chat/           - WebSocket chat
//! ├── realtime/       - SSE and event fan-out
//! ├── files/          - Object storage
//! ├── kafka/          - Event transport
//! ├── auth/           - JWT
//! ├── middleware/     - Request middleware
//! └── error/          - Error types
//! ```
//!
//! # State Management
//!
//! `AppState` holds the services, the chat registry, the SSE emitter, the
//! event publisher, the JWT verifier and the configuration. Handlers extract
//! the part they need through `FromRef`.

/// Server initialization and state
#[cfg(feature = "ssr")]
pub mod server;

/// Route configuration
#[cfg(feature = "ssr")]
pub mod routes;

/// Permission management
#[cfg(feature = "ssr")]
pub mod permissions;

/// User management
#[cfg(feature = "ssr")]
pub mod users;

/// Persistence
#[cfg(feature = "ssr")]
pub mod store;

/// WebSocket chat
#[cfg(feature = "ssr")]
pub mod chat;

/// Server-Sent Events and application events
#[cfg(feature = "ssr")]
pub mod realtime;

/// File storage
#[cfg(feature = "ssr")]
pub mod files;

/// Kafka event transport
#[cfg(feature = "ssr")]
pub mod kafka;

/// JWT handling
#[cfg(feature = "ssr")]
pub mod auth;

/// Request middleware
#[cfg(feature = "ssr")]
pub mod middleware;

/// Backend-specific error types
#[cfg(feature = "ssr")]
pub mod error;
