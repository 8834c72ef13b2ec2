//! userhub - Main Library
//!
//! A user and permission management service with a realtime side channel.
//!
//! # Overview
//!
//! - CRUD over permissions and users, with optimistic versioning and
//!   audit fields, behind an admin-only JWT check
//! - Paged and sorted listings, mounted under `/coroutine` and `/reactive`
//! - A WebSocket chat (`/ws`) between admin sessions, with heartbeats and a
//!   stale-session sweeper
//! - A Server-Sent Events stream (`/update/user`) announcing new users
//! - Postgres persistence via sqlx, or an in-memory store when no database
//!   is configured
//! - File upload and download (`/minio/**`) against an S3-compatible bucket
//! - Kafka: inbound events broadcast to local clients, Keycloak user events
//!   logged, published events forwarded to an outbound topic
//!
//! # Module Structure
//!
//! - **`shared`** - domain types, paging, messages, events and configuration
//! - **`backend`** - Axum server (only compiled with the `ssr` feature)
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - the Axum server, JWT verification and the binaries
//! - **`kafka`** - the rdkafka broker connection (needs librdkafka)
//!
//! # Usage
//!
//! ```rust,no_run
//! use userhub::backend::server::init::create_app;
//! use userhub::shared::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! let app = create_app(config).await?;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! - `shared::SharedError` for validation and serialization
//! - `shared::ConfigError` for configuration
//! - `backend::store::StoreError` for persistence
//! - `backend::error::BackendError` for HTTP responses

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
