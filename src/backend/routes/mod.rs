//! Route Configuration Module
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Main router creation
//! ├── chat_routes.rs  - /ws and /update/user
//! ├── api_routes.rs   - Permission and user management API
//! └── file_routes.rs  - /minio file storage
//! ```
//!
//! # Security
//!
//! - `/coroutine/**`, `/reactive/**`: admin bearer token in the header
//! - `/minio/**`: admin bearer token in the header
//! - `/ws`: admin bearer token in the header or `access_token` query
//! - `/update/user`, `/health`: public

/// Main router creation
pub mod router;

/// Realtime routes
pub mod chat_routes;

/// Management API routes
pub mod api_routes;

/// File storage routes
pub mod file_routes;

#[cfg(feature = "ssr")]
pub use router::create_router;
