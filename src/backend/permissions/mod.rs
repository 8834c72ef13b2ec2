//! Permission Management
//!
//! CRUD over permissions with optimistic versioning.
//!
//! - **`service`** - `PermissionService`, the business rules on top of a
//!   `PermissionRepository`
//! - **`handlers`** - `/permissions` HTTP handlers
//!
//! Deleting a permission does not touch users that reference it. Their
//! stale ids are skipped when users are read back.

/// Permission business rules
pub mod service;

/// HTTP handlers
pub mod handlers;

pub use service::PermissionService;
