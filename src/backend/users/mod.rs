//! User Management
//!
//! - **`service`** - `UserService`: CRUD, permission resolution, and the
//!   `USER_CREATED` event
//! - **`handlers`** - `/users` and `/usersCount` HTTP handlers

/// User business rules
pub mod service;

/// HTTP handlers
pub mod handlers;

pub use service::UserService;
