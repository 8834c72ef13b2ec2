//! Middleware Module
//!
//! HTTP middleware applied before handlers run.
//!
//! - **`auth`** - bearer token and admin role checks, plus the `AuthUser` and
//!   `Auditor` extractors that read what the check attached
//!
//! # Example
//!
//! ```rust,no_run
//! use axum::middleware::from_fn_with_state;
//! use userhub::backend::middleware::require_admin;
//!
//! // router.route_layer(from_fn_with_state(state.clone(), require_admin))
//! ```

pub mod auth;

pub use auth::{require_admin, require_admin_ws, AuthUser, AuthenticatedUser};
