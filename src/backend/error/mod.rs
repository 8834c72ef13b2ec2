//! Backend Error Module
//!
//! This module defines error types specific to the backend server.
//! These errors are used in HTTP handlers and can be converted to HTTP responses.
//!
//! # Architecture
//!
//! - **`types`** - `BackendError`, its status codes and error codes
//! - **`conversion`** - `IntoResponse` and extractor rejection conversions
//! - **`extract`** - `ApiJson` / `ApiQuery` / `ApiPath`, extractors that reject with `BackendError`
//!
//! # HTTP Response Conversion
//!
//! All backend errors implement `IntoResponse` from Axum, allowing them to be
//! returned directly from handlers. The error is converted to its HTTP status
//! and a JSON body carrying `timestamp`, `status`, `error`, `message` and
//! `errorCode`.

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

/// Extractors with JSON error bodies
pub mod extract;

// Re-export commonly used types
pub use extract::{ApiJson, ApiPath, ApiQuery};
pub use types::BackendError;
