//! Shared Module
//!
//! Domain types and data structures used by the HTTP layer, the services and
//! the stores. Nothing here touches the network or the database, so it
//! compiles without the `ssr` feature.
//!
//! # Overview
//!
//! - Permissions and users, with their write commands and wire DTOs
//! - Audit fields and optimistic versions
//! - Paging and sorting parameters
//! - Chat messages and application events for the realtime side channel
//! - Configuration

/// Chat message data structure
pub mod message;

/// Application event envelope
pub mod event;

/// Shared error types
pub mod error;

/// Audit fields and the auditor identity
pub mod audit;

/// Paging and sorting
pub mod page;

/// Permission domain types
pub mod permission;

/// User domain types
pub mod user;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use audit::{AuditFields, Auditor};
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
pub use error::SharedError;
pub use event::AppEvent;
pub use message::Message;
pub use page::{PageQuery, PageRequest};
pub use permission::{Permission, PermissionDto, PermissionModifyCommand};
pub use user::{ResolvedUser, User, UserDto, UserModifyCommand};
