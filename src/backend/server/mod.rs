//! Server Module
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState and FromRef implementations
//! ├── config.rs       - Store selection (Postgres or memory)
//! └── init.rs         - State assembly and app creation
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Store**: connect Postgres and migrate, or use memory
//! 2. **State**: verifier, chat registry, SSE emitter, services
//! 3. **Background Tasks**: periodic connection stats
//! 4. **Router**: routes, auth layers, tracing and CORS

/// Application state management
pub mod state;

/// Store selection
pub mod config;

/// Server initialization
pub mod init;

#[cfg(feature = "ssr")]
pub use init::{build_state, create_app};
#[cfg(feature = "ssr")]
pub use state::AppState;
