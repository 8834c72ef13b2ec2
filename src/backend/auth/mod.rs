//! Authentication Module
//!
//! Bearer token validation for the protected routes. Tokens are minted by an
//! external identity provider; this service only verifies them and reads the
//! subject and realm roles.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs     - Module exports and documentation
//! └── tokens.rs  - Claims, JwtVerifier, create_token
//! ```
//!
//! Request-level enforcement (401/403) lives in `backend::middleware::auth`.

/// JWT claims and verification
pub mod tokens;

pub use tokens::{create_token, Claims, JwtVerifier, RealmAccess};
