//! Token helpers
//!
//! Every test app verifies HS256 tokens signed with `TEST_SECRET`.

use userhub::backend::auth::{create_token, Claims};

pub const TEST_SECRET: &str = "integration-test-secret";
pub const ADMIN_ROLE: &str = "ROLE_ADMIN";
pub const ADMIN_SUBJECT: &str = "admin-1";

/// Token for `subject` carrying `roles`, valid for an hour
pub fn token_for(subject: &str, roles: &[&str]) -> String {
    create_token(TEST_SECRET, &Claims::new(subject, roles, 3600)).unwrap()
}

pub fn admin_token() -> String {
    token_for(ADMIN_SUBJECT, &[ADMIN_ROLE])
}

/// A correctly signed token that expired long ago
pub fn expired_admin_token() -> String {
    let mut claims = Claims::new(ADMIN_SUBJECT, &[ADMIN_ROLE], 0);
    claims.exp = 1_000;
    create_token(TEST_SECRET, &claims).unwrap()
}
