/**
 * Authentication Middleware
 *
 * Protects the management API and the chat socket. The bearer token is read
 * from the `Authorization` header; the chat socket also accepts it as the
 * `access_token` query parameter because browsers cannot set headers on a
 * WebSocket handshake.
 *
 * - no token, bad signature, expired token: 401
 * - valid token without the admin realm role: 403
 *
 * On success an `AuthenticatedUser` is attached to the request extensions.
 */

use std::collections::HashMap;
use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Query, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::shared::audit::Auditor;

/// Query parameter accepted on the WebSocket handshake
pub const ACCESS_TOKEN_PARAM: &str = "access_token";

/// Authenticated caller extracted from the JWT
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub subject: String,
    pub username: Option<String>,
    pub roles: Vec<String>,
}

/// Admin check for REST routes (header only)
pub async fn require_admin(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let token = bearer_from_header(request.headers())?;
    let user = authorize(&app_state, &token)?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Admin check for the chat socket (header or `access_token` query)
pub async fn require_admin_ws(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let token = match bearer_from_header(request.headers()) {
        Ok(token) => token,
        Err(_) => token_from_query(request.uri())
            .ok_or_else(|| BackendError::unauthorized("Missing bearer token"))?,
    };
    let user = authorize(&app_state, &token)?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn bearer_from_header(headers: &axum::http::HeaderMap) -> Result<String, BackendError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            tracing::debug!("Missing Authorization header");
            BackendError::unauthorized("Missing bearer token")
        })?;

    auth_header
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            tracing::warn!("Invalid Authorization header format");
            BackendError::unauthorized("Invalid Authorization header")
        })
}

fn token_from_query(uri: &axum::http::Uri) -> Option<String> {
    let Query(params) = Query::<HashMap<String, String>>::try_from_uri(uri).ok()?;
    params
        .get(ACCESS_TOKEN_PARAM)
        .filter(|token| !token.is_empty())
        .cloned()
}

fn authorize(app_state: &AppState, token: &str) -> Result<AuthenticatedUser, BackendError> {
    let claims = app_state.verifier.verify(token).map_err(|e| {
        tracing::warn!("Invalid token: {}", e);
        BackendError::unauthorized("Invalid or expired token")
    })?;

    let admin_role = &app_state.config.jwt.admin_role;
    if !claims.has_role(admin_role) {
        tracing::warn!("Subject {} lacks role {}", claims.sub, admin_role);
        return Err(BackendError::forbidden(format!("Role {} required", admin_role)));
    }

    Ok(AuthenticatedUser {
        subject: claims.sub,
        username: claims.preferred_username,
        roles: claims.realm_access.roles,
    })
}

/// Axum extractor for authenticated user
///
/// Fails with 401 when the route is not behind one of the auth middlewares.
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| {
                tracing::warn!("AuthenticatedUser not found in request extensions");
                BackendError::unauthorized("Not authenticated")
            })
    }
}

/// The caller's subject, or `anonymous` when nobody is authenticated
impl<S: Send + Sync> FromRequestParts<S> for Auditor {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<AuthenticatedUser>()
            .map(|user| Auditor::new(user.subject.clone()))
            .unwrap_or_default())
    }
}
