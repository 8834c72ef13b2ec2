/**
 * Application State Management
 *
 * `AppState` is the single state type behind the router. The `FromRef`
 * implementations let handlers extract only what they need, e.g.
 * `State<UserService>` or `State<SessionRegistry>`, following Axum's
 * recommended pattern.
 *
 * Every field is cheap to clone: services hold `Arc`s to their
 * repositories, and the registry and emitter are handles to shared state.
 */

#[cfg(feature = "ssr")]
use axum::extract::FromRef;
#[cfg(feature = "ssr")]
use std::sync::Arc;

#[cfg(feature = "ssr")]
use crate::backend::auth::JwtVerifier;
#[cfg(feature = "ssr")]
use crate::backend::chat::SessionRegistry;
#[cfg(feature = "ssr")]
use crate::backend::files::FileStore;
#[cfg(feature = "ssr")]
use crate::backend::permissions::PermissionService;
#[cfg(feature = "ssr")]
use crate::backend::realtime::{EventPublisher, UserUpdateEmitter};
#[cfg(feature = "ssr")]
use crate::backend::users::UserService;
#[cfg(feature = "ssr")]
use crate::shared::AppConfig;

/// Application state shared by all handlers
///
/// # Fields
///
/// * `permissions` / `users` - business services over the configured store
/// * `registry` - chat sessions behind `/ws`
/// * `emitter` - SSE multicast behind `/update/user`
/// * `events` - fan-out of application events to both of the above
/// * `files` - the bucket behind `/minio`
/// * `verifier` - JWT verification for the auth middleware
/// * `config` - the resolved configuration
#[cfg(feature = "ssr")]
#[derive(Clone)]
pub struct AppState {
    pub permissions: PermissionService,
    pub users: UserService,
    pub registry: SessionRegistry,
    pub emitter: UserUpdateEmitter,
    pub events: EventPublisher,
    pub files: FileStore,
    pub verifier: Arc<JwtVerifier>,
    pub config: Arc<AppConfig>,
}

#[cfg(feature = "ssr")]
impl FromRef<AppState> for SessionRegistry {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.registry.clone()
    }
}

#[cfg(feature = "ssr")]
impl FromRef<AppState> for UserUpdateEmitter {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.emitter.clone()
    }
}

#[cfg(feature = "ssr")]
impl FromRef<AppState> for PermissionService {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.permissions.clone()
    }
}

#[cfg(feature = "ssr")]
impl FromRef<AppState> for UserService {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.users.clone()
    }
}

#[cfg(feature = "ssr")]
impl FromRef<AppState> for EventPublisher {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.events.clone()
    }
}

#[cfg(feature = "ssr")]
impl FromRef<AppState> for FileStore {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.files.clone()
    }
}
