/**
 * Server Initialization
 *
 * # Initialization Process
 *
 * 1. Build the JWT verifier from the configuration
 * 2. Create the chat registry, SSE emitter and event publisher (with the
 *    Kafka producer when the `kafka` feature is on and brokers are set)
 * 3. Open the file bucket
 * 4. Wire the permission and user services over the store
 * 5. Start the Kafka consumers, then create the router
 *
 * A periodic debug task reports connected chat sessions and SSE
 * subscribers.
 */

#[cfg(feature = "ssr")]
use axum::Router;
#[cfg(feature = "ssr")]
use std::sync::Arc;
#[cfg(feature = "ssr")]
use std::time::Duration;

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
use crate::backend::routes::router::create_router;
#[cfg(feature = "ssr")]
use crate::backend::server::config::load_store;
#[cfg(feature = "ssr")]
use crate::backend::server::state::AppState;
#[cfg(feature = "ssr")]
use crate::backend::store::Store;
#[cfg(feature = "ssr")]
use crate::backend::users::UserService;
#[cfg(feature = "ssr")]
use crate::shared::{AppConfig, ConfigError};

#[cfg(feature = "ssr")]
const STATS_INTERVAL: Duration = Duration::from_secs(300);

/// Assemble `AppState` over an already chosen store
#[cfg(feature = "ssr")]
pub fn build_state(config: AppConfig, store: Store) -> Result<AppState, ConfigError> {
    let verifier = Arc::new(JwtVerifier::from_settings(&config.jwt)?);

    let registry = SessionRegistry::new(config.chat.clone());
    let emitter = UserUpdateEmitter::new(config.sse_heartbeat);
    let events = EventPublisher::new(registry.clone(), emitter.clone());
    #[cfg(feature = "kafka")]
    let events = crate::backend::kafka::attach_producer(&config.kafka, events)?;
    let files = FileStore::from_settings(&config.storage)?;

    let permissions = PermissionService::new(store.permissions);
    let users = UserService::new(store.users, permissions.clone(), events.clone());

    Ok(AppState {
        permissions,
        users,
        registry,
        emitter,
        events,
        files,
        verifier,
        config: Arc::new(config),
    })
}

/// Create and configure the Axum application
///
/// Connects the store named by `config.database_url` (or falls back to
/// memory), builds the state and returns the router.
#[cfg(feature = "ssr")]
pub async fn create_app(config: AppConfig) -> Result<Router<()>, ConfigError> {
    tracing::info!("Initializing userhub backend server");

    let store = load_store(&config).await;
    let app_state = build_state(config, store)?;
    spawn_stats_task(&app_state);
    #[cfg(feature = "kafka")]
    {
        let consumers =
            crate::backend::kafka::spawn_consumers(&app_state.config.kafka, app_state.events.clone())?;
        tracing::info!("[kafka] {} consumer(s) started", consumers.len());
    }

    let app = create_router(app_state);
    tracing::info!("Router configured");
    Ok(app)
}

#[cfg(feature = "ssr")]
fn spawn_stats_task(app_state: &AppState) {
    let registry = app_state.registry.clone();
    let emitter = app_state.emitter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(STATS_INTERVAL);
        loop {
            interval.tick().await;
            tracing::debug!(
                "Active chat sessions: {}, SSE subscribers: {}",
                registry.session_count(),
                emitter.subscriber_count()
            );
        }
    });
}
