/**
 * Realtime Routes
 *
 * - `GET /ws` - chat WebSocket, admin token in the header or `access_token`
 * - `GET /update/user` - SSE stream of user updates, public
 */

use axum::{middleware::from_fn_with_state, routing::get, Router};

#[cfg(feature = "ssr")]
use crate::backend::chat::handle_chat_socket;
#[cfg(feature = "ssr")]
use crate::backend::middleware::require_admin_ws;
#[cfg(feature = "ssr")]
use crate::backend::realtime::handle_user_updates;
#[cfg(feature = "ssr")]
use crate::backend::server::state::AppState;

#[cfg(feature = "ssr")]
pub fn configure_chat_routes(router: Router<AppState>, app_state: &AppState) -> Router<AppState> {
    router
        .route(
            "/ws",
            get(handle_chat_socket)
                .route_layer(from_fn_with_state(app_state.clone(), require_admin_ws)),
        )
        .route("/update/user", get(handle_user_updates))
}
