/**
 * Management API Routes
 *
 * The permission and user endpoints. The same router is mounted under
 * `/coroutine` and `/reactive`, and every route in it requires an admin
 * bearer token.
 *
 * ## Permissions
 * - `GET /permissions` - paged list
 * - `GET /permissions/{id}` - one permission
 * - `POST /permissions` - create
 * - `PUT /permissions/{id}` - update (requires `version`)
 * - `DELETE /permissions/{id}` - delete (idempotent)
 *
 * ## Users
 * - `GET /users` - paged list with resolved permissions
 * - `GET /users/{id}` - one user
 * - `POST /users` - create, publishes `USER_CREATED`
 * - `PUT /users/{id}` - update (requires `version`)
 * - `DELETE /users/{id}` - delete
 * - `GET /usersCount` - number of users
 */

use axum::{middleware::from_fn_with_state, routing::get, Router};

#[cfg(feature = "ssr")]
use crate::backend::middleware::require_admin;
#[cfg(feature = "ssr")]
use crate::backend::permissions::handlers::{
    create_permission, delete_permission, get_permission, list_permissions, update_permission,
};
#[cfg(feature = "ssr")]
use crate::backend::server::state::AppState;
#[cfg(feature = "ssr")]
use crate::backend::users::handlers::{
    count_users, create_user, delete_user, get_user, list_users, update_user,
};

/// Prefixes the management API is mounted under
pub const API_PREFIXES: [&str; 2] = ["/coroutine", "/reactive"];

/// Admin-only permission and user routes, ready to be nested
#[cfg(feature = "ssr")]
pub fn management_routes(app_state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/permissions", get(list_permissions).post(create_permission))
        .route(
            "/permissions/{id}",
            get(get_permission)
                .put(update_permission)
                .delete(delete_permission),
        )
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/usersCount", get(count_users))
        .route_layer(from_fn_with_state(app_state.clone(), require_admin))
}

/// Mount the management API under every prefix
#[cfg(feature = "ssr")]
pub fn configure_api_routes(router: Router<AppState>, app_state: &AppState) -> Router<AppState> {
    let api = management_routes(app_state);
    API_PREFIXES
        .into_iter()
        .fold(router, |router, prefix| router.nest(prefix, api.clone()))
}
