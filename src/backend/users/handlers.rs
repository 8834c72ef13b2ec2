/**
 * User HTTP Handlers
 *
 * Mounted under both `/coroutine` and `/reactive`. Responses carry the
 * user's permissions resolved into full `PermissionDto`s under `role`.
 */

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::backend::error::{ApiJson, ApiPath, ApiQuery, BackendError};
use crate::backend::users::UserService;
use crate::shared::page::SortField;
use crate::shared::{Auditor, PageQuery, UserDto, UserModifyCommand};

pub async fn list_users(
    State(service): State<UserService>,
    auditor: Auditor,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<Vec<UserDto>>, BackendError> {
    let page = query.into_request(SortField::USER)?;
    tracing::debug!(
        "Listing users page {} (size {}) for {}",
        page.page,
        page.size,
        auditor.as_str()
    );
    let users = service.get_all(page).await?;
    Ok(Json(users.into_iter().map(UserDto::from).collect()))
}

pub async fn get_user(
    State(service): State<UserService>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<UserDto>, BackendError> {
    Ok(Json(service.get(&id).await?.into()))
}

pub async fn create_user(
    State(service): State<UserService>,
    auditor: Auditor,
    ApiJson(command): ApiJson<UserModifyCommand>,
) -> Result<Json<UserDto>, BackendError> {
    Ok(Json(service.create(command, &auditor).await?.into()))
}

pub async fn update_user(
    State(service): State<UserService>,
    ApiPath(id): ApiPath<String>,
    auditor: Auditor,
    ApiJson(command): ApiJson<UserModifyCommand>,
) -> Result<Json<UserDto>, BackendError> {
    Ok(Json(service.update(&id, command, &auditor).await?.into()))
}

pub async fn delete_user(
    State(service): State<UserService>,
    ApiPath(id): ApiPath<String>,
) -> Result<StatusCode, BackendError> {
    service.delete(&id).await?;
    Ok(StatusCode::OK)
}

/// `GET /usersCount`
pub async fn count_users(State(service): State<UserService>) -> Result<Json<u64>, BackendError> {
    Ok(Json(service.count().await?))
}
