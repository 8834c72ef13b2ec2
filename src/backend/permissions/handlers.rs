/**
 * Permission HTTP Handlers
 *
 * Mounted under both `/coroutine` and `/reactive`:
 *
 * - `GET    /permissions?page&size&sort&direction`
 * - `GET    /permissions/{id}`
 * - `POST   /permissions`
 * - `PUT    /permissions/{id}`
 * - `DELETE /permissions/{id}`
 */

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::backend::error::{ApiJson, ApiPath, ApiQuery, BackendError};
use crate::backend::permissions::PermissionService;
use crate::shared::page::SortField;
use crate::shared::{Auditor, PageQuery, PermissionDto, PermissionModifyCommand};

pub async fn list_permissions(
    State(service): State<PermissionService>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<Vec<PermissionDto>>, BackendError> {
    let page = query.into_request(SortField::PERMISSION)?;
    let permissions = service.get_all(page).await?;
    Ok(Json(permissions.into_iter().map(PermissionDto::from).collect()))
}

pub async fn get_permission(
    State(service): State<PermissionService>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<PermissionDto>, BackendError> {
    Ok(Json(service.get(&id).await?.into()))
}

pub async fn create_permission(
    State(service): State<PermissionService>,
    auditor: Auditor,
    ApiJson(command): ApiJson<PermissionModifyCommand>,
) -> Result<Json<PermissionDto>, BackendError> {
    Ok(Json(service.create(command, &auditor).await?.into()))
}

pub async fn update_permission(
    State(service): State<PermissionService>,
    ApiPath(id): ApiPath<String>,
    auditor: Auditor,
    ApiJson(command): ApiJson<PermissionModifyCommand>,
) -> Result<Json<PermissionDto>, BackendError> {
    Ok(Json(service.update(&id, command, &auditor).await?.into()))
}

/// Always 200, whether or not the permission existed
pub async fn delete_permission(
    State(service): State<PermissionService>,
    ApiPath(id): ApiPath<String>,
) -> Result<StatusCode, BackendError> {
    service.delete(&id).await?;
    Ok(StatusCode::OK)
}
