/**
 * File HTTP Handlers
 *
 * - `POST   /minio/upload` - multipart form, the file in part `file`
 * - `GET    /minio/{file}` - download as an attachment
 * - `DELETE /minio/{file}` - remove (idempotent)
 */

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::backend::error::{ApiPath, BackendError};
use crate::backend::files::{FileStore, UploadResponse};

/// Multipart part holding the upload
pub const FILE_PART: &str = "file";

pub async fn upload_file(
    State(files): State<FileStore>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, BackendError> {
    let mut multipart = multipart?;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_PART) {
            continue;
        }
        let name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| BackendError::validation("Part 'file' has no filename"))?;
        let data = field.bytes().await?;
        return Ok(Json(files.upload(&name, data).await?));
    }
    Err(BackendError::validation("Required part 'file' is not present"))
}

pub async fn download_file(
    State(files): State<FileStore>,
    ApiPath(file): ApiPath<String>,
) -> Result<impl IntoResponse, BackendError> {
    let data = files.download(&file).await?;
    let headers = [
        (header::CONTENT_TYPE, "application/octet-stream".to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename={}", file)),
    ];
    Ok((headers, data))
}

pub async fn delete_file(
    State(files): State<FileStore>,
    ApiPath(file): ApiPath<String>,
) -> Result<StatusCode, BackendError> {
    files.remove(&file).await?;
    Ok(StatusCode::OK)
}
