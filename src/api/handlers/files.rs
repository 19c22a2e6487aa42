use crate::AppState;
use crate::api::error::AppError;
use crate::api::handlers::path_id;
use crate::messages;
use crate::models::{DownloadUrl, StudentFile};
use crate::services::file_service::IncomingFile;
use axum::{
    Json,
    extract::{Multipart, Path, State, multipart::MultipartRejection, rejection::PathRejection},
    http::StatusCode,
};

/// Form field carrying the document
const FILE_FIELD: &str = "file";

#[utoipa::path(
    get,
    path = "/api/students/{id}/files",
    params(("id" = i64, Path, description = "Student id")),
    responses(
        (status = 200, description = "Files, most recent first", body = [StudentFile]),
        (status = 500, description = "Data API failure")
    ),
    tag = "files"
)]
pub async fn list_student_files(
    State(state): State<AppState>,
    student_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<StudentFile>>, AppError> {
    let student_id = path_id(student_id, || {
        AppError::Internal(messages::FETCH_FILES_FAILED.to_string())
    })?;
    Ok(Json(state.files.list_for_student(student_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/students/{id}/files",
    params(("id" = i64, Path, description = "Student id")),
    request_body(content = Multipart, description = "Document in the `file` field"),
    responses(
        (status = 201, description = "File stored", body = StudentFile),
        (status = 400, description = "No file sent"),
        (status = 413, description = "File exceeds the upload limit"),
        (status = 500, description = "Storage or data API failure")
    ),
    tag = "files"
)]
pub async fn upload_file(
    State(state): State<AppState>,
    student_id: Result<Path<i64>, PathRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<StudentFile>), AppError> {
    let student_id = path_id(student_id, || {
        AppError::Internal(messages::SAVE_FILE_FAILED.to_string())
    })?;
    let no_file = || AppError::BadRequest(messages::NO_FILE_SENT.to_string());
    let mut multipart = multipart.map_err(|e| {
        tracing::debug!("Rejected upload body: {}", e);
        no_file()
    })?;

    let mut incoming = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::PayloadTooLarge(messages::FILE_TOO_LARGE.to_string());
        }
        tracing::warn!("Malformed multipart body: {}", e);
        no_file()
    })? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        // A part without a filename is a plain form value, not a file
        let Some(original_name) = field.file_name().map(|s| s.to_string()) else {
            continue;
        };
        let content_type = field.content_type().map(|s| s.to_string());
        let data = field.bytes().await.map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                return AppError::PayloadTooLarge(messages::FILE_TOO_LARGE.to_string());
            }
            tracing::error!("Error reading upload for student {}: {}", student_id, e);
            AppError::Internal(messages::SAVE_FILE_FAILED.to_string())
        })?;

        incoming = Some(IncomingFile {
            original_name,
            content_type,
            data,
        });
        break;
    }

    let incoming = incoming.ok_or_else(no_file)?;
    let saved = state.files.upload(student_id, incoming).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

#[utoipa::path(
    get,
    path = "/api/files/{id}",
    params(("id" = i64, Path, description = "File id")),
    responses(
        (status = 200, description = "Signed download URL, valid for one hour", body = DownloadUrl),
        (status = 404, description = "File not found")
    ),
    tag = "files"
)]
pub async fn get_file_url(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<DownloadUrl>, AppError> {
    let id = path_id(id, || AppError::NotFound(messages::FILE_NOT_FOUND.to_string()))?;
    let url = state.files.download_url(id).await?;
    Ok(Json(DownloadUrl { url }))
}

#[utoipa::path(
    delete,
    path = "/api/files/{id}",
    params(("id" = i64, Path, description = "File id")),
    responses(
        (status = 204, description = "Blob and record removed"),
        (status = 404, description = "File not found"),
        (status = 500, description = "Storage or data API failure")
    ),
    tag = "files"
)]
pub async fn delete_file(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = path_id(id, || AppError::NotFound(messages::FILE_NOT_FOUND.to_string()))?;
    state.files.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
