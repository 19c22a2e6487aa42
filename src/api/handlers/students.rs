use crate::AppState;
use crate::api::error::AppError;
use crate::api::handlers::path_id;
use crate::messages;
use crate::models::{NewStudent, Student, StudentPayload};
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};

fn validated(payload: Result<Json<StudentPayload>, JsonRejection>) -> Result<NewStudent, AppError> {
    // Malformed JSON is reported like missing fields
    let Json(payload) = payload.map_err(|e| {
        tracing::debug!("Rejected student body: {}", e);
        AppError::BadRequest(messages::REQUIRED_FIELDS.to_string())
    })?;
    payload
        .into_new_student()
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

#[utoipa::path(
    get,
    path = "/api/students",
    responses(
        (status = 200, description = "Students ordered by name", body = [Student]),
        (status = 500, description = "Data API failure")
    ),
    tag = "students"
)]
pub async fn list_students(State(state): State<AppState>) -> Result<Json<Vec<Student>>, AppError> {
    Ok(Json(state.students.list().await?))
}

#[utoipa::path(
    post,
    path = "/api/students",
    request_body = StudentPayload,
    responses(
        (status = 201, description = "Student created", body = Student),
        (status = 400, description = "Missing fields or duplicate code"),
        (status = 500, description = "Data API failure")
    ),
    tag = "students"
)]
pub async fn create_student(
    State(state): State<AppState>,
    payload: Result<Json<StudentPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Student>), AppError> {
    let student = validated(payload)?;
    let created = state.students.create(student).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/students/{id}",
    params(("id" = i64, Path, description = "Student id")),
    request_body = StudentPayload,
    responses(
        (status = 200, description = "Student updated", body = Student),
        (status = 400, description = "Missing fields or duplicate code"),
        (status = 404, description = "Student not found"),
        (status = 500, description = "Data API failure")
    ),
    tag = "students"
)]
pub async fn update_student(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<StudentPayload>, JsonRejection>,
) -> Result<Json<Student>, AppError> {
    let id = path_id(id, || AppError::NotFound(messages::STUDENT_NOT_FOUND.to_string()))?;
    let student = validated(payload)?;
    Ok(Json(state.students.update(id, student).await?))
}

#[utoipa::path(
    delete,
    path = "/api/students/{id}",
    params(("id" = i64, Path, description = "Student id")),
    responses(
        (status = 204, description = "Student, its files and blobs removed"),
        (status = 500, description = "Data API failure")
    ),
    tag = "students"
)]
pub async fn delete_student(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = path_id(id, || AppError::Internal(messages::DELETE_STUDENT_FAILED.to_string()))?;
    state.students.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
