pub mod files;
pub mod health;
pub mod students;

use crate::api::error::AppError;
use axum::extract::{Path, rejection::PathRejection};

/// Unwraps a numeric `:id`, reporting a malformed one with the route's own
/// error so the body stays `{"error": ...}`.
pub(crate) fn path_id(
    path: Result<Path<i64>, PathRejection>,
    on_invalid: impl FnOnce() -> AppError,
) -> Result<i64, AppError> {
    match path {
        Ok(Path(id)) => Ok(id),
        Err(e) => {
            tracing::debug!("Rejected path id: {}", e);
            Err(on_invalid())
        }
    }
}
