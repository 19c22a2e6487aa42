use crate::AppState;
use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub data_api: String,
    pub storage_bucket: String,
    pub version: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service status", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    // The hosted service is not probed; this only reports what we talk to
    Json(HealthResponse {
        status: "ok".to_string(),
        data_api: state.config.supabase_url.clone(),
        storage_bucket: state.config.storage_bucket.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
