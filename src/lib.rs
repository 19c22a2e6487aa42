pub mod api;
pub mod client;
pub mod config;
pub mod infrastructure;
pub mod messages;
pub mod models;
pub mod services;
pub mod utils;

use crate::api::middleware::request_id::{REQUEST_ID_HEADER, request_id_middleware};
use crate::config::ServiceConfig;
use crate::services::file_service::FileService;
use crate::services::records::{FileRepository, StudentRepository};
use crate::services::storage::StorageService;
use crate::services::student_service::StudentService;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Request, Response},
    middleware::from_fn,
    routing::{get, put},
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{Span, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::students::list_students,
        api::handlers::students::create_student,
        api::handlers::students::update_student,
        api::handlers::students::delete_student,
        api::handlers::files::list_student_files,
        api::handlers::files::upload_file,
        api::handlers::files::get_file_url,
        api::handlers::files::delete_file,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            models::Student,
            models::StudentFile,
            models::StudentPayload,
            models::DownloadUrl,
            api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "students", description = "Student records"),
        (name = "files", description = "Scanned documents attached to students"),
        (name = "system", description = "Service status")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub students: Arc<StudentService>,
    pub files: Arc<FileService>,
    pub config: ServiceConfig,
}

impl AppState {
    pub fn new(
        students: Arc<dyn StudentRepository>,
        files: Arc<dyn FileRepository>,
        storage: Arc<dyn StorageService>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            students: Arc::new(StudentService::new(
                students,
                files.clone(),
                storage.clone(),
            )),
            files: Arc::new(FileService::new(files, storage, config.signed_url_ttl_secs)),
            config,
        }
    }
}

fn cors_layer(config: &ServiceConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

pub fn create_app(state: AppState) -> Router {
    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(api::handlers::health::health_check))
        .route(
            "/api/students",
            get(api::handlers::students::list_students).post(api::handlers::students::create_student),
        )
        .route(
            "/api/students/:id",
            put(api::handlers::students::update_student)
                .delete(api::handlers::students::delete_student),
        )
        .route(
            "/api/students/:id/files",
            get(api::handlers::files::list_student_files).post(api::handlers::files::upload_file),
        )
        .route(
            "/api/files/:id",
            get(api::handlers::files::get_file_url).delete(api::handlers::files::delete_file),
        )
        .layer(cors_layer(&state.config))
        .layer(DefaultBodyLimit::max(state.config.max_upload_size))
        .with_state(state.clone());

    // Single-page front end: unknown paths fall back to index.html
    let router = match &state.config.static_dir {
        Some(dir) => router.fallback_service(
            ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html"))),
        ),
        None => router,
    };

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<_>| {
            let request_id = request
                .headers()
                .get(&REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id,
            )
        })
        .on_request(|request: &Request<_>, _span: &Span| {
            info!("📥 {} {}", request.method(), request.uri());
        })
        .on_response(
            |response: &Response<_>, latency: std::time::Duration, _span: &Span| {
                info!(
                    "📤 Finished in {:?} with status {}",
                    latency,
                    response.status()
                );
            },
        );

    // Request ids are assigned outside the trace layer so spans carry them
    router
        .layer(trace_layer)
        .layer(from_fn(request_id_middleware))
}
