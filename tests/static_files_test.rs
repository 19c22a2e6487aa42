mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{MemoryDataApi, MockStorageService, send};
use http_body_util::BodyExt;
use std::sync::Arc;
use student_records::config::ServiceConfig;
use student_records::{AppState, create_app};
use tower::ServiceExt;

async fn get_text(app: &axum::Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8_lossy(&body).to_string())
}

#[tokio::test]
async fn test_serves_built_front_end_with_fallback() {
    let dist = tempfile::tempdir().unwrap();
    std::fs::write(dist.path().join("index.html"), "<div id=\"root\"></div>").unwrap();
    std::fs::write(dist.path().join("app.js"), "console.log('ok')").unwrap();

    let config = ServiceConfig {
        static_dir: Some(dist.path().to_path_buf()),
        ..ServiceConfig::development()
    };
    let data = Arc::new(MemoryDataApi::default());
    let app = create_app(AppState::new(
        data.clone(),
        data,
        Arc::new(MockStorageService::default()),
        config,
    ));

    let (status, body) = get_text(&app, "/app.js").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "console.log('ok')");

    // Client-side routes get the shell
    let (status, body) = get_text(&app, "/alunos/3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "<div id=\"root\"></div>");

    let (status, list) = send(&app, "GET", "/api/students", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, serde_json::json!([]));
}
