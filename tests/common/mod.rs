#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use bytes::Bytes;
use chrono::{Duration, TimeZone, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use student_records::config::ServiceConfig;
use student_records::infrastructure::supabase::DataApiError;
use student_records::models::{NewStudent, NewStudentFile, Student, StudentFile};
use student_records::services::records::{FileRepository, StudentRepository};
use student_records::services::storage::StorageService;
use student_records::{AppState, create_app};
use tower::ServiceExt;

#[derive(Default)]
struct Tables {
    students: Vec<Student>,
    files: Vec<StudentFile>,
    next_student_id: i64,
    next_file_id: i64,
}

/// In-memory stand-in for the hosted tables, enforcing the unique code.
#[derive(Default)]
pub struct MemoryDataApi {
    tables: Mutex<Tables>,
    pub fail_file_insert: AtomicBool,
    pub fail_reads: AtomicBool,
}

impl MemoryDataApi {
    pub fn student_count(&self) -> usize {
        self.tables.lock().unwrap().students.len()
    }

    pub fn file_rows(&self) -> Vec<StudentFile> {
        self.tables.lock().unwrap().files.clone()
    }

    fn check_reads(&self) -> Result<(), DataApiError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(DataApiError::Api {
                status: 503,
                code: None,
                message: "unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl StudentRepository for MemoryDataApi {
    async fn list(&self) -> Result<Vec<Student>, DataApiError> {
        self.check_reads()?;
        let mut students = self.tables.lock().unwrap().students.clone();
        students.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(students)
    }

    async fn insert(&self, student: &NewStudent) -> Result<Student, DataApiError> {
        let mut tables = self.tables.lock().unwrap();
        if tables
            .students
            .iter()
            .any(|s| s.student_code == student.student_code)
        {
            return Err(DataApiError::UniqueViolation(
                "duplicate key value violates unique constraint".to_string(),
            ));
        }
        tables.next_student_id += 1;
        let created = Student {
            id: tables.next_student_id,
            student_code: student.student_code.clone(),
            full_name: student.full_name.clone(),
            birth_date: student.birth_date,
        };
        tables.students.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: i64, student: &NewStudent) -> Result<Student, DataApiError> {
        let mut tables = self.tables.lock().unwrap();
        if tables
            .students
            .iter()
            .any(|s| s.id != id && s.student_code == student.student_code)
        {
            return Err(DataApiError::UniqueViolation(
                "duplicate key value violates unique constraint".to_string(),
            ));
        }
        let row = tables
            .students
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(DataApiError::NotFound)?;
        row.student_code = student.student_code.clone();
        row.full_name = student.full_name.clone();
        row.birth_date = student.birth_date;
        Ok(row.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), DataApiError> {
        let mut tables = self.tables.lock().unwrap();
        // Mirrors a foreign key without ON DELETE CASCADE
        if tables.files.iter().any(|f| f.student_id == id) {
            return Err(DataApiError::Api {
                status: 409,
                code: Some("23503".to_string()),
                message: "violates foreign key constraint".to_string(),
            });
        }
        tables.students.retain(|s| s.id != id);
        Ok(())
    }
}

#[async_trait]
impl FileRepository for MemoryDataApi {
    async fn list_for_student(&self, student_id: i64) -> Result<Vec<StudentFile>, DataApiError> {
        self.check_reads()?;
        let mut files: Vec<StudentFile> = self
            .tables
            .lock()
            .unwrap()
            .files
            .iter()
            .filter(|f| f.student_id == student_id)
            .cloned()
            .collect();
        files.sort_by(|a, b| b.upload_date.cmp(&a.upload_date));
        Ok(files)
    }

    async fn find(&self, id: i64) -> Result<StudentFile, DataApiError> {
        self.check_reads()?;
        self.tables
            .lock()
            .unwrap()
            .files
            .iter()
            .find(|f| f.id == id)
            .cloned()
            .ok_or(DataApiError::NotFound)
    }

    async fn insert(&self, file: &NewStudentFile) -> Result<StudentFile, DataApiError> {
        if self.fail_file_insert.load(Ordering::SeqCst) {
            return Err(DataApiError::Api {
                status: 500,
                code: None,
                message: "insert failed".to_string(),
            });
        }
        let mut tables = self.tables.lock().unwrap();
        tables.next_file_id += 1;
        // Strictly increasing upload times keep ordering deterministic
        let upload_date = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap()
            + Duration::minutes(tables.next_file_id);
        let saved = StudentFile {
            id: tables.next_file_id,
            student_id: file.student_id,
            filename: file.filename.clone(),
            original_name: file.original_name.clone(),
            mime_type: file.mime_type.clone(),
            storage_path: file.storage_path.clone(),
            upload_date,
        };
        tables.files.push(saved.clone());
        Ok(saved)
    }

    async fn delete(&self, id: i64) -> Result<(), DataApiError> {
        self.tables.lock().unwrap().files.retain(|f| f.id != id);
        Ok(())
    }

    async fn delete_for_student(&self, student_id: i64) -> Result<(), DataApiError> {
        self.tables
            .lock()
            .unwrap()
            .files
            .retain(|f| f.student_id != student_id);
        Ok(())
    }
}

/// Bucket kept in a map; uploads never overwrite.
#[derive(Default)]
pub struct MockStorageService {
    objects: Mutex<HashMap<String, (Bytes, String)>>,
    pub fail_upload: AtomicBool,
    pub fail_delete: AtomicBool,
    pub delete_calls: Mutex<Vec<Vec<String>>>,
}

impl MockStorageService {
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects.lock().unwrap().get(key).map(|(_, ct)| ct.clone())
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn upload_file(&self, key: &str, data: Bytes, content_type: &str) -> anyhow::Result<()> {
        if self.fail_upload.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("storage unavailable"));
        }
        let mut objects = self.objects.lock().unwrap();
        if objects.contains_key(key) {
            return Err(anyhow::anyhow!("The resource already exists"));
        }
        objects.insert(key.to_string(), (data, content_type.to_string()));
        Ok(())
    }

    async fn delete_files(&self, keys: &[String]) -> anyhow::Result<()> {
        self.delete_calls.lock().unwrap().push(keys.to_vec());
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("storage unavailable"));
        }
        let mut objects = self.objects.lock().unwrap();
        for key in keys {
            objects.remove(key);
        }
        Ok(())
    }

    async fn create_signed_url(&self, key: &str, expires_in_secs: u64) -> anyhow::Result<String> {
        if !self.objects.lock().unwrap().contains_key(key) {
            return Err(anyhow::anyhow!("Object not found"));
        }
        Ok(format!(
            "http://storage.test/object/sign/student-documents/{}?token=mock&expires={}",
            key, expires_in_secs
        ))
    }
}

pub struct TestApp {
    pub router: Router,
    pub data: Arc<MemoryDataApi>,
    pub storage: Arc<MockStorageService>,
}

pub fn setup_app() -> TestApp {
    let data = Arc::new(MemoryDataApi::default());
    let storage = Arc::new(MockStorageService::default());
    let state = AppState::new(
        data.clone(),
        data.clone(),
        storage.clone(),
        ServiceConfig::development(),
    );
    TestApp {
        router: create_app(state),
        data,
        storage,
    }
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    read(response).await
}

pub async fn upload(
    app: &Router,
    student_id: i64,
    filename: &str,
    content_type: &str,
    content: &[u8],
) -> (StatusCode, Value) {
    let boundary = "---------------------------123456789012345678901234567";
    let mut body = format!(
        "--{boundary}\r\n\
        Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
        Content-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/students/{}/files", student_id))
                .header(
                    "Content-Type",
                    format!("multipart/form-data; boundary={}", boundary),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    read(response).await
}

async fn read(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).to_string()))
    };
    (status, json)
}

pub async fn create_student(app: &Router, code: &str, name: &str, birth: &str) -> Value {
    let (status, json) = send(
        app,
        "POST",
        "/api/students",
        Some(serde_json::json!({
            "student_code": code,
            "full_name": name,
            "birth_date": birth,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {json}");
    json
}
