use crate::models::{DownloadUrl, Student, StudentFile, StudentPayload};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, multipart};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Non-2xx answer; `message` is the server's `error` field when present.
    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid API URL: {0}")]
    Url(String),
}

impl ClientError {
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Api { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A document picked for upload.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Calls the records HTTP API makes available to the client.
#[async_trait]
pub trait StudentsApi: Send + Sync {
    async fn list_students(&self) -> Result<Vec<Student>, ClientError>;
    async fn create_student(&self, payload: &StudentPayload) -> Result<Student, ClientError>;
    async fn update_student(&self, id: i64, payload: &StudentPayload) -> Result<Student, ClientError>;
    async fn delete_student(&self, id: i64) -> Result<(), ClientError>;
    async fn list_files(&self, student_id: i64) -> Result<Vec<StudentFile>, ClientError>;
    async fn upload_file(&self, student_id: i64, upload: FileUpload) -> Result<StudentFile, ClientError>;
    async fn file_url(&self, file_id: i64) -> Result<String, ClientError>;
    async fn delete_file(&self, file_id: i64) -> Result<(), ClientError>;
}

pub struct HttpApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url).map_err(|e| ClientError::Url(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Url(base_url.to_string()));
        }
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { http, base_url })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        self.http.request(method, self.url(segments))
    }

    async fn check(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body: serde_json::Value = response.json().await.unwrap_or_default();
        let message = body
            .get("error")
            .and_then(|e| e.as_str())
            .map(|e| e.to_string())
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("erro").to_string());
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ClientError> {
        let response = builder.send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn empty(builder: RequestBuilder) -> Result<(), ClientError> {
        let response = builder.send().await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl StudentsApi for HttpApiClient {
    async fn list_students(&self) -> Result<Vec<Student>, ClientError> {
        Self::json(self.request(Method::GET, &["api", "students"])).await
    }

    async fn create_student(&self, payload: &StudentPayload) -> Result<Student, ClientError> {
        Self::json(self.request(Method::POST, &["api", "students"]).json(payload)).await
    }

    async fn update_student(&self, id: i64, payload: &StudentPayload) -> Result<Student, ClientError> {
        let id = id.to_string();
        Self::json(
            self.request(Method::PUT, &["api", "students", &id])
                .json(payload),
        )
        .await
    }

    async fn delete_student(&self, id: i64) -> Result<(), ClientError> {
        let id = id.to_string();
        Self::empty(self.request(Method::DELETE, &["api", "students", &id])).await
    }

    async fn list_files(&self, student_id: i64) -> Result<Vec<StudentFile>, ClientError> {
        let id = student_id.to_string();
        Self::json(self.request(Method::GET, &["api", "students", &id, "files"])).await
    }

    async fn upload_file(&self, student_id: i64, upload: FileUpload) -> Result<StudentFile, ClientError> {
        let mut part = multipart::Part::bytes(upload.data).file_name(upload.file_name);
        if let Some(content_type) = upload.content_type.as_deref() {
            part = part.mime_str(content_type)?;
        }
        let form = multipart::Form::new().part("file", part);

        let id = student_id.to_string();
        Self::json(
            self.request(Method::POST, &["api", "students", &id, "files"])
                .multipart(form),
        )
        .await
    }

    async fn file_url(&self, file_id: i64) -> Result<String, ClientError> {
        let id = file_id.to_string();
        let link: DownloadUrl = Self::json(self.request(Method::GET, &["api", "files", &id])).await?;
        Ok(link.url)
    }

    async fn delete_file(&self, file_id: i64) -> Result<(), ClientError> {
        let id = file_id.to_string();
        Self::empty(self.request(Method::DELETE, &["api", "files", &id])).await
    }
}
