use crate::config::ServiceConfig;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// PostgreSQL SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Error, Debug)]
pub enum DataApiError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("no matching record")]
    NotFound,

    #[error("data API responded {status}: {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid data API URL: {0}")]
    Url(String),
}

/// Thin client for a hosted project exposing a PostgREST table API
/// (`/rest/v1`) and an object storage API (`/storage/v1`).
#[derive(Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: Url,
    key: String,
}

impl SupabaseClient {
    pub fn new(base_url: &str, key: &str, connect_timeout: Duration) -> Result<Self, DataApiError> {
        let base_url =
            Url::parse(base_url.trim_end_matches('/')).map_err(|e| DataApiError::Url(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(DataApiError::Url(base_url.to_string()));
        }

        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url,
            key: key.to_string(),
        })
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self, DataApiError> {
        Self::new(
            &config.supabase_url,
            &config.supabase_key,
            Duration::from_secs(config.connect_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends path segments to the project URL, percent-encoding each one.
    pub fn endpoint<I, S>(&self, segments: I) -> Url
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
    }

    /// Passes 2xx responses through and classifies everything else.
    pub async fn check(response: Response) -> Result<Response, DataApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body: serde_json::Value = response.json().await.unwrap_or_default();
        let code = body
            .get("code")
            .and_then(|c| c.as_str())
            .map(|c| c.to_string());
        let message = ["message", "error", "msg"]
            .iter()
            .find_map(|k| body.get(*k).and_then(|v| v.as_str()))
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error"))
            .to_string();

        // A bare 409 (no SQLSTATE) is the storage API's duplicate object
        let unique = match code.as_deref() {
            Some(code) => code == UNIQUE_VIOLATION,
            None => status == StatusCode::CONFLICT,
        };
        if unique {
            return Err(DataApiError::UniqueViolation(message));
        }
        if status == StatusCode::NOT_FOUND {
            return Err(DataApiError::NotFound);
        }

        Err(DataApiError::Api {
            status: status.as_u16(),
            code,
            message,
        })
    }

    fn table_url(&self, table: &str, filters: &[(&str, String)]) -> Url {
        let mut url = self.endpoint(["rest", "v1", table]);
        if !filters.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in filters {
                query.append_pair(key, value);
            }
        }
        url
    }

    /// `GET /rest/v1/{table}?{filters}`
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> Result<Vec<T>, DataApiError> {
        let response = self
            .request(Method::GET, self.table_url(table, filters))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// `POST /rest/v1/{table}` returning the inserted row.
    pub async fn insert<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        table: &str,
        row: &B,
    ) -> Result<T, DataApiError> {
        let response = self
            .request(Method::POST, self.table_url(table, &[]))
            .header("Prefer", "return=representation")
            .json(&[row])
            .send()
            .await?;
        let mut rows: Vec<T> = Self::check(response).await?.json().await?;
        if rows.is_empty() {
            return Err(DataApiError::NotFound);
        }
        Ok(rows.swap_remove(0))
    }

    /// `PATCH /rest/v1/{table}?{filters}` returning the updated rows.
    pub async fn update<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
        changes: &B,
    ) -> Result<Vec<T>, DataApiError> {
        let response = self
            .request(Method::PATCH, self.table_url(table, filters))
            .header("Prefer", "return=representation")
            .json(changes)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// `DELETE /rest/v1/{table}?{filters}`
    pub async fn delete(&self, table: &str, filters: &[(&str, String)]) -> Result<(), DataApiError> {
        let response = self
            .request(Method::DELETE, self.table_url(table, filters))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

/// PostgREST equality filter value, e.g. `eq.42`
pub fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SupabaseClient {
        SupabaseClient::new("https://project.example.co/", "key", Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let url = client().endpoint(["storage", "v1", "object", "bucket", "documents", "a b.pdf"]);
        assert_eq!(
            url.as_str(),
            "https://project.example.co/storage/v1/object/bucket/documents/a%20b.pdf"
        );
    }

    #[test]
    fn test_table_url_with_filters() {
        let url = client().table_url(
            "student_files",
            &[("student_id", eq(3)), ("order", "upload_date.desc".to_string())],
        );
        assert_eq!(
            url.as_str(),
            "https://project.example.co/rest/v1/student_files?student_id=eq.3&order=upload_date.desc"
        );
    }

    #[test]
    fn test_rejects_opaque_url() {
        assert!(SupabaseClient::new("mailto:admin@example.com", "k", Duration::from_secs(1)).is_err());
    }
}
