use crate::infrastructure::supabase::SupabaseClient;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

#[async_trait]
pub trait StorageService: Send + Sync {
    /// Writes a new object; never overwrites an existing key.
    async fn upload_file(&self, key: &str, data: Bytes, content_type: &str) -> Result<()>;

    async fn delete_files(&self, keys: &[String]) -> Result<()>;

    /// Absolute URL granting read access for `expires_in_secs`.
    async fn create_signed_url(&self, key: &str, expires_in_secs: u64) -> Result<String>;
}

pub struct SupabaseStorageService {
    client: SupabaseClient,
    bucket: String,
}

#[derive(Deserialize)]
struct SignedUrlResponse {
    #[serde(rename = "signedURL", alias = "signedUrl")]
    signed_url: String,
}

impl SupabaseStorageService {
    pub fn new(client: SupabaseClient, bucket: String) -> Self {
        Self { client, bucket }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn object_url(&self, prefix: &[&str], key: &str) -> url::Url {
        let segments = ["storage", "v1"]
            .into_iter()
            .chain(prefix.iter().copied())
            .chain(std::iter::once(self.bucket.as_str()))
            .chain(key.split('/'));
        self.client.endpoint(segments)
    }
}

#[async_trait]
impl StorageService for SupabaseStorageService {
    async fn upload_file(&self, key: &str, data: Bytes, content_type: &str) -> Result<()> {
        let response = self
            .client
            .request(Method::POST, self.object_url(&["object"], key))
            .header("x-upsert", "false")
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await?;
        SupabaseClient::check(response).await?;
        Ok(())
    }

    async fn delete_files(&self, keys: &[String]) -> Result<()> {
        let url = self
            .client
            .endpoint(["storage", "v1", "object", self.bucket.as_str()]);
        let response = self
            .client
            .request(Method::DELETE, url)
            .json(&json!({ "prefixes": keys }))
            .send()
            .await?;
        SupabaseClient::check(response).await?;
        Ok(())
    }

    async fn create_signed_url(&self, key: &str, expires_in_secs: u64) -> Result<String> {
        let response = self
            .client
            .request(Method::POST, self.object_url(&["object", "sign"], key))
            .json(&json!({ "expiresIn": expires_in_secs }))
            .send()
            .await?;
        let signed: SignedUrlResponse = SupabaseClient::check(response).await?.json().await?;

        // The storage API answers with a path relative to /storage/v1
        if signed.signed_url.starts_with("http://") || signed.signed_url.starts_with("https://") {
            return Ok(signed.signed_url);
        }
        let base = self.client.base_url().as_str().trim_end_matches('/');
        let path = signed.signed_url.trim_start_matches('/');
        if path.is_empty() {
            return Err(anyhow!("storage returned an empty signed URL for {}", key));
        }
        Ok(format!("{}/storage/v1/{}", base, path))
    }
}
