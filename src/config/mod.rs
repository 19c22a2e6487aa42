use std::env;
use std::path::PathBuf;

/// Runtime configuration for the records API
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Base URL of the hosted data/storage project (e.g. https://xyz.supabase.co)
    pub supabase_url: String,

    /// Service-role key, falling back to the anon key
    pub supabase_key: String,

    /// Storage bucket holding the scanned documents (default: "student-documents")
    pub storage_bucket: String,

    /// Lifetime of signed download URLs in seconds (default: 3600)
    pub signed_url_ttl_secs: u64,

    /// Maximum accepted request body in bytes (default: 50 MB)
    pub max_upload_size: usize,

    /// Connect timeout for the outbound client in seconds (default: 10)
    pub connect_timeout_secs: u64,

    /// CORS origins; empty means any
    pub allowed_origins: Vec<String>,

    /// Built front-end served at `/`, if present
    pub static_dir: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://127.0.0.1:54321".to_string(),
            supabase_key: String::new(),
            storage_bucket: "student-documents".to_string(),
            signed_url_ttl_secs: 3600,
            max_upload_size: 50 * 1024 * 1024, // 50 MB
            connect_timeout_secs: 10,
            allowed_origins: Vec::new(),
            static_dir: Some(PathBuf::from("dist")),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            supabase_url: env::var("SUPABASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(default.supabase_url),

            supabase_key: env::var("SUPABASE_SERVICE_ROLE_KEY")
                .or_else(|_| env::var("SUPABASE_ANON_KEY"))
                .unwrap_or(default.supabase_key),

            storage_bucket: env::var("STORAGE_BUCKET").unwrap_or(default.storage_bucket),

            signed_url_ttl_secs: env::var("SIGNED_URL_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.signed_url_ttl_secs),

            max_upload_size: env::var("MAX_UPLOAD_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_upload_size),

            connect_timeout_secs: env::var("CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.connect_timeout_secs),

            allowed_origins: env::var("ALLOWED_ORIGINS")
                .ok()
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(default.allowed_origins),

            static_dir: match env::var("STATIC_DIR") {
                Ok(v) if v.is_empty() => None,
                Ok(v) => Some(PathBuf::from(v)),
                Err(_) => default.static_dir,
            },
        }
    }

    /// Create config for tests and local runs (no static hosting, small bodies)
    pub fn development() -> Self {
        Self {
            supabase_url: "http://127.0.0.1:54321".to_string(),
            supabase_key: "dev-key".to_string(),
            storage_bucket: "student-documents".to_string(),
            signed_url_ttl_secs: 3600,
            max_upload_size: 5 * 1024 * 1024,
            connect_timeout_secs: 2,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(), // Vite default
            ],
            static_dir: None,
        }
    }
}
