//! Client side of the records service: a typed HTTP client, the view state
//! container and the controller that ties them together.

pub mod api;
pub mod app;
pub mod filter;
pub mod session;
pub mod state;

use session::Credentials;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the records API (default: "http://localhost:3000")
    pub api_url: String,

    /// Login accepted by the local gate
    pub credentials: Credentials,

    /// File holding the persisted login flag
    pub session_file: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3000".to_string(),
            credentials: Credentials {
                email: "admincpm@cpmitabuna.com".to_string(),
                password: "cpm".to_string(),
            },
            session_file: env::temp_dir().join("student-records").join("session"),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            api_url: env::var("RECORDS_API_URL").unwrap_or(default.api_url),
            credentials: Credentials {
                email: env::var("RECORDS_ADMIN_EMAIL").unwrap_or(default.credentials.email),
                password: env::var("RECORDS_ADMIN_PASSWORD")
                    .unwrap_or(default.credentials.password),
            },
            session_file: env::var("RECORDS_SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or(default.session_file),
        }
    }
}
