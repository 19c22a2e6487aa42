use crate::config::ServiceConfig;
use crate::infrastructure::supabase::SupabaseClient;
use crate::services::records::{PostgrestFileRepository, PostgrestStudentRepository};
use std::sync::Arc;
use tracing::{info, warn};

pub struct Repositories {
    pub students: Arc<PostgrestStudentRepository>,
    pub files: Arc<PostgrestFileRepository>,
}

/// Builds the shared data-access client. No connection is opened until the
/// first request; the hosted service owns the schema.
pub fn setup_client(config: &ServiceConfig) -> anyhow::Result<SupabaseClient> {
    let client = SupabaseClient::from_config(config)?;

    info!("📂 Data API: {}", client.base_url());
    if config.supabase_key.is_empty() {
        warn!("⚠️  SUPABASE_SERVICE_ROLE_KEY / SUPABASE_ANON_KEY not set, requests will be anonymous");
    }

    Ok(client)
}

pub fn setup_repositories(client: &SupabaseClient) -> Repositories {
    Repositories {
        students: Arc::new(PostgrestStudentRepository::new(client.clone())),
        files: Arc::new(PostgrestFileRepository::new(client.clone())),
    }
}
