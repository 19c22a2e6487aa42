use crate::config::ServiceConfig;
use crate::infrastructure::supabase::SupabaseClient;
use crate::services::storage::SupabaseStorageService;
use std::sync::Arc;
use tracing::info;

pub fn setup_storage(config: &ServiceConfig, client: SupabaseClient) -> Arc<SupabaseStorageService> {
    info!(
        "☁️  Storage: {} (Bucket: {})",
        client.base_url(),
        config.storage_bucket
    );
    Arc::new(SupabaseStorageService::new(
        client,
        config.storage_bucket.clone(),
    ))
}
