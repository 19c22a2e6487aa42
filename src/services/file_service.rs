use crate::api::error::AppError;
use crate::infrastructure::supabase::DataApiError;
use crate::messages;
use crate::models::{NewStudentFile, StudentFile};
use crate::services::records::FileRepository;
use crate::services::storage::StorageService;
use crate::utils::naming::{generate_stored_filename, resolve_mime_type, storage_path};
use bytes::Bytes;
use std::sync::Arc;
use tracing::{error, info, warn};

/// A file part received from the client.
pub struct IncomingFile {
    pub original_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

pub struct FileService {
    files: Arc<dyn FileRepository>,
    storage: Arc<dyn StorageService>,
    signed_url_ttl_secs: u64,
}

impl FileService {
    pub fn new(
        files: Arc<dyn FileRepository>,
        storage: Arc<dyn StorageService>,
        signed_url_ttl_secs: u64,
    ) -> Self {
        Self {
            files,
            storage,
            signed_url_ttl_secs,
        }
    }

    pub async fn list_for_student(&self, student_id: i64) -> Result<Vec<StudentFile>, AppError> {
        self.files.list_for_student(student_id).await.map_err(|e| {
            error!("Error fetching files of student {}: {}", student_id, e);
            AppError::Internal(messages::FETCH_FILES_FAILED.to_string())
        })
    }

    /// Writes the blob, then records it. A failed insert leaves the blob in
    /// place; nothing cleans it up.
    pub async fn upload(&self, student_id: i64, file: IncomingFile) -> Result<StudentFile, AppError> {
        let filename = generate_stored_filename(&file.original_name);
        let path = storage_path(student_id, &filename);
        let mime_type = resolve_mime_type(file.content_type.as_deref(), &file.data);
        let size = file.data.len();

        if let Err(e) = self.storage.upload_file(&path, file.data, &mime_type).await {
            error!("Error uploading {} to storage: {:?}", path, e);
            return Err(AppError::Internal(messages::SAVE_FILE_FAILED.to_string()));
        }

        let record = NewStudentFile {
            student_id,
            filename,
            original_name: file.original_name,
            mime_type,
            storage_path: path,
        };
        match self.files.insert(&record).await {
            Ok(saved) => {
                info!(
                    "📄 Stored {} ({} bytes) for student {} at {}",
                    saved.original_name, size, student_id, saved.storage_path
                );
                Ok(saved)
            }
            Err(e) => {
                error!(
                    "Error saving metadata for {} (blob left in storage): {}",
                    record.storage_path, e
                );
                Err(AppError::Internal(messages::SAVE_FILE_FAILED.to_string()))
            }
        }
    }

    /// Short-lived signed URL. Any failure is reported as not found.
    pub async fn download_url(&self, id: i64) -> Result<String, AppError> {
        let not_found = || AppError::NotFound(messages::FILE_NOT_FOUND.to_string());

        let file = self.files.find(id).await.map_err(|e| {
            warn!("Error looking up file {}: {}", id, e);
            not_found()
        })?;

        self.storage
            .create_signed_url(&file.storage_path, self.signed_url_ttl_secs)
            .await
            .map_err(|e| {
                warn!("Error signing URL for {}: {:?}", file.storage_path, e);
                not_found()
            })
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let file = match self.files.find(id).await {
            Ok(file) => file,
            Err(DataApiError::NotFound) => {
                return Err(AppError::NotFound(messages::FILE_NOT_FOUND.to_string()));
            }
            Err(e) => {
                error!("Error looking up file {}: {}", id, e);
                return Err(AppError::Internal(messages::DELETE_FILE_FAILED.to_string()));
            }
        };

        if let Err(e) = self
            .storage
            .delete_files(std::slice::from_ref(&file.storage_path))
            .await
        {
            error!("Error deleting {} from storage: {:?}", file.storage_path, e);
            return Err(AppError::Internal(messages::DELETE_FILE_FAILED.to_string()));
        }

        self.files.delete(id).await.map_err(|e| {
            error!("Error deleting file record {}: {}", id, e);
            AppError::Internal(messages::DELETE_FILE_FAILED.to_string())
        })?;

        info!("🗑️  File {} ({}) deleted", id, file.storage_path);
        Ok(())
    }
}
