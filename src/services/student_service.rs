use crate::api::error::AppError;
use crate::infrastructure::supabase::DataApiError;
use crate::messages;
use crate::models::{NewStudent, Student};
use crate::services::records::{FileRepository, StudentRepository};
use crate::services::storage::StorageService;
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct StudentService {
    students: Arc<dyn StudentRepository>,
    files: Arc<dyn FileRepository>,
    storage: Arc<dyn StorageService>,
}

impl StudentService {
    pub fn new(
        students: Arc<dyn StudentRepository>,
        files: Arc<dyn FileRepository>,
        storage: Arc<dyn StorageService>,
    ) -> Self {
        Self {
            students,
            files,
            storage,
        }
    }

    pub async fn list(&self) -> Result<Vec<Student>, AppError> {
        self.students.list().await.map_err(|e| {
            error!("Error fetching students: {}", e);
            AppError::Internal(messages::FETCH_STUDENTS_FAILED.to_string())
        })
    }

    pub async fn create(&self, student: NewStudent) -> Result<Student, AppError> {
        match self.students.insert(&student).await {
            Ok(created) => {
                info!("🎓 Student {} registered (id {})", created.student_code, created.id);
                Ok(created)
            }
            Err(DataApiError::UniqueViolation(detail)) => {
                warn!("Duplicate student code {}: {}", student.student_code, detail);
                Err(AppError::Conflict(messages::DUPLICATE_CODE.to_string()))
            }
            Err(e) => {
                error!("Error adding student: {}", e);
                Err(AppError::Internal(messages::CREATE_STUDENT_FAILED.to_string()))
            }
        }
    }

    pub async fn update(&self, id: i64, student: NewStudent) -> Result<Student, AppError> {
        match self.students.update(id, &student).await {
            Ok(updated) => Ok(updated),
            Err(DataApiError::UniqueViolation(detail)) => {
                warn!("Duplicate student code {} on update of {}: {}", student.student_code, id, detail);
                Err(AppError::Conflict(messages::DUPLICATE_CODE.to_string()))
            }
            Err(DataApiError::NotFound) => {
                Err(AppError::NotFound(messages::STUDENT_NOT_FOUND.to_string()))
            }
            Err(e) => {
                error!("Error updating student {}: {}", id, e);
                Err(AppError::Internal(messages::UPDATE_STUDENT_FAILED.to_string()))
            }
        }
    }

    /// Removes the student's blobs (best effort), then its file rows, then
    /// the student row. File rows go first so the store needs no cascade.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.delete_cascade(id).await.map_err(|e| {
            error!("Error deleting student {}: {}", id, e);
            AppError::Internal(messages::DELETE_STUDENT_FAILED.to_string())
        })
    }

    async fn delete_cascade(&self, id: i64) -> Result<(), DataApiError> {
        let files = self.files.list_for_student(id).await?;

        if !files.is_empty() {
            let paths: Vec<String> = files.into_iter().map(|f| f.storage_path).collect();
            if let Err(e) = self.storage.delete_files(&paths).await {
                warn!(
                    "Error deleting {} blob(s) of student {} from storage: {:?}",
                    paths.len(),
                    id,
                    e
                );
            }
        }

        self.files.delete_for_student(id).await?;
        self.students.delete(id).await?;

        info!("🗑️  Student {} deleted", id);
        Ok(())
    }
}
