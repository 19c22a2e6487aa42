use crate::infrastructure::supabase::{DataApiError, SupabaseClient, eq};
use crate::models::{NewStudent, NewStudentFile, Student, StudentFile};
use async_trait::async_trait;

pub const STUDENTS_TABLE: &str = "students";
pub const STUDENT_FILES_TABLE: &str = "student_files";

#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// All students ordered by full name ascending.
    async fn list(&self) -> Result<Vec<Student>, DataApiError>;

    /// Fails with `UniqueViolation` when the code is taken.
    async fn insert(&self, student: &NewStudent) -> Result<Student, DataApiError>;

    /// Fails with `NotFound` when no row has this id.
    async fn update(&self, id: i64, student: &NewStudent) -> Result<Student, DataApiError>;

    /// Deleting a missing id is not an error.
    async fn delete(&self, id: i64) -> Result<(), DataApiError>;
}

#[async_trait]
pub trait FileRepository: Send + Sync {
    /// Files of one student, most recent upload first.
    async fn list_for_student(&self, student_id: i64) -> Result<Vec<StudentFile>, DataApiError>;

    async fn find(&self, id: i64) -> Result<StudentFile, DataApiError>;

    async fn insert(&self, file: &NewStudentFile) -> Result<StudentFile, DataApiError>;

    async fn delete(&self, id: i64) -> Result<(), DataApiError>;

    async fn delete_for_student(&self, student_id: i64) -> Result<(), DataApiError>;
}

pub struct PostgrestStudentRepository {
    client: SupabaseClient,
}

impl PostgrestStudentRepository {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StudentRepository for PostgrestStudentRepository {
    async fn list(&self) -> Result<Vec<Student>, DataApiError> {
        self.client
            .select(
                STUDENTS_TABLE,
                &[
                    ("select", "*".to_string()),
                    ("order", "full_name.asc".to_string()),
                ],
            )
            .await
    }

    async fn insert(&self, student: &NewStudent) -> Result<Student, DataApiError> {
        self.client.insert(STUDENTS_TABLE, student).await
    }

    async fn update(&self, id: i64, student: &NewStudent) -> Result<Student, DataApiError> {
        let rows: Vec<Student> = self
            .client
            .update(STUDENTS_TABLE, &[("id", eq(id))], student)
            .await?;
        rows.into_iter().next().ok_or(DataApiError::NotFound)
    }

    async fn delete(&self, id: i64) -> Result<(), DataApiError> {
        self.client.delete(STUDENTS_TABLE, &[("id", eq(id))]).await
    }
}

pub struct PostgrestFileRepository {
    client: SupabaseClient,
}

impl PostgrestFileRepository {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FileRepository for PostgrestFileRepository {
    async fn list_for_student(&self, student_id: i64) -> Result<Vec<StudentFile>, DataApiError> {
        self.client
            .select(
                STUDENT_FILES_TABLE,
                &[
                    ("select", "*".to_string()),
                    ("student_id", eq(student_id)),
                    ("order", "upload_date.desc".to_string()),
                ],
            )
            .await
    }

    async fn find(&self, id: i64) -> Result<StudentFile, DataApiError> {
        let rows: Vec<StudentFile> = self
            .client
            .select(
                STUDENT_FILES_TABLE,
                &[("select", "*".to_string()), ("id", eq(id))],
            )
            .await?;
        rows.into_iter().next().ok_or(DataApiError::NotFound)
    }

    async fn insert(&self, file: &NewStudentFile) -> Result<StudentFile, DataApiError> {
        self.client.insert(STUDENT_FILES_TABLE, file).await
    }

    async fn delete(&self, id: i64) -> Result<(), DataApiError> {
        self.client.delete(STUDENT_FILES_TABLE, &[("id", eq(id))]).await
    }

    async fn delete_for_student(&self, student_id: i64) -> Result<(), DataApiError> {
        self.client
            .delete(STUDENT_FILES_TABLE, &[("student_id", eq(student_id))])
            .await
    }
}
