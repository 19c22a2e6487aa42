use crate::client::api::{FileUpload, StudentsApi};
use crate::client::session::{Credentials, SessionStore};
use crate::client::state::{Action, FormField, LoginForm, ViewState};
use crate::messages;
use crate::models::Student;
use std::sync::Arc;
use tracing::{error, warn};

/// Runs user intents against the API and feeds the outcome into the view
/// state. Successful mutations are followed by a re-fetch, never by a local
/// patch of the lists.
pub struct ClientApp<A> {
    api: A,
    credentials: Credentials,
    session: Arc<dyn SessionStore>,
    state: ViewState,
}

impl<A: StudentsApi> ClientApp<A> {
    pub fn new(api: A, credentials: Credentials, session: Arc<dyn SessionStore>) -> Self {
        let state = if session.is_authenticated() {
            ViewState::authenticated()
        } else {
            ViewState::default()
        };
        Self {
            api,
            credentials,
            session,
            state,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn dispatch(&mut self, action: Action) {
        self.state.apply(action);
    }

    fn alert(&mut self, message: impl Into<String>) {
        self.dispatch(Action::AlertRaised(message.into()));
    }

    fn ensure_authenticated(&mut self) -> bool {
        if !self.state.authenticated {
            self.alert(messages::LOGIN_REQUIRED);
        }
        self.state.authenticated
    }

    pub fn login(&mut self, email: &str, password: &str) -> bool {
        self.dispatch(Action::LoginFormChanged(LoginForm {
            email: email.to_string(),
            password: password.to_string(),
        }));

        if !self.credentials.accepts(email, password) {
            self.dispatch(Action::LoginRejected);
            return false;
        }
        if let Err(e) = self.session.set_authenticated(true) {
            warn!("Could not persist login: {}", e);
        }
        self.dispatch(Action::LoginSucceeded);
        true
    }

    pub fn logout(&mut self) {
        if let Err(e) = self.session.set_authenticated(false) {
            warn!("Could not clear login: {}", e);
        }
        self.dispatch(Action::LoggedOut);
    }

    pub async fn load_students(&mut self) {
        if !self.ensure_authenticated() {
            return;
        }
        match self.api.list_students().await {
            Ok(students) => self.dispatch(Action::StudentsLoaded(students)),
            Err(e) => {
                error!("Error fetching students: {}", e);
                self.dispatch(Action::StudentsLoadFailed);
                self.alert(messages::FETCH_STUDENTS_FAILED);
            }
        }
    }

    pub fn search(&mut self, term: &str) {
        self.dispatch(Action::SearchChanged(term.to_string()));
    }

    pub async fn select_student(&mut self, student: Student) {
        let id = student.id;
        self.dispatch(Action::StudentSelected(student));
        self.load_files(id).await;
    }

    pub fn clear_selection(&mut self) {
        self.dispatch(Action::SelectionCleared);
    }

    pub async fn load_files(&mut self, student_id: i64) {
        if !self.ensure_authenticated() {
            return;
        }
        match self.api.list_files(student_id).await {
            Ok(files) => self.dispatch(Action::FilesLoaded { student_id, files }),
            Err(e) => {
                error!("Error fetching files of student {}: {}", student_id, e);
                self.alert(messages::FETCH_FILES_FAILED);
            }
        }
    }

    pub fn open_create_form(&mut self) {
        self.dispatch(Action::CreateFormOpened);
    }

    pub fn open_edit_form(&mut self, student: Student) {
        self.dispatch(Action::EditFormOpened(student));
    }

    pub fn set_field(&mut self, field: FormField, value: &str) {
        self.dispatch(Action::FormFieldChanged(field, value.to_string()));
    }

    pub fn close_form(&mut self) {
        self.dispatch(Action::FormClosed);
    }

    /// Creates or updates depending on how the form was opened.
    pub async fn submit_form(&mut self) -> bool {
        if !self.ensure_authenticated() {
            return false;
        }
        let payload = self.state.form.payload();
        let result = match self.state.form.editing {
            Some(id) => self.api.update_student(id, &payload).await,
            None => self.api.create_student(&payload).await,
        };

        match result {
            Ok(_) => {
                self.dispatch(Action::StudentSaved);
                self.load_students().await;
                true
            }
            Err(e) => {
                error!("Error processing student: {}", e);
                let message = e
                    .server_message()
                    .unwrap_or(messages::PROCESS_STUDENT_FAILED)
                    .to_string();
                self.alert(message);
                false
            }
        }
    }

    pub async fn delete_student(&mut self, id: i64) -> bool {
        if !self.ensure_authenticated() {
            return false;
        }
        match self.api.delete_student(id).await {
            Ok(()) => {
                self.dispatch(Action::StudentDeleted(id));
                self.load_students().await;
                true
            }
            Err(e) => {
                error!("Error deleting student {}: {}", id, e);
                self.alert(messages::DELETE_STUDENT_FAILED);
                false
            }
        }
    }

    /// Uploads to the selected student and refreshes its file list.
    pub async fn upload_file(&mut self, upload: FileUpload) -> bool {
        if !self.ensure_authenticated() {
            return false;
        }
        let Some(student_id) = self.state.selected_student.as_ref().map(|s| s.id) else {
            return false;
        };

        self.dispatch(Action::UploadStarted);
        let result = self.api.upload_file(student_id, upload).await;
        let uploaded = match result {
            Ok(_) => {
                self.load_files(student_id).await;
                true
            }
            Err(e) => {
                error!("Error uploading file: {}", e);
                self.alert(messages::UPLOAD_FILE_FAILED);
                false
            }
        };
        self.dispatch(Action::UploadFinished);
        uploaded
    }

    pub async fn download_url(&mut self, file_id: i64) -> Option<String> {
        if !self.ensure_authenticated() {
            return None;
        }
        match self.api.file_url(file_id).await {
            Ok(url) if !url.is_empty() => Some(url),
            Ok(_) => {
                self.alert(messages::FILE_LINK_FAILED);
                None
            }
            Err(e) => {
                error!("Error downloading file {}: {}", file_id, e);
                self.alert(messages::FILE_LINK_FAILED);
                None
            }
        }
    }

    pub async fn delete_file(&mut self, file_id: i64) -> bool {
        if !self.ensure_authenticated() {
            return false;
        }
        match self.api.delete_file(file_id).await {
            Ok(()) => {
                if let Some(student_id) = self.state.selected_student.as_ref().map(|s| s.id) {
                    self.load_files(student_id).await;
                }
                true
            }
            Err(e) => {
                error!("Error deleting file {}: {}", file_id, e);
                self.alert(messages::DELETE_FILE_FAILED);
                false
            }
        }
    }
}
