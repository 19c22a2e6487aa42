//! View model of the records client.
//!
//! `ViewState` is only changed through [`ViewState::apply`]; the controller
//! in `client::app` turns user intents and API results into [`Action`]s.

use crate::client::filter::filter_students;
use crate::messages;
use crate::models::{Student, StudentFile, StudentPayload};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    StudentCode,
    FullName,
    BirthDate,
}

/// Create/edit modal. `editing` holds the id of the student being edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentForm {
    pub open: bool,
    pub editing: Option<i64>,
    pub student_code: String,
    pub full_name: String,
    pub birth_date: String,
}

impl StudentForm {
    pub fn payload(&self) -> StudentPayload {
        StudentPayload::new(&self.student_code, &self.full_name, &self.birth_date)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub authenticated: bool,
    pub login_form: LoginForm,
    pub login_error: Option<String>,
    pub students: Vec<Student>,
    pub selected_student: Option<Student>,
    pub student_files: Vec<StudentFile>,
    pub search_term: String,
    pub form: StudentForm,
    pub loading: bool,
    pub uploading: bool,
    pub alert: Option<String>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            authenticated: false,
            login_form: LoginForm::default(),
            login_error: None,
            students: Vec::new(),
            selected_student: None,
            student_files: Vec::new(),
            search_term: String::new(),
            form: StudentForm::default(),
            // The list is fetched on start
            loading: true,
            uploading: false,
            alert: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    LoginFormChanged(LoginForm),
    LoginSucceeded,
    LoginRejected,
    LoggedOut,
    StudentsLoaded(Vec<Student>),
    StudentsLoadFailed,
    SearchChanged(String),
    StudentSelected(Student),
    SelectionCleared,
    FilesLoaded { student_id: i64, files: Vec<StudentFile> },
    CreateFormOpened,
    EditFormOpened(Student),
    FormFieldChanged(FormField, String),
    FormClosed,
    StudentSaved,
    StudentDeleted(i64),
    UploadStarted,
    UploadFinished,
    AlertRaised(String),
    AlertDismissed,
}

impl ViewState {
    pub fn authenticated() -> Self {
        Self {
            authenticated: true,
            ..Self::default()
        }
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::LoginFormChanged(form) => self.login_form = form,
            Action::LoginSucceeded => {
                self.authenticated = true;
                self.login_error = None;
                self.login_form = LoginForm::default();
            }
            Action::LoginRejected => {
                self.login_error = Some(messages::INVALID_CREDENTIALS.to_string());
            }
            Action::LoggedOut => {
                // Nothing of the previous session stays on screen
                *self = Self::default();
            }
            Action::StudentsLoaded(students) => {
                self.students = students;
                self.loading = false;
                // Keep the selection in sync with the refreshed row
                if let Some(selected_id) = self.selected_student.as_ref().map(|s| s.id) {
                    self.selected_student =
                        self.students.iter().find(|s| s.id == selected_id).cloned();
                    if self.selected_student.is_none() {
                        self.student_files.clear();
                    }
                }
            }
            Action::StudentsLoadFailed => self.loading = false,
            Action::SearchChanged(term) => self.search_term = term,
            Action::StudentSelected(student) => {
                if self.selected_student.as_ref().map(|s| s.id) != Some(student.id) {
                    self.student_files.clear();
                }
                self.selected_student = Some(student);
            }
            Action::SelectionCleared => {
                self.selected_student = None;
                self.student_files.clear();
            }
            Action::FilesLoaded { student_id, files } => {
                // Late responses for a previous selection are dropped
                if self.selected_student.as_ref().map(|s| s.id) == Some(student_id) {
                    self.student_files = files;
                }
            }
            Action::CreateFormOpened => {
                self.form = StudentForm {
                    open: true,
                    ..StudentForm::default()
                };
            }
            Action::EditFormOpened(student) => {
                let payload = StudentPayload::from(&student);
                self.form = StudentForm {
                    open: true,
                    editing: Some(student.id),
                    student_code: payload.student_code.unwrap_or_default(),
                    full_name: payload.full_name.unwrap_or_default(),
                    birth_date: payload.birth_date.unwrap_or_default(),
                };
            }
            Action::FormFieldChanged(field, value) => match field {
                FormField::StudentCode => self.form.student_code = value,
                FormField::FullName => self.form.full_name = value,
                FormField::BirthDate => self.form.birth_date = value,
            },
            Action::FormClosed | Action::StudentSaved => self.form = StudentForm::default(),
            Action::StudentDeleted(id) => {
                if self.selected_student.as_ref().map(|s| s.id) == Some(id) {
                    self.selected_student = None;
                    self.student_files.clear();
                }
            }
            Action::UploadStarted => self.uploading = true,
            Action::UploadFinished => self.uploading = false,
            Action::AlertRaised(message) => self.alert = Some(message),
            Action::AlertDismissed => self.alert = None,
        }
    }

    /// Students matching the search box, in list order.
    pub fn visible_students(&self) -> Vec<&Student> {
        filter_students(&self.students, &self.search_term)
    }
}
