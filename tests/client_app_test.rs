mod common;

use common::{TestApp, setup_app};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use student_records::client::api::{FileUpload, HttpApiClient, StudentsApi};
use student_records::client::app::ClientApp;
use student_records::client::session::{Credentials, MemorySessionStore, SessionStore};
use student_records::client::state::FormField;
use student_records::messages;

fn credentials() -> Credentials {
    Credentials {
        email: "secretaria@escola.example".to_string(),
        password: "segredo".to_string(),
    }
}

async fn serve(app: &TestApp) -> HttpApiClient {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app.router.clone();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    HttpApiClient::new(&format!("http://{}", addr)).unwrap()
}

async fn logged_in_client(app: &TestApp) -> ClientApp<HttpApiClient> {
    let api = serve(app).await;
    let mut client = ClientApp::new(api, credentials(), Arc::new(MemorySessionStore::default()));
    assert!(client.login("secretaria@escola.example", "segredo"));
    client
}

async fn add_student(client: &mut ClientApp<HttpApiClient>, code: &str, name: &str, birth: &str) -> bool {
    client.open_create_form();
    client.set_field(FormField::StudentCode, code);
    client.set_field(FormField::FullName, name);
    client.set_field(FormField::BirthDate, birth);
    client.submit_form().await
}

#[tokio::test]
async fn test_login_gate() {
    let app = setup_app();
    let api = serve(&app).await;
    let session = Arc::new(MemorySessionStore::default());
    let mut client = ClientApp::new(api, credentials(), session.clone());

    client.load_students().await;
    assert_eq!(client.state().alert.as_deref(), Some(messages::LOGIN_REQUIRED));
    assert!(client.state().students.is_empty());

    assert!(!client.login("secretaria@escola.example", "errada"));
    assert_eq!(client.state().login_error.as_deref(), Some(messages::INVALID_CREDENTIALS));
    assert!(!session.is_authenticated());

    assert!(client.login("secretaria@escola.example", "segredo"));
    assert!(client.state().authenticated);
    assert!(session.is_authenticated());

    client.logout();
    assert!(!client.state().authenticated);
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_persisted_session_skips_login() {
    let app = setup_app();
    let api = serve(&app).await;
    let session = Arc::new(MemorySessionStore::default());
    session.set_authenticated(true).unwrap();

    let client = ClientApp::new(api, credentials(), session);
    assert!(client.state().authenticated);
}

#[tokio::test]
async fn test_create_refetches_and_filters() {
    let app = setup_app();
    let mut client = logged_in_client(&app).await;

    assert!(add_student(&mut client, "2024001", "Ana Silva", "2010-05-01").await);
    assert!(add_student(&mut client, "2024002", "Bruno Lima", "2009-12-31").await);

    let state = client.state();
    assert_eq!(state.students.len(), 2);
    assert!(state.form.editing.is_none());
    assert!(!state.form.open);
    assert!(state.alert.is_none());

    client.search("  BRUNO ");
    let visible: Vec<&str> = client
        .state()
        .visible_students()
        .iter()
        .map(|s| s.full_name.as_str())
        .collect();
    assert_eq!(visible, vec!["Bruno Lima"]);

    client.search("2024");
    assert_eq!(client.state().visible_students().len(), 2);
}

#[tokio::test]
async fn test_duplicate_code_alerts_server_message() {
    let app = setup_app();
    let mut client = logged_in_client(&app).await;

    assert!(add_student(&mut client, "2024001", "Ana Silva", "2010-05-01").await);
    assert!(!add_student(&mut client, "2024001", "Outra Pessoa", "2011-01-01").await);

    assert_eq!(client.state().alert.as_deref(), Some(messages::DUPLICATE_CODE));
    // The form stays open with what was typed
    assert!(client.state().form.open);
    assert_eq!(client.state().form.full_name, "Outra Pessoa");
    assert_eq!(client.state().students.len(), 1);
}

#[tokio::test]
async fn test_edit_updates_selected_row() {
    let app = setup_app();
    let mut client = logged_in_client(&app).await;
    add_student(&mut client, "2024001", "Ana Silva", "2010-05-01").await;

    let ana = client.state().students[0].clone();
    client.select_student(ana.clone()).await;
    client.open_edit_form(ana.clone());
    assert_eq!(client.state().form.student_code, "2024001");

    client.set_field(FormField::StudentCode, "2024009");
    assert!(client.submit_form().await);

    assert_eq!(client.state().students[0].student_code, "2024009");
    let selected = client.state().selected_student.as_ref().unwrap();
    assert_eq!(selected.id, ana.id);
    assert_eq!(selected.student_code, "2024009");
}

#[tokio::test]
async fn test_upload_download_and_delete_documents() {
    let app = setup_app();
    let mut client = logged_in_client(&app).await;
    add_student(&mut client, "2024001", "Ana Silva", "2010-05-01").await;
    let ana = client.state().students[0].clone();

    // Uploading needs a selected student
    let upload = FileUpload {
        file_name: "boletim.pdf".to_string(),
        content_type: Some("application/pdf".to_string()),
        data: b"%PDF-1.4".to_vec(),
    };
    assert!(!client.upload_file(upload.clone()).await);

    client.select_student(ana.clone()).await;
    assert!(client.state().student_files.is_empty());

    assert!(client.upload_file(upload).await);
    assert!(!client.state().uploading);
    assert_eq!(client.state().student_files.len(), 1);
    let file = client.state().student_files[0].clone();
    assert_eq!(file.original_name, "boletim.pdf");

    let url = client.download_url(file.id).await.unwrap();
    assert!(url.contains(&file.storage_path));

    assert!(client.delete_file(file.id).await);
    assert!(client.state().student_files.is_empty());

    assert!(client.download_url(file.id).await.is_none());
    assert_eq!(client.state().alert.as_deref(), Some(messages::FILE_LINK_FAILED));
}

#[tokio::test]
async fn test_delete_student_clears_selection() {
    let app = setup_app();
    let mut client = logged_in_client(&app).await;
    add_student(&mut client, "2024001", "Ana Silva", "2010-05-01").await;
    let ana = client.state().students[0].clone();

    client.select_student(ana.clone()).await;
    client
        .upload_file(FileUpload {
            file_name: "rg.png".to_string(),
            content_type: None,
            data: vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A],
        })
        .await;
    assert_eq!(client.state().student_files[0].mime_type, "image/png");

    assert!(client.delete_student(ana.id).await);
    assert!(client.state().selected_student.is_none());
    assert!(client.state().student_files.is_empty());
    assert!(client.state().students.is_empty());
    assert!(app.storage.keys().is_empty());
}

#[tokio::test]
async fn test_load_failure_raises_alert() {
    let app = setup_app();
    let mut client = logged_in_client(&app).await;
    app.data.fail_reads.store(true, Ordering::SeqCst);

    client.load_students().await;
    assert_eq!(client.state().alert.as_deref(), Some(messages::FETCH_STUDENTS_FAILED));
    assert!(!client.state().loading);

    client.dispatch(student_records::client::state::Action::AlertDismissed);
    assert!(client.state().alert.is_none());
}

#[tokio::test]
async fn test_http_client_reports_server_error_body() {
    let app = setup_app();
    let api = serve(&app).await;

    let err = api.update_student(31337, &Default::default()).await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.server_message(), Some(messages::REQUIRED_FIELDS));
}
