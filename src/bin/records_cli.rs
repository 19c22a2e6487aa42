use clap::{Args, Parser, Subcommand};
use dotenvy::dotenv;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use student_records::client::ClientConfig;
use student_records::client::api::{FileUpload, HttpApiClient};
use student_records::client::app::ClientApp;
use student_records::client::session::FileSessionStore;
use student_records::client::state::FormField;
use student_records::models::Student;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Terminal client for the student records API", long_about = None)]
struct Cli {
    /// API base URL (overrides RECORDS_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Unlock the client on this machine
    Login { email: String, password: String },
    /// Lock the client again
    Logout,
    /// List students, optionally filtered by name or code
    List {
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Register a student
    Add(StudentFields),
    /// Change a student's fields
    Edit {
        id: i64,
        #[command(flatten)]
        fields: OptionalFields,
    },
    /// Delete a student and every attached document
    Delete {
        id: i64,
        #[arg(short, long)]
        yes: bool,
    },
    /// List a student's documents, newest first
    Files { student_id: i64 },
    /// Attach a document to a student
    Upload { student_id: i64, path: PathBuf },
    /// Print a temporary download link
    Url { file_id: i64 },
    /// Delete a document
    DeleteFile {
        file_id: i64,
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
struct StudentFields {
    #[arg(long)]
    code: String,
    #[arg(long)]
    name: String,
    /// YYYY-MM-DD
    #[arg(long)]
    birth: String,
}

#[derive(Args, Debug)]
struct OptionalFields {
    #[arg(long)]
    code: Option<String>,
    #[arg(long)]
    name: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    birth: Option<String>,
}

fn confirm(question: &str) -> io::Result<bool> {
    print!("{} [s/N] ", question);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "s" | "sim" | "y" | "yes"))
}

fn print_student(student: &Student) {
    println!(
        "{:>6}  {:<12}  {:<40}  {}",
        student.id, student.student_code, student.full_name, student.birth_date
    );
}

async fn find_student(app: &mut ClientApp<HttpApiClient>, id: i64) -> Option<Student> {
    app.load_students().await;
    app.state().students.iter().find(|s| s.id == id).cloned()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "student_records=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env();
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }

    let api = HttpApiClient::new(&config.api_url)?;
    let session = Arc::new(FileSessionStore::new(&config.session_file));
    let mut app = ClientApp::new(api, config.credentials.clone(), session);

    match cli.command {
        Command::Login { email, password } => {
            if app.login(&email, &password) {
                println!("Acesso liberado.");
            }
        }
        Command::Logout => {
            app.logout();
            println!("Sessão encerrada.");
        }
        Command::List { search } => {
            app.load_students().await;
            if let Some(term) = search {
                app.search(&term);
            }
            let visible = app.state().visible_students();
            if app.state().alert.is_none() && visible.is_empty() {
                println!("Nenhum aluno encontrado.");
            }
            for student in visible {
                print_student(student);
            }
        }
        Command::Add(fields) => {
            app.open_create_form();
            app.set_field(FormField::StudentCode, &fields.code);
            app.set_field(FormField::FullName, &fields.name);
            app.set_field(FormField::BirthDate, &fields.birth);
            if app.submit_form().await {
                println!("Aluno cadastrado.");
            }
        }
        Command::Edit { id, fields } => match find_student(&mut app, id).await {
            Some(student) => {
                app.open_edit_form(student);
                if let Some(code) = fields.code {
                    app.set_field(FormField::StudentCode, &code);
                }
                if let Some(name) = fields.name {
                    app.set_field(FormField::FullName, &name);
                }
                if let Some(birth) = fields.birth {
                    app.set_field(FormField::BirthDate, &birth);
                }
                if app.submit_form().await {
                    println!("Aluno atualizado.");
                }
            }
            None if app.state().alert.is_none() => {
                eprintln!("Aluno {} não encontrado.", id);
                std::process::exit(1);
            }
            None => {}
        },
        Command::Delete { id, yes } => {
            if yes || confirm("Tem certeza que deseja excluir este aluno e todos os seus documentos?")? {
                if app.delete_student(id).await {
                    println!("Aluno excluído.");
                }
            }
        }
        Command::Files { student_id } => {
            if let Some(student) = find_student(&mut app, student_id).await {
                print_student(&student);
                app.select_student(student).await;
                for file in &app.state().student_files {
                    println!(
                        "{:>6}  {}  {:<24}  {}",
                        file.id,
                        file.upload_date.format("%d/%m/%Y %H:%M"),
                        file.mime_type,
                        file.original_name
                    );
                }
            } else if app.state().alert.is_none() {
                eprintln!("Aluno {} não encontrado.", student_id);
                std::process::exit(1);
            }
        }
        Command::Upload { student_id, path } => {
            let data = tokio::fs::read(&path).await?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "documento".to_string());
            let content_type = infer::get(&data).map(|k| k.mime_type().to_string());

            if let Some(student) = find_student(&mut app, student_id).await {
                app.select_student(student).await;
                let upload = FileUpload {
                    file_name,
                    content_type,
                    data,
                };
                if app.upload_file(upload).await {
                    println!("Documento enviado.");
                }
            } else if app.state().alert.is_none() {
                eprintln!("Aluno {} não encontrado.", student_id);
                std::process::exit(1);
            }
        }
        Command::Url { file_id } => {
            if let Some(url) = app.download_url(file_id).await {
                println!("{}", url);
            }
        }
        Command::DeleteFile { file_id, yes } => {
            if yes || confirm("Tem certeza que deseja excluir este documento?")? {
                if app.delete_file(file_id).await {
                    println!("Documento excluído.");
                }
            }
        }
    }

    if let Some(alert) = &app.state().alert {
        eprintln!("{}", alert);
        std::process::exit(1);
    }
    if let Some(error) = &app.state().login_error {
        eprintln!("{}", error);
        std::process::exit(1);
    }
    Ok(())
}
