//! User-facing (pt-BR) messages shared by the API and the client.

pub const REQUIRED_FIELDS: &str = "Todos os campos são obrigatórios";
pub const INVALID_BIRTH_DATE: &str = "Data de nascimento inválida";
pub const DUPLICATE_CODE: &str = "Código de aluno já cadastrado";
pub const STUDENT_NOT_FOUND: &str = "Aluno não encontrado";
pub const FETCH_STUDENTS_FAILED: &str = "Erro ao buscar alunos";
pub const CREATE_STUDENT_FAILED: &str = "Erro ao cadastrar aluno";
pub const UPDATE_STUDENT_FAILED: &str = "Erro ao atualizar aluno";
pub const DELETE_STUDENT_FAILED: &str = "Erro ao excluir aluno";

pub const FETCH_FILES_FAILED: &str = "Erro ao buscar arquivos";
pub const NO_FILE_SENT: &str = "Nenhum arquivo enviado";
pub const FILE_TOO_LARGE: &str = "Arquivo excede o tamanho máximo permitido";
pub const SAVE_FILE_FAILED: &str = "Erro ao salvar arquivo";
pub const FILE_NOT_FOUND: &str = "Arquivo não encontrado";
pub const DELETE_FILE_FAILED: &str = "Erro ao excluir arquivo";

// Client-side alerts
pub const PROCESS_STUDENT_FAILED: &str = "Erro ao processar aluno";
pub const UPLOAD_FILE_FAILED: &str = "Erro ao enviar arquivo";
pub const FILE_LINK_FAILED: &str = "Erro ao obter link do arquivo";
pub const INVALID_CREDENTIALS: &str = "Credenciais inválidas. Tente novamente.";
pub const LOGIN_REQUIRED: &str = "Acesso restrito ao sistema";
