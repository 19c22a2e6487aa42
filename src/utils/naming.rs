use chrono::Utc;
use rand::Rng;
use std::path::Path;

/// Root folder for scanned documents inside the bucket
pub const DOCUMENTS_PREFIX: &str = "documents";

/// Extension of the uploaded name including the dot, or empty.
/// `"notas.final.pdf"` gives `".pdf"`, `".bashrc"` gives `""`.
pub fn extension_of(original_name: &str) -> String {
    // Browsers on Windows may send the full client path
    let base = original_name.rsplit(['/', '\\']).next().unwrap_or(original_name);
    Path::new(base)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

pub fn stored_filename(original_name: &str, timestamp_millis: i64, suffix: u32) -> String {
    format!("{}-{}{}", timestamp_millis, suffix, extension_of(original_name))
}

/// `{millis}-{random below 1e9}{.ext}`
pub fn generate_stored_filename(original_name: &str) -> String {
    let suffix = rand::thread_rng().gen_range(0..1_000_000_000u32);
    stored_filename(original_name, Utc::now().timestamp_millis(), suffix)
}

pub fn storage_path(student_id: i64, stored_filename: &str) -> String {
    format!("{}/{}/{}", DOCUMENTS_PREFIX, student_id, stored_filename)
}

/// Declared content type when it parses, else sniffed from the bytes.
pub fn resolve_mime_type(declared: Option<&str>, data: &[u8]) -> String {
    if let Some(declared) = declared.map(str::trim).filter(|d| !d.is_empty()) {
        if let Ok(parsed) = declared.parse::<mime::Mime>() {
            return parsed.essence_str().to_string();
        }
    }
    infer::get(data)
        .map(|kind| kind.mime_type().to_string())
        .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.essence_str().to_string())
}
