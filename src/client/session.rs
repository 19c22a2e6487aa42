//! Login gate for the client.
//!
//! This is a local placeholder check, not access control: the server does
//! not authenticate requests. Replace it with a real session mechanism
//! before exposing the API.

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn accepts(&self, email: &str, password: &str) -> bool {
        self.email.eq_ignore_ascii_case(email.trim()) && self.password == password
    }
}

/// Where the "logged in" flag survives between runs.
pub trait SessionStore: Send + Sync {
    fn is_authenticated(&self) -> bool;
    fn set_authenticated(&self, authenticated: bool) -> io::Result<()>;
}

/// Keeps the flag as a marker file.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionStore for FileSessionStore {
    fn is_authenticated(&self) -> bool {
        std::fs::read_to_string(&self.path)
            .map(|v| v.trim() == "true")
            .unwrap_or(false)
    }

    fn set_authenticated(&self, authenticated: bool) -> io::Result<()> {
        if authenticated {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&self.path, "true")
        } else {
            match std::fs::remove_file(&self.path) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
                _ => Ok(()),
            }
        }
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    flag: AtomicBool,
}

impl SessionStore for MemorySessionStore {
    fn is_authenticated(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    fn set_authenticated(&self, authenticated: bool) -> io::Result<()> {
        self.flag.store(authenticated, Ordering::SeqCst);
        Ok(())
    }
}
