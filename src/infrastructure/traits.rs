//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with in-memory implementations.

use std::io;
use std::path::Path;

use thiserror::Error;

use crate::domain::{Commission, PyramidResponse, Session};

/// Filesystem abstraction for snapshots and the session file.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Remove a file.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()>;
}

/// Errors talking to the backend REST API.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid API configuration: {0}")]
    Config(String),

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("unexpected response from {url}: {message}")]
    Decode { url: String, message: String },
}

/// Backend REST API, as far as the pyramid screens use it.
pub trait PyramidApi: Send + Sync {
    /// `GET {base}/{endpoint}/{user_id}`, e.g. `usuarios/piramide/abc123`.
    fn fetch_pyramid(
        &self,
        endpoint: &str,
        user_id: &str,
        session: &Session,
    ) -> Result<PyramidResponse, ApiError>;

    /// `GET {base}/comisiones`: the commission plan.
    fn fetch_commissions(&self, session: &Session) -> Result<Vec<Commission>, ApiError>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn given_nested_path_when_ensure_parent_then_creates_directories() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("a/b/c.json");
        let fs = RealFileSystem;

        fs.ensure_parent(&target).unwrap();
        fs.write(&target, "{}").unwrap();

        assert!(fs.exists(&target));
        assert_eq!(fs.read_to_string(&target).unwrap(), "{}");
    }

    #[test]
    fn given_bare_file_name_when_ensure_parent_then_is_noop() {
        assert!(RealFileSystem
            .ensure_parent(Path::new("snapshot.json"))
            .is_ok());
    }
}
