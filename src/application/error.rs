//! Application-level errors (wraps domain errors)

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::DomainError;
use crate::infrastructure::traits::ApiError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("no session: run `pyramid session set --user <ID>` first ({0})")]
    NoSession(PathBuf),

    #[error("malformed {what} in {path}: {source}")]
    Malformed {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    ///
    /// # Example
    /// ```ignore
    /// fs.read_to_string(&path).with_path_context("read snapshot", &path)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{}: {}", action, path.display()),
            source: Box::new(e),
        })
    }
}

/// Attach the offending file to a parse error.
pub(crate) fn malformed<'a, E>(
    what: &'static str,
    path: &'a Path,
) -> impl FnOnce(E) -> ApplicationError + 'a
where
    E: std::error::Error + Send + Sync + 'static,
{
    move |e| ApplicationError::Malformed {
        what,
        path: path.to_path_buf(),
        source: Box::new(e),
    }
}
