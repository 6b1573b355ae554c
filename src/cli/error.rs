//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::exitcode;
use crate::infrastructure::traits::ApiError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("{0}")]
    Usage(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::ApiSetup(_) => exitcode::CONFIG,
                InfraError::Application(app) => application_exit_code(app),
            },
        }
    }
}

fn application_exit_code(e: &ApplicationError) -> i32 {
    match e {
        ApplicationError::Domain(DomainError::Forbidden { .. })
        | ApplicationError::Domain(DomainError::AdminRequired(_)) => exitcode::NOPERM,
        ApplicationError::Domain(_) => exitcode::DATAERR,
        ApplicationError::Api(api) => match api {
            ApiError::Config(_) => exitcode::CONFIG,
            ApiError::Transport { .. } | ApiError::Status { .. } => exitcode::UNAVAILABLE,
            ApiError::Decode { .. } => exitcode::DATAERR,
        },
        ApplicationError::Config { .. } => exitcode::CONFIG,
        ApplicationError::NoSession(_) => exitcode::USAGE,
        ApplicationError::Malformed { .. } => exitcode::DATAERR,
        ApplicationError::OperationFailed { .. } => exitcode::IOERR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn given_forbidden_member_when_mapping_exit_code_then_noperm() {
        let err: CliError = ApplicationError::from(DomainError::Forbidden {
            requester: "a".into(),
            requested: "b".into(),
        })
        .into();
        assert_eq!(err.exit_code(), exitcode::NOPERM);
    }

    #[test]
    fn given_unreachable_backend_when_mapping_exit_code_then_unavailable() {
        let err: CliError = ApplicationError::from(ApiError::Status {
            url: "http://x".into(),
            status: 502,
        })
        .into();
        assert_eq!(err.exit_code(), exitcode::UNAVAILABLE);
    }

    #[test]
    fn given_missing_session_when_mapping_exit_code_then_usage() {
        let err: CliError = ApplicationError::NoSession(PathBuf::from("/tmp/s.toml")).into();
        assert_eq!(err.exit_code(), exitcode::USAGE);
        assert!(err.to_string().contains("session set"));
    }
}
