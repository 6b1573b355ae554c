//! Session context service
//!
//! The session (who is logged in, their token and role) is an explicit
//! TOML file under the base directory instead of ambient global state.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::error::malformed;
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::Session;
use crate::infrastructure::traits::FileSystem;

/// Persists and loads the current session.
pub struct SessionService {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl SessionService {
    pub fn new(fs: Arc<dyn FileSystem>, path: PathBuf) -> Self {
        Self { fs, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current session, `None` if nobody is logged in.
    #[instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> ApplicationResult<Option<Session>> {
        if !self.fs.exists(&self.path) {
            debug!("no session file");
            return Ok(None);
        }
        let content = self
            .fs
            .read_to_string(&self.path)
            .with_path_context("read session", &self.path)?;
        let session: Session = toml::from_str(&content).map_err(malformed("session", &self.path))?;
        Ok(Some(session))
    }

    /// Current session, or an error telling the user how to create one.
    pub fn require(&self) -> ApplicationResult<Session> {
        self.load()?
            .ok_or_else(|| ApplicationError::NoSession(self.path.clone()))
    }

    #[instrument(level = "debug", skip(self, session), fields(user = %session.user_id))]
    pub fn save(&self, session: &Session) -> ApplicationResult<()> {
        let content = toml::to_string_pretty(session).map_err(|e| ApplicationError::OperationFailed {
            context: "serialize session".into(),
            source: Box::new(e),
        })?;
        self.fs
            .ensure_parent(&self.path)
            .with_path_context("create session directory", &self.path)?;
        self.fs
            .write(&self.path, &content)
            .with_path_context("write session", &self.path)?;
        info!(user = %session.user_id, role = ?session.role, "session saved");
        Ok(())
    }

    /// Remove the session. Returns whether one existed.
    pub fn clear(&self) -> ApplicationResult<bool> {
        if !self.fs.exists(&self.path) {
            return Ok(false);
        }
        self.fs
            .remove_file(&self.path)
            .with_path_context("remove session", &self.path)?;
        info!("session cleared");
        Ok(true)
    }
}
