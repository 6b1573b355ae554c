//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{PyramidService, SessionService};
use crate::config::Settings;
use crate::infrastructure::error::{InfraError, InfraResult};
use crate::infrastructure::http::HttpPyramidApi;
use crate::infrastructure::traits::{FileSystem, PyramidApi, RealFileSystem};

/// Container holding the settings and the I/O boundaries services are built from.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Backend REST API
    pub api: Arc<dyn PyramidApi>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> InfraResult<Self> {
        let api = HttpPyramidApi::new(&settings.api).map_err(InfraError::ApiSetup)?;
        Ok(Self::with_deps(
            settings,
            Arc::new(RealFileSystem),
            Arc::new(api),
        ))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>, api: Arc<dyn PyramidApi>) -> Self {
        let settings = Arc::new(settings);

        Self { settings, fs, api }
    }

    /// Pyramid service evaluating up to `max_level`, or the configured depth.
    pub fn pyramid_service(&self, max_level: Option<u32>) -> PyramidService {
        PyramidService::new(
            self.api.clone(),
            self.fs.clone(),
            max_level.unwrap_or(self.settings.levels.max_level),
        )
    }

    pub fn session_service(&self) -> SessionService {
        SessionService::new(self.fs.clone(), self.settings.session_path())
    }
}
