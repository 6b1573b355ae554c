//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/pyramid/pyramid.toml`
//! 3. Explicit config file (`--config`)
//! 4. Environment variables: `PYRAMID_*` prefix, `__` between sections

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::DEFAULT_MAX_LEVEL;

/// Backend REST API settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL all endpoints hang off (e.g. `https://host/api`)
    pub base_url: String,
    /// Header carrying the session token
    pub token_header: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4000/api".into(),
            token_header: "x-token".into(),
            timeout_secs: 30,
        }
    }
}

/// Pyramid evaluation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LevelConfig {
    /// Deepest level evaluated (depth of the commission plan)
    pub max_level: u32,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            max_level: DEFAULT_MAX_LEVEL,
        }
    }
}

/// Raw settings for intermediate parsing: `None` means "not specified, inherit".
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub base_dir: Option<PathBuf>,
    pub api: RawApiConfig,
    pub levels: RawLevelConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawApiConfig {
    pub base_url: Option<String>,
    pub token_header: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawLevelConfig {
    pub max_level: Option<u32>,
}

/// Unified configuration for pyramid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// State directory, holds the session file (default: ~/.pyramid)
    pub base_dir: PathBuf,
    pub api: ApiConfig,
    pub levels: LevelConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_dir: dirs_default_base_dir(),
            api: ApiConfig::default(),
            levels: LevelConfig::default(),
        }
    }
}

/// Get the default base directory (~/.pyramid).
fn dirs_default_base_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".pyramid"))
        .unwrap_or_else(|| PathBuf::from("~/.pyramid"))
}

/// Get the XDG config directory for pyramid.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "pyramid").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("pyramid.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Session file location.
    pub fn session_path(&self) -> PathBuf {
        self.base_dir.join("session.toml")
    }

    /// Expand `~`, `$VAR` and `${VAR}` in base_dir.
    fn expand_paths(&mut self) {
        let raw = self.base_dir.to_string_lossy().into_owned();
        let expanded = shellexpand::full(&raw)
            .map(|s| s.into_owned())
            .unwrap_or(raw);
        self.base_dir = PathBuf::from(expanded);
    }

    /// Overlay wins for every field it specifies.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            base_dir: overlay
                .base_dir
                .clone()
                .unwrap_or_else(|| self.base_dir.clone()),
            api: ApiConfig {
                base_url: overlay
                    .api
                    .base_url
                    .clone()
                    .unwrap_or_else(|| self.api.base_url.clone()),
                token_header: overlay
                    .api
                    .token_header
                    .clone()
                    .unwrap_or_else(|| self.api.token_header.clone()),
                timeout_secs: overlay.api.timeout_secs.unwrap_or(self.api.timeout_secs),
            },
            levels: LevelConfig {
                max_level: overlay.levels.max_level.unwrap_or(self.levels.max_level),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Optional explicit config file; must exist if given
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/pyramid/pyramid.toml`
    /// 3. Explicit config file
    /// 4. Environment variables: `PYRAMID_*` (e.g. `PYRAMID_API__BASE_URL`)
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(path) = config_file {
            let raw = load_raw_settings(path)?;
            current = current.merge_with(&raw);
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();
        current.validate()?;

        Ok(current)
    }

    /// Apply PYRAMID_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("PYRAMID")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("base_dir") {
            settings.base_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("api.base_url") {
            settings.api.base_url = val;
        }
        if let Ok(val) = config.get_string("api.token_header") {
            settings.api.token_header = val;
        }
        if let Ok(val) = config.get_int("api.timeout_secs") {
            settings.api.timeout_secs = u64::try_from(val).map_err(|_| ApplicationError::Config {
                message: format!("PYRAMID_API__TIMEOUT_SECS must be positive, got {val}"),
            })?;
        }
        if let Ok(val) = config.get_int("levels.max_level") {
            settings.levels.max_level =
                u32::try_from(val).map_err(|_| ApplicationError::Config {
                    message: format!("PYRAMID_LEVELS__MAX_LEVEL out of range: {val}"),
                })?;
        }

        Ok(settings)
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if self.api.timeout_secs == 0 {
            return Err(ApplicationError::Config {
                message: "api.timeout_secs must be at least 1".into(),
            });
        }
        if self.levels.max_level == 0 {
            return Err(ApplicationError::Config {
                message: "levels.max_level must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# pyramid configuration
#
# Locations (by precedence, lowest to highest):
#   Global:   ~/.config/pyramid/pyramid.toml
#   Explicit: pyramid --config <file>
#   Env:      PYRAMID_* environment variables, e.g. PYRAMID_API__BASE_URL

# State directory (session file lives here)
# base_dir = "~/.pyramid"

[api]
# Base URL of the backend REST API
# base_url = "http://localhost:4000/api"

# Header carrying the session token
# token_header = "x-token"

# Per-request timeout in seconds (single attempt, no retries)
# timeout_secs = 30

[levels]
# Deepest pyramid level evaluated
# max_level = 12
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_defaults_when_created_then_match_commission_plan() {
        let settings = Settings::default();
        assert_eq!(settings.levels.max_level, 12);
        assert_eq!(settings.api.token_header, "x-token");
        assert!(settings.base_dir.to_string_lossy().contains(".pyramid"));
        assert!(settings.session_path().ends_with("session.toml"));
    }

    #[test]
    fn given_partial_overlay_when_merging_then_unspecified_fields_are_kept() {
        let base = Settings::default();
        let overlay: RawSettings = toml::from_str(
            r#"
[api]
base_url = "https://mlm.example.com/api"
"#,
        )
        .unwrap();

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.api.base_url, "https://mlm.example.com/api");
        assert_eq!(merged.api.token_header, base.api.token_header);
        assert_eq!(merged.api.timeout_secs, base.api.timeout_secs);
        assert_eq!(merged.levels, base.levels);
        assert_eq!(merged.base_dir, base.base_dir);
    }

    #[test]
    fn given_tilde_in_base_dir_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            base_dir: PathBuf::from("~/.pyramid"),
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        let expanded = settings.base_dir.to_string_lossy();
        assert!(expanded.starts_with(&home), "got {expanded}");
        assert!(!expanded.contains('~'));
    }

    #[test]
    fn given_zero_max_level_when_validating_then_errors() {
        let mut settings = Settings::default();
        settings.levels.max_level = 0;
        assert!(matches!(
            settings.validate(),
            Err(ApplicationError::Config { .. })
        ));
    }

    #[test]
    fn given_settings_when_serializing_then_template_keys_match() {
        let toml = Settings::default().to_toml().unwrap();
        for key in ["base_url", "token_header", "timeout_secs", "max_level"] {
            assert!(toml.contains(key), "missing {key}");
            assert!(Settings::template().contains(key), "template missing {key}");
        }
    }
}
