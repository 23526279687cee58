//! TOML settings for the ocp plugins.
//!
//! Reads configuration from multiple sources with precedence:
//! CLI flags > env vars > settings file > defaults

use ocp_types::{ConfigError, NotifierBackend};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Title shown on every desktop notification.
pub const DEFAULT_NOTIFY_TITLE: &str = "opencode";

/// Name of the host configuration file, relative to the project directory.
pub const DEFAULT_CONFIG_FILE: &str = "opencode.json";

/// Resolved configuration for one bridge process.
#[derive(Debug, Clone)]
pub struct OcpConfig {
    pub project_dir: PathBuf,
    pub config_dir: PathBuf,
    pub notify: NotifyConfig,
    pub permissions: PermissionsConfig,
}

#[derive(Debug, Clone)]
pub struct NotifyConfig {
    pub enabled: bool,
    pub title: String,
    pub backend: NotifierBackend,
}

#[derive(Debug, Clone)]
pub struct PermissionsConfig {
    pub auto_allow: bool,
    pub config_file: String,
    /// Maximum number of remembered permission requests; `None` keeps all of them.
    pub history_limit: Option<usize>,
}

impl PermissionsConfig {
    /// Full path of the host configuration file for `project_dir`.
    pub fn config_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.config_file)
    }
}

/// Settings that can be read from a TOML config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsFile {
    #[serde(default)]
    pub notify: NotifySettings,
    #[serde(default)]
    pub permissions: PermissionsSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifySettings {
    pub enabled: Option<bool>,
    pub title: Option<String>,
    pub backend: Option<NotifierBackend>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermissionsSettings {
    pub auto_allow: Option<bool>,
    pub config_file: Option<String>,
    pub history_limit: Option<usize>,
}

/// CLI overrides that take highest precedence.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub project_dir: Option<PathBuf>,
    pub no_notify: bool,
    pub no_auto_allow: bool,
}

impl OcpConfig {
    /// Load configuration from all sources, applying precedence rules.
    ///
    /// Precedence (highest to lowest):
    /// 1. CLI flags
    /// 2. Environment variables
    /// 3. Settings file (~/.ocp/config.toml)
    /// 4. Defaults
    pub fn load(overrides: CliOverrides) -> Result<Self, ConfigError> {
        let config_dir = config_dir();
        let settings = load_settings_file(&settings_path(&config_dir));
        let env_title = std::env::var("OCP_NOTIFY_TITLE").ok();
        Self::resolve(settings, overrides, env_title, config_dir)
    }

    /// The settings file this configuration was read from.
    pub fn settings_path(&self) -> PathBuf {
        settings_path(&self.config_dir)
    }

    /// Merge already-loaded sources. Split out of [`OcpConfig::load`] so
    /// precedence can be tested without touching the process environment.
    pub fn resolve(
        settings: SettingsFile,
        overrides: CliOverrides,
        env_title: Option<String>,
        config_dir: PathBuf,
    ) -> Result<Self, ConfigError> {
        let project_dir = overrides
            .project_dir
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));

        let title = env_title
            .or(settings.notify.title)
            .unwrap_or_else(|| DEFAULT_NOTIFY_TITLE.to_string());

        let config_file = settings
            .permissions
            .config_file
            .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());
        if config_file.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "permissions.config_file".into(),
                message: "must not be empty".into(),
            });
        }

        let history_limit = settings.permissions.history_limit;
        if history_limit == Some(0) {
            return Err(ConfigError::InvalidValue {
                key: "permissions.history_limit".into(),
                message: "must be at least 1 (omit it to keep every request)".into(),
            });
        }

        Ok(OcpConfig {
            project_dir,
            config_dir,
            notify: NotifyConfig {
                enabled: !overrides.no_notify && settings.notify.enabled.unwrap_or(true),
                title,
                backend: settings.notify.backend.unwrap_or_default(),
            },
            permissions: PermissionsConfig {
                auto_allow: !overrides.no_auto_allow
                    && settings.permissions.auto_allow.unwrap_or(true),
                config_file,
                history_limit,
            },
        })
    }
}

/// Get the ocp config directory path (~/.ocp/).
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("OCP_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".ocp")
}

fn settings_path(config_dir: &Path) -> PathBuf {
    config_dir.join("config.toml")
}

/// Parse the contents of a TOML settings file.
pub fn parse_settings(content: &str, path: &Path) -> Result<SettingsFile, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Load and parse a TOML settings file, returning defaults on any error.
fn load_settings_file(path: &Path) -> SettingsFile {
    match std::fs::read_to_string(path) {
        Ok(content) => parse_settings(&content, path).unwrap_or_else(|e| {
            tracing::warn!("{e}");
            SettingsFile::default()
        }),
        Err(_) => SettingsFile::default(),
    }
}
