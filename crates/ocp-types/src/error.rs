//! Error hierarchy for the ocp plugins.

use thiserror::Error;

/// Top-level error returned by an event handler.
///
/// Anything that reaches this type is fatal for the event being handled;
/// the host decides how to surface it.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("Config file error: {0}")]
    ConfigFile(#[from] ConfigFileError),

    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),
}

/// Errors from reading or writing the project's `opencode.json`.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize config document: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors from displaying a desktop notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' exited with {}: {stderr}", describe_exit(.code))]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {code}"),
        None => "a signal".to_string(),
    }
}

/// Errors from loading plugin settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file parse error at {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}
