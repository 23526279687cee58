//! Notification backend selection, shared by the settings and notifier crates.

use serde::{Deserialize, Serialize};

/// Which OS facility displays notifications.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotifierBackend {
    /// `osascript` on macOS, `notify-send` everywhere else.
    #[default]
    Auto,
    Osascript,
    NotifySend,
}

impl NotifierBackend {
    /// Resolve `Auto` for the current platform.
    pub fn resolve(self) -> Self {
        match self {
            NotifierBackend::Auto if cfg!(target_os = "macos") => NotifierBackend::Osascript,
            NotifierBackend::Auto => NotifierBackend::NotifySend,
            other => other,
        }
    }
}
