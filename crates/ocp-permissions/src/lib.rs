//! Persists "always allow" permission replies into the project's `opencode.json`.
//!
//! permission.asked → remembered in [`PermissionHistory`]
//! permission.replied (always) → merged into the config document and written back

pub mod document;
pub mod history;
pub mod plugin;
pub mod store;

pub use document::{
    ALLOW, CONFIG_SCHEMA_URL, ConfigDocument, GrantOutcome, PROTECTED_PERMISSION, PermissionRule,
    WILDCARD,
};
pub use history::PermissionHistory;
pub use plugin::AutoAllowPlugin;
pub use store::ConfigFileStore;
