//! Desktop notifications for host session events.
//!
//! Notified events: session.idle / session.error / permission.asked

pub mod notifier;
pub mod plugin;

pub use notifier::{CommandNotifier, Notifier, NotifyFuture};
pub use ocp_types::NotifierBackend;
pub use plugin::{NotificationPlugin, message_for};
