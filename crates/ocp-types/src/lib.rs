//! Event model, handler trait and error hierarchy shared by the ocp plugins.

pub mod error;
pub mod event;
pub mod handler;
pub mod notify;

pub use error::{ConfigError, ConfigFileError, NotifyError, PluginError};
pub use event::*;
pub use handler::{EventHandler, HandlerFuture};
pub use notify::NotifierBackend;
