//! Event handler trait implemented by each plugin.

use crate::error::PluginError;
use crate::event::Event;
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by [`EventHandler::handle`].
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<(), PluginError>> + Send + 'a>>;

/// A plugin that reacts to host events.
///
/// Uses `Pin<Box<dyn Future>>` so handlers can be stored as `Arc<dyn EventHandler>`.
pub trait EventHandler: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Handle a single event. Events that don't apply must resolve to `Ok(())`.
    fn handle<'a>(&'a self, event: &'a Event) -> HandlerFuture<'a>;
}
