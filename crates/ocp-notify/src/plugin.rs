//! Notification plugin — maps session lifecycle events to desktop notifications.

use crate::notifier::Notifier;
use ocp_types::{Event, EventHandler, HandlerFuture, PERMISSION_ASKED, PluginError};
use std::sync::Arc;

pub const SESSION_COMPLETED_MESSAGE: &str = "Session completed";
pub const SESSION_ERROR_MESSAGE: &str = "Session error";
pub const PERMISSION_ASKED_MESSAGE: &str = "Permission asked";

/// The notification message for an event, if it should notify at all.
///
/// `permission.asked` is matched on its type alone: its properties are not
/// part of the host's published schema and may not validate.
pub fn message_for(event: &Event) -> Option<&'static str> {
    match event {
        Event::SessionIdle => Some(SESSION_COMPLETED_MESSAGE),
        Event::SessionError => Some(SESSION_ERROR_MESSAGE),
        other if other.event_type() == Some(PERMISSION_ASKED) => Some(PERMISSION_ASKED_MESSAGE),
        _ => None,
    }
}

/// Stateless plugin that shows one notification per matching event.
pub struct NotificationPlugin {
    notifier: Arc<dyn Notifier>,
    title: String,
}

impl NotificationPlugin {
    pub fn new(notifier: Arc<dyn Notifier>, title: impl Into<String>) -> Self {
        Self {
            notifier,
            title: title.into(),
        }
    }

    async fn dispatch(&self, event: &Event) -> Result<(), PluginError> {
        let Some(message) = message_for(event) else {
            return Ok(());
        };
        self.notifier.notify(&self.title, message).await?;
        tracing::info!("Notified: {message}");
        Ok(())
    }
}

impl EventHandler for NotificationPlugin {
    fn name(&self) -> &str {
        "notification"
    }

    fn handle<'a>(&'a self, event: &'a Event) -> HandlerFuture<'a> {
        Box::pin(self.dispatch(event))
    }
}
