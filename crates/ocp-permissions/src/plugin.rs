//! Auto-allow plugin — turns "always" replies into persistent config entries.

use crate::document::GrantOutcome;
use crate::history::PermissionHistory;
use crate::store::ConfigFileStore;
use ocp_types::{
    Event, EventHandler, HandlerFuture, PermissionReply, PluginError, ReplyDecision,
};

/// Remembers permission requests and, when the user answers one with
/// "always", writes the granted commands into `opencode.json`.
pub struct AutoAllowPlugin {
    history: PermissionHistory,
    store: ConfigFileStore,
}

impl AutoAllowPlugin {
    pub fn new(store: ConfigFileStore, history: PermissionHistory) -> Self {
        Self { history, store }
    }

    pub fn history(&self) -> &PermissionHistory {
        &self.history
    }

    pub fn store(&self) -> &ConfigFileStore {
        &self.store
    }

    async fn on_event(&self, event: &Event) -> Result<(), PluginError> {
        match event {
            Event::PermissionAsked(request) => {
                tracing::debug!(
                    "Recorded permission request {} ({})",
                    request.id,
                    request.permission
                );
                self.history.record(request.clone());
                Ok(())
            }
            Event::PermissionReplied(reply) => self.on_reply(reply).await,
            _ => Ok(()),
        }
    }

    async fn on_reply(&self, reply: &PermissionReply) -> Result<(), PluginError> {
        if reply.reply != ReplyDecision::Always {
            return Ok(());
        }

        let Some(request) = self.history.find(&reply.request_id) else {
            tracing::debug!(
                "No recorded request for reply {}; not persisting",
                reply.request_id
            );
            return Ok(());
        };

        let mut doc = self.store.load().await?;
        let outcome = doc.grant_always(&request.permission, &request.always);
        self.store.save(&doc).await?;

        match outcome {
            GrantOutcome::Refused => tracing::info!(
                "'{}' is never auto-allowed; {} left unchanged",
                request.permission,
                self.store.path().display()
            ),
            _ => tracing::info!(
                "Always-allowed '{}' {:?} in {}",
                request.permission,
                request.always,
                self.store.path().display()
            ),
        }
        Ok(())
    }
}

impl EventHandler for AutoAllowPlugin {
    fn name(&self) -> &str {
        "auto-allow"
    }

    fn handle<'a>(&'a self, event: &'a Event) -> HandlerFuture<'a> {
        Box::pin(self.on_event(event))
    }
}
