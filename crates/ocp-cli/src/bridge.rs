//! Event pump: one JSON event per line, delivered to every handler in order.

use anyhow::{Context, Result};
use ocp_types::{Event, EventHandler};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Counters for a finished event stream.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BridgeStats {
    pub events: usize,
    pub failed: usize,
    pub unreadable: usize,
}

/// Read events until EOF. A handler error is logged and the stream continues;
/// only a failure to read the stream itself ends the run early.
pub async fn run<R>(reader: R, handlers: &[Arc<dyn EventHandler>]) -> Result<BridgeStats>
where
    R: AsyncBufRead + Unpin,
{
    let mut stats = BridgeStats::default();
    let mut lines = reader.lines();

    while let Some(line) = lines
        .next_line()
        .await
        .context("Failed to read event stream")?
    {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let value: serde_json::Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Skipping line that is not JSON: {e}");
                stats.unreadable += 1;
                continue;
            }
        };

        let event = Event::from_value(&value);
        stats.events += 1;
        stats.failed += dispatch(&event, handlers).await;
    }

    Ok(stats)
}

/// Deliver one event to each handler, returning how many failed.
async fn dispatch(event: &Event, handlers: &[Arc<dyn EventHandler>]) -> usize {
    let mut failed = 0;
    for handler in handlers {
        if let Err(e) = handler.handle(event).await {
            tracing::error!(
                "Plugin '{}' failed on {} event: {}",
                handler.name(),
                event.event_type().unwrap_or("untyped"),
                e
            );
            failed += 1;
        }
    }
    failed
}
