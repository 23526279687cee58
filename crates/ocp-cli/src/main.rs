//! ocp — feeds opencode host events to the auto-allow and notification plugins.

mod bridge;

use anyhow::{Context, Result};
use clap::Parser;
use ocp_config::{CliOverrides, OcpConfig};
use ocp_notify::{CommandNotifier, NotificationPlugin};
use ocp_permissions::{AutoAllowPlugin, ConfigFileStore, PermissionHistory};
use ocp_types::EventHandler;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "ocp",
    version,
    about = "Reads newline-delimited host events on stdin and runs the ocp plugins"
)]
struct Cli {
    /// Project directory containing opencode.json (default: current directory)
    #[arg(long)]
    directory: Option<PathBuf>,

    /// Enable verbose/debug logging
    #[arg(long)]
    verbose: bool,

    /// Don't show desktop notifications
    #[arg(long)]
    no_notify: bool,

    /// Don't persist "always" permission replies
    #[arg(long)]
    no_auto_allow: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(io::stderr)
        .init();

    let config = OcpConfig::load(CliOverrides {
        project_dir: cli.directory,
        no_notify: cli.no_notify,
        no_auto_allow: cli.no_auto_allow,
    })
    .context("Failed to load settings")?;
    tracing::debug!(
        "Settings from {}, project {}",
        config.settings_path().display(),
        config.project_dir.display()
    );

    let handlers = build_handlers(&config);
    if handlers.is_empty() {
        tracing::warn!("All plugins are disabled; events will be ignored");
    }

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let stats = bridge::run(stdin, &handlers).await?;
    tracing::debug!(
        "Event stream closed: {} events, {} failed, {} unreadable lines",
        stats.events,
        stats.failed,
        stats.unreadable
    );
    Ok(())
}

fn build_handlers(config: &OcpConfig) -> Vec<Arc<dyn EventHandler>> {
    let mut handlers: Vec<Arc<dyn EventHandler>> = Vec::new();

    if config.permissions.auto_allow {
        let history = match config.permissions.history_limit {
            Some(limit) => PermissionHistory::with_limit(limit),
            None => PermissionHistory::new(),
        };
        let store = ConfigFileStore::new(config.permissions.config_path(&config.project_dir));
        handlers.push(Arc::new(AutoAllowPlugin::new(store, history)));
    }

    if config.notify.enabled {
        let notifier = Arc::new(CommandNotifier::new(config.notify.backend));
        handlers.push(Arc::new(NotificationPlugin::new(
            notifier,
            config.notify.title.clone(),
        )));
    }

    handlers
}
