//! Notifier backends — display a notification by spawning an OS command.

use ocp_types::{NotifierBackend, NotifyError};
use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

/// Boxed future returned by [`Notifier::notify`].
pub type NotifyFuture<'a> = Pin<Box<dyn Future<Output = Result<(), NotifyError>> + Send + 'a>>;

/// Something that can put a notification in front of the user.
pub trait Notifier: Send + Sync {
    fn notify<'a>(&'a self, title: &'a str, message: &'a str) -> NotifyFuture<'a>;
}

fn default_program(backend: NotifierBackend) -> &'static str {
    match backend.resolve() {
        NotifierBackend::Osascript => "osascript",
        _ => "notify-send",
    }
}

/// Notifier that runs `osascript` or `notify-send` and waits for it to exit.
#[derive(Debug, Clone)]
pub struct CommandNotifier {
    backend: NotifierBackend,
    program: String,
}

impl CommandNotifier {
    pub fn new(backend: NotifierBackend) -> Self {
        let backend = backend.resolve();
        Self {
            backend,
            program: default_program(backend).to_string(),
        }
    }

    /// Run a different executable (e.g. an absolute path) with the same arguments.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn backend(&self) -> NotifierBackend {
        self.backend
    }

    /// Command-line arguments for one notification.
    pub fn args(&self, title: &str, message: &str) -> Vec<String> {
        match self.backend {
            NotifierBackend::Osascript => vec![
                "-e".to_string(),
                format!(
                    "display notification \"{}\" with title \"{}\"",
                    escape_applescript(message),
                    escape_applescript(title)
                ),
            ],
            _ => vec![title.to_string(), message.to_string()],
        }
    }

    async fn run(&self, title: &str, message: &str) -> Result<(), NotifyError> {
        let output = tokio::process::Command::new(&self.program)
            .args(self.args(title, message))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| NotifyError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(NotifyError::Failed {
                program: self.program.clone(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        tracing::debug!("Displayed notification via {}: {}", self.program, message);
        Ok(())
    }
}

impl Notifier for CommandNotifier {
    fn notify<'a>(&'a self, title: &'a str, message: &'a str) -> NotifyFuture<'a> {
        Box::pin(self.run(title, message))
    }
}

/// Escape a string for use inside an AppleScript double-quoted literal.
fn escape_applescript(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
