//! Command router
//!
//! Resolves one raw input line to a registered handler, invokes it, and
//! normalizes the result. Every submitted line is recorded in the history
//! log before dispatch, whether or not it resolves.

use std::sync::{Arc, Mutex};

use crate::context::HostContext;
use crate::history::HistoryLog;
use crate::registry::CommandRegistry;

/// Result of routing one input line.
///
/// This is a plain value in every case: an unknown command or a failing
/// handler is reported, never thrown, so one bad line can never take down
/// the console loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The handler ran. `None` is the "no output" sentinel and must render
    /// as nothing.
    Done(Option<String>),
    /// No command or alias matched the attempted name.
    NotFound(String),
    /// The handler returned an error; its message is preserved.
    Failed(String),
}

impl CommandOutcome {
    /// Text a console should print for this outcome, if any.
    pub fn render(&self) -> Option<String> {
        match self {
            Self::Done(output) => output.clone(),
            Self::NotFound(name) => Some(format!("command not found: {name}")),
            Self::Failed(message) => Some(format!("error: {message}")),
        }
    }

    /// Whether the command ran to completion.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Done(_))
    }
}

/// Router owning the history log and dispatching through a shared registry.
pub struct Router {
    registry: Arc<CommandRegistry>,
    // Shared with the `history` console command. std Mutex is fine: it is
    // never held across an await.
    history: Arc<Mutex<HistoryLog>>,
}

impl Router {
    /// Create a router over the given registry.
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self {
            registry,
            history: Arc::new(Mutex::new(HistoryLog::new())),
        }
    }

    /// The registry this router dispatches through.
    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// Shared handle to the history log.
    pub fn history(&self) -> Arc<Mutex<HistoryLog>> {
        Arc::clone(&self.history)
    }

    /// Execute one raw input line.
    ///
    /// The line is split on whitespace into a command token and arguments
    /// (no quoting; handlers that want quoted text parse it themselves),
    /// resolved through the registry including alias indirection, and the
    /// handler is awaited. The raw line is appended to history exactly once,
    /// before the handler runs.
    pub async fn execute(&self, line: &str, ctx: &mut HostContext) -> CommandOutcome {
        let line = line.trim();
        if line.is_empty() {
            // Empty lines are ignored upstream; never recorded.
            return CommandOutcome::Done(None);
        }

        self.history.lock().expect("history poisoned").push(line);

        let mut tokens = line.split_whitespace();
        let name = tokens.next().unwrap_or_default();
        let args: Vec<String> = tokens.map(str::to_string).collect();

        let Some(entry) = self.registry.resolve(name) else {
            tracing::debug!(command = %name, "command not found");
            return CommandOutcome::NotFound(name.to_string());
        };

        tracing::debug!(command = %entry.name, argc = args.len(), "dispatching");
        match entry.handler.run(&args, ctx).await {
            Ok(output) => CommandOutcome::Done(output),
            Err(err) => {
                tracing::debug!(command = %entry.name, error = %err, "handler failed");
                CommandOutcome::Failed(err.to_string())
            }
        }
    }

    /// Step backward through history from the navigation cursor.
    pub fn previous(&self) -> Option<String> {
        self.history
            .lock()
            .expect("history poisoned")
            .previous()
            .map(str::to_string)
    }

    /// Step forward through history from the navigation cursor.
    pub fn next(&self) -> Option<String> {
        self.history
            .lock()
            .expect("history poisoned")
            .next()
            .map(str::to_string)
    }

    /// Number of recorded history lines.
    pub fn history_len(&self) -> usize {
        self.history.lock().expect("history poisoned").len()
    }
}
