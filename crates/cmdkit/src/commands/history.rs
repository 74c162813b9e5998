//! `history` command - show previously executed lines

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::context::HostContext;
use crate::history::HistoryLog;
use crate::registry::Handler;

/// Prints the execution history, oldest first.
///
/// The invocation itself is recorded before dispatch, so it appears as the
/// final entry of its own listing.
pub struct History {
    history: Arc<Mutex<HistoryLog>>,
}

impl History {
    /// Create the command over the router's history log.
    pub fn new(history: Arc<Mutex<HistoryLog>>) -> Self {
        Self { history }
    }
}

#[async_trait]
impl Handler for History {
    async fn run(
        &self,
        _args: &[String],
        _ctx: &mut HostContext,
    ) -> anyhow::Result<Option<String>> {
        let history = self.history.lock().expect("history poisoned");
        if history.is_empty() {
            return Ok(Some("history is empty".to_string()));
        }
        let lines: Vec<String> = history
            .iter()
            .enumerate()
            .map(|(i, line)| format!("{:>4}  {}", i + 1, line))
            .collect();
        Ok(Some(lines.join("\n")))
    }
}
