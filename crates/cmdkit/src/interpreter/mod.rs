//! Script interpreter
//!
//! Walks a parsed statement sequence top to bottom, expanding variables and
//! re-entering the command router for ordinary command lines. Scheduling is
//! single-threaded cooperative: every router call and `wait` is awaited
//! before the next statement runs, so script steps never interleave.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::future::BoxFuture;

use crate::context::{HostContext, OutputKind};
use crate::error::{Error, Result};
use crate::parser::{self, Statement};
use crate::router::{CommandOutcome, Router};
use crate::store::ScriptStore;
use crate::vars::VariableStore;

/// Upper bound for a single `wait`, mirroring the cap interactive consoles
/// put on user-controlled sleeps.
const MAX_WAIT_MS: u64 = 300_000;

/// Per-run interpreter state.
///
/// A fresh context is created for every script invocation; variables never
/// leak between independent runs of the same script.
#[derive(Debug, Default)]
pub struct ExecutionContext {
    /// Variable environment scoped to this run.
    pub vars: VariableStore,
    /// Ordered output lines emitted so far.
    pub output: Vec<String>,
    /// Index of the statement currently executing.
    pub cursor: usize,
}

impl ExecutionContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Result of one completed script run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Ordered output lines the run produced.
    pub output: Vec<String>,
    /// Whether a cooperative stop request halted the run early.
    pub stopped: bool,
}

/// Executes stored scripts by re-entering the command router.
///
/// Exactly one script runs at a time per engine. A second `run` while one
/// is in flight is rejected with [`Error::ScriptAlreadyRunning`] unless
/// nested invocation was enabled at build time, in which case a script's
/// own `run <other>` line re-enters the engine instead.
pub struct ScriptEngine {
    router: Arc<Router>,
    store: Arc<dyn ScriptStore>,
    depth: AtomicUsize,
    stop: AtomicBool,
    allow_nested: bool,
}

impl ScriptEngine {
    /// Name the engine is registered under in the host context's module map.
    pub const MODULE_NAME: &'static str = "scripts";

    /// Create an engine dispatching through `router` and loading scripts
    /// from `store`.
    pub fn new(router: Arc<Router>, store: Arc<dyn ScriptStore>, allow_nested: bool) -> Self {
        Self {
            router,
            store,
            depth: AtomicUsize::new(0),
            stop: AtomicBool::new(false),
            allow_nested,
        }
    }

    /// The script store this engine loads from.
    pub fn store(&self) -> &Arc<dyn ScriptStore> {
        &self.store
    }

    /// Whether a run is currently in flight.
    pub fn is_running(&self) -> bool {
        self.depth.load(Ordering::SeqCst) > 0
    }

    /// Ask the current run to stop.
    ///
    /// Cancellation is cooperative: the flag is checked between statements,
    /// never mid-statement, so an in-flight `wait` or awaited command
    /// completes first.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Load, parse, and execute the named script.
    ///
    /// Parse errors block the entire run; no statement executes and no
    /// output is produced. Output lines stream to the host sink as they are
    /// emitted and are also collected into the returned report.
    pub async fn run(&self, name: &str, ctx: &mut HostContext) -> Result<RunReport> {
        let _guard = self.enter()?;

        let script = self
            .store
            .get(name)
            .await
            .ok_or_else(|| Error::ScriptNotFound(name.to_string()))?;
        let statements = parser::parse(&script.content)?;

        tracing::debug!(script = %name, statements = statements.len(), "running script");

        let mut cx = ExecutionContext::new();
        self.run_block(&statements, &mut cx, ctx).await?;

        Ok(RunReport {
            output: cx.output,
            stopped: self.stop.load(Ordering::SeqCst),
        })
    }

    /// Claim the run slot, clearing any stale stop request on outermost entry.
    fn enter(&self) -> Result<RunGuard<'_>> {
        let previous = self.depth.fetch_add(1, Ordering::SeqCst);
        if previous > 0 && !self.allow_nested {
            self.depth.fetch_sub(1, Ordering::SeqCst);
            return Err(Error::ScriptAlreadyRunning);
        }
        if previous == 0 {
            self.stop.store(false, Ordering::SeqCst);
        }
        Ok(RunGuard { engine: self })
    }

    /// Execute one block of statements in order.
    ///
    /// Boxed because `if`/`for` bodies recurse.
    fn run_block<'a>(
        &'a self,
        statements: &'a [Statement],
        cx: &'a mut ExecutionContext,
        ctx: &'a mut HostContext,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            for statement in statements {
                if self.stop.load(Ordering::SeqCst) {
                    tracing::debug!("stop requested, halting run");
                    return Ok(());
                }
                cx.cursor += 1;

                match statement {
                    Statement::Comment { .. } => {}
                    Statement::Echo { text, .. } => {
                        let expanded = cx.vars.expand(text);
                        emit(cx, ctx, expanded, OutputKind::Normal);
                    }
                    Statement::Set { name, value, .. } => {
                        let expanded = cx.vars.expand(value);
                        cx.vars.set(name.clone(), expanded);
                    }
                    Statement::Wait { duration, line } => {
                        let expanded = cx.vars.expand(duration);
                        let millis: u64 = expanded.trim().parse().map_err(|_| {
                            Error::runtime_at(
                                format!("invalid wait duration '{expanded}'"),
                                *line,
                            )
                        })?;
                        if millis > MAX_WAIT_MS {
                            tracing::debug!(
                                requested = millis,
                                capped = MAX_WAIT_MS,
                                "wait duration capped"
                            );
                        }
                        let millis = millis.min(MAX_WAIT_MS);
                        if millis > 0 {
                            tokio::time::sleep(Duration::from_millis(millis)).await;
                        }
                    }
                    Statement::Terminal { command, .. } | Statement::Raw { command, .. } => {
                        let expanded = cx.vars.expand(command);
                        let outcome = self.router.execute(&expanded, ctx).await;
                        self.report(cx, ctx, outcome);
                    }
                    Statement::If {
                        condition,
                        then_block,
                        else_block,
                        ..
                    } => {
                        let value = cx.vars.expand(condition);
                        if is_truthy(&value) {
                            self.run_block(then_block, cx, ctx).await?;
                        } else {
                            self.run_block(else_block, cx, ctx).await?;
                        }
                    }
                    Statement::For {
                        var, items, body, ..
                    } => {
                        let saved = cx.vars.value(var).map(str::to_string);
                        for item in items {
                            if self.stop.load(Ordering::SeqCst) {
                                break;
                            }
                            let value = cx.vars.expand(item);
                            cx.vars.set(var.clone(), value);
                            self.run_block(body, cx, ctx).await?;
                        }
                        // The binding does not outlive the loop.
                        match saved {
                            Some(value) => cx.vars.set(var.clone(), value),
                            None => {
                                cx.vars.unset(var);
                            }
                        }
                    }
                }
            }
            Ok(())
        })
    }

    /// Record a routed command's outcome in the run output.
    ///
    /// Unknown commands and handler failures are reported the same way
    /// interactive input reports them; they do not abort the run.
    fn report(&self, cx: &mut ExecutionContext, ctx: &HostContext, outcome: CommandOutcome) {
        match outcome {
            CommandOutcome::Done(Some(output)) => {
                for line in output.lines() {
                    emit(cx, ctx, line.to_string(), OutputKind::Normal);
                }
            }
            CommandOutcome::Done(None) => {}
            other => {
                if let Some(message) = other.render() {
                    emit(cx, ctx, message, OutputKind::Error);
                }
            }
        }
    }
}

/// Decrements the run depth when a run finishes, normally or not.
struct RunGuard<'a> {
    engine: &'a ScriptEngine,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.engine.depth.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Append a line to both the run's output buffer and the host sink.
fn emit(cx: &mut ExecutionContext, ctx: &HostContext, text: String, kind: OutputKind) {
    ctx.add_output(&text, kind);
    cx.output.push(text);
}

/// Condition truthiness: a non-empty string other than `"false"` and `"0"`.
fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && value != "false" && value != "0"
}
