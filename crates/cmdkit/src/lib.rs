//! Cmdkit - command router and macro script interpreter for embeddable
//! consoles
//!
//! Feed the console raw input lines; it resolves them against a registry of
//! named handlers, records history, and never lets one bad command take the
//! loop down. Saved scripts written in a small macro DSL (`set`, `echo`,
//! `wait`, `if/else/endif`, `for/done`) re-enter the same router to drive
//! the console programmatically.
//!
//! # Example
//!
//! ```rust
//! use cmdkit::{Console, CommandOutcome, Script};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let mut console = Console::builder().build()?;
//!
//!     console
//!         .engine()
//!         .store()
//!         .put(Script::new("greet", "set name=Adrian\necho Hello ${name}"))
//!         .await;
//!
//!     let outcome = console.execute("run greet").await;
//!     assert!(outcome.is_success());
//!     Ok(())
//! }
//! ```

mod commands;
mod context;
mod error;
mod history;
mod interpreter;
mod parser;
mod registry;
mod router;
mod store;
mod vars;

pub use async_trait::async_trait;
pub use context::{BufferSink, HostContext, OutputKind, OutputSink};
pub use error::{Error, Result};
pub use history::HistoryLog;
pub use interpreter::{ExecutionContext, RunReport, ScriptEngine};
pub use parser::{Statement, parse};
pub use registry::{CommandEntry, CommandRegistry, Handler};
pub use router::{CommandOutcome, Router};
pub use store::{MemoryStore, Script, ScriptStore};
pub use vars::VariableStore;

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// Main entry point: one interactive console session.
///
/// Owns its registry, router, history, and script engine; independent
/// consoles share nothing, so several can coexist in one process.
pub struct Console {
    registry: Arc<CommandRegistry>,
    router: Arc<Router>,
    engine: Arc<ScriptEngine>,
    ctx: HostContext,
}

impl Console {
    /// Create a builder for customized configuration.
    pub fn builder() -> ConsoleBuilder {
        ConsoleBuilder::default()
    }

    /// Execute one raw input line.
    ///
    /// Empty lines (after trimming) are ignored: nothing is dispatched and
    /// history does not grow. Rendering the outcome is the caller's job;
    /// see [`CommandOutcome::render`].
    pub async fn execute(&mut self, line: &str) -> CommandOutcome {
        if line.trim().is_empty() {
            return CommandOutcome::Done(None);
        }
        self.router.execute(line, &mut self.ctx).await
    }

    /// Register a command after construction.
    pub fn register(&self, entry: CommandEntry) -> Result<()> {
        self.registry.register(entry)
    }

    /// Step backward through history (up-arrow).
    pub fn previous(&mut self) -> Option<String> {
        self.router.previous()
    }

    /// Step forward through history (down-arrow).
    pub fn next(&mut self) -> Option<String> {
        self.router.next()
    }

    /// The command registry.
    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// The script engine (store access, stop requests).
    pub fn engine(&self) -> &Arc<ScriptEngine> {
        &self.engine
    }

    /// The session host context.
    pub fn host(&self) -> &HostContext {
        &self.ctx
    }

    /// Mutable access to the session host context (flags, modules).
    pub fn host_mut(&mut self) -> &mut HostContext {
        &mut self.ctx
    }
}

/// Builder for customized console configuration.
#[derive(Default)]
pub struct ConsoleBuilder {
    store: Option<Arc<dyn ScriptStore>>,
    sink: Option<Arc<dyn OutputSink>>,
    flags: HashMap<String, bool>,
    modules: HashMap<String, Arc<dyn Any + Send + Sync>>,
    commands: Vec<CommandEntry>,
    allow_nested_scripts: bool,
}

impl ConsoleBuilder {
    /// Use a custom script store instead of the in-memory default.
    pub fn store(mut self, store: Arc<dyn ScriptStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use a custom output sink instead of the in-memory default.
    pub fn sink(mut self, sink: Arc<dyn OutputSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Set a session feature flag.
    pub fn flag(mut self, name: impl Into<String>, value: bool) -> Self {
        self.flags.insert(name.into(), value);
        self
    }

    /// Make a sibling module reachable from handlers by name.
    pub fn module(
        mut self,
        name: impl Into<String>,
        module: Arc<dyn Any + Send + Sync>,
    ) -> Self {
        self.modules.insert(name.into(), module);
        self
    }

    /// Queue a command registration.
    pub fn command(mut self, entry: CommandEntry) -> Self {
        self.commands.push(entry);
        self
    }

    /// Allow a running script to invoke `run <other>` instead of rejecting
    /// it with [`Error::ScriptAlreadyRunning`]. Off by default.
    pub fn allow_nested_scripts(mut self, allow: bool) -> Self {
        self.allow_nested_scripts = allow;
        self
    }

    /// Build the console.
    ///
    /// Fails only if a queued command entry is invalid.
    pub fn build(self) -> Result<Console> {
        let registry = Arc::new(CommandRegistry::new());
        let router = Arc::new(Router::new(Arc::clone(&registry)));
        let store: Arc<dyn ScriptStore> =
            self.store.unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let engine = Arc::new(ScriptEngine::new(
            Arc::clone(&router),
            Arc::clone(&store),
            self.allow_nested_scripts,
        ));

        commands::register_all(&registry, &router, &store)?;
        for entry in self.commands {
            registry.register(entry)?;
        }

        let sink: Arc<dyn OutputSink> =
            self.sink.unwrap_or_else(|| Arc::new(BufferSink::new()));
        let mut ctx = HostContext::new(sink);
        for (name, value) in self.flags {
            ctx.set_flag(name, value);
        }
        for (name, module) in self.modules {
            ctx.insert_module(name, module);
        }
        ctx.insert_module(
            ScriptEngine::MODULE_NAME,
            Arc::clone(&engine) as Arc<dyn Any + Send + Sync>,
        );

        Ok(Console {
            registry,
            router,
            engine,
            ctx,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn console_with_store() -> Console {
        Console::builder().build().unwrap()
    }

    async fn save(console: &Console, name: &str, content: &str) {
        console.engine().store().put(Script::new(name, content)).await;
    }

    #[tokio::test]
    async fn set_then_echo() {
        let mut console = console_with_store().await;
        save(&console, "greet", "set name=Adrian\necho Hello ${name}").await;

        let report = {
            let engine = Arc::clone(console.engine());
            engine.run("greet", console.host_mut()).await.unwrap()
        };
        assert_eq!(report.output, vec!["Hello Adrian"]);
    }

    #[tokio::test]
    async fn for_loop_in_order() {
        let mut console = console_with_store().await;
        save(&console, "count", "for i in 1 2 3\necho $i\ndone").await;

        let engine = Arc::clone(console.engine());
        let report = engine.run("count", console.host_mut()).await.unwrap();
        assert_eq!(report.output, vec!["1", "2", "3"]);
    }

    #[tokio::test]
    async fn if_else_branches() {
        let mut console = console_with_store().await;
        save(
            &console,
            "branch",
            "set flag=0\nif $flag\necho on\nelse\necho off\nendif",
        )
        .await;

        let engine = Arc::clone(console.engine());
        let report = engine.run("branch", console.host_mut()).await.unwrap();
        assert_eq!(report.output, vec!["off"]);
    }

    #[tokio::test]
    async fn run_command_streams_to_sink() {
        let sink = Arc::new(BufferSink::new());
        let mut console = Console::builder().sink(sink.clone()).build().unwrap();
        save(&console, "greet", "echo hi there").await;

        let outcome = console.execute("run greet").await;
        assert_eq!(outcome, CommandOutcome::Done(None));
        assert_eq!(sink.texts(), vec!["hi there"]);
    }

    #[tokio::test]
    async fn syntax_error_is_all_or_nothing() {
        let sink = Arc::new(BufferSink::new());
        let mut console = Console::builder().sink(sink.clone()).build().unwrap();
        save(&console, "broken", "echo before\nif $x\necho inside").await;

        let outcome = console.execute("run broken").await;
        let CommandOutcome::Failed(message) = outcome else {
            panic!("expected a failed outcome, got {outcome:?}");
        };
        assert!(message.contains("line 2"), "message: {message}");
        // Nothing executed, nothing reached the sink.
        assert!(sink.texts().is_empty());
    }

    #[tokio::test]
    async fn missing_script_is_reported() {
        let mut console = console_with_store().await;
        let outcome = console.execute("run nope").await;
        assert_eq!(
            outcome,
            CommandOutcome::Failed("script not found: nope".into())
        );
    }

    #[tokio::test]
    async fn unknown_command_inside_script_does_not_abort() {
        let mut console = console_with_store().await;
        save(&console, "mixed", "doesnotexist\necho still here").await;

        let engine = Arc::clone(console.engine());
        let report = engine.run("mixed", console.host_mut()).await.unwrap();
        assert_eq!(
            report.output,
            vec!["command not found: doesnotexist", "still here"]
        );
    }

    #[tokio::test]
    async fn script_lifecycle_via_commands() {
        let mut console = console_with_store().await;

        let outcome = console.execute("script create greet echo hi").await;
        assert_eq!(
            outcome,
            CommandOutcome::Done(Some("created script 'greet'".into()))
        );

        let outcome = console.execute("script list").await;
        let CommandOutcome::Done(Some(listing)) = outcome else {
            panic!("expected listing");
        };
        assert!(listing.contains("greet"));

        let outcome = console.execute("script info greet").await;
        let CommandOutcome::Done(Some(info)) = outcome else {
            panic!("expected info");
        };
        assert!(info.contains("echo hi"));

        let outcome = console.execute("script delete greet").await;
        assert!(outcome.is_success());
        let outcome = console.execute("script info greet").await;
        assert_eq!(
            outcome,
            CommandOutcome::Failed("script not found: greet".into())
        );
    }

    #[tokio::test]
    async fn help_lists_builtin_commands() {
        let mut console = console_with_store().await;
        let CommandOutcome::Done(Some(listing)) = console.execute("help").await else {
            panic!("expected help output");
        };
        for name in ["run", "script", "help", "history"] {
            assert!(listing.contains(name), "missing {name} in {listing}");
        }

        // The "?" alias resolves to the same command.
        let by_alias = console.execute("? run").await;
        let by_name = console.execute("help run").await;
        assert_eq!(by_alias, by_name);
    }

    #[tokio::test]
    async fn history_navigation_clamps() {
        let mut console = console_with_store().await;
        console.execute("help").await;
        console.execute("doesnotexist").await;

        assert_eq!(console.previous().as_deref(), Some("doesnotexist"));
        assert_eq!(console.previous().as_deref(), Some("help"));
        assert_eq!(console.previous().as_deref(), Some("help"));
        assert_eq!(console.next().as_deref(), Some("doesnotexist"));
        assert_eq!(console.next(), None);
    }

    #[tokio::test]
    async fn variables_do_not_leak_between_runs() {
        let mut console = console_with_store().await;
        save(&console, "first", "set x=1\necho $x").await;
        save(&console, "second", "echo [$x]").await;

        let engine = Arc::clone(console.engine());
        let report = engine.run("first", console.host_mut()).await.unwrap();
        assert_eq!(report.output, vec!["1"]);
        let report = engine.run("second", console.host_mut()).await.unwrap();
        assert_eq!(report.output, vec!["[]"]);
    }

    #[tokio::test]
    async fn invalid_queued_command_fails_build() {
        struct Noop;

        #[async_trait]
        impl Handler for Noop {
            async fn run(
                &self,
                _args: &[String],
                _ctx: &mut HostContext,
            ) -> anyhow::Result<Option<String>> {
                Ok(None)
            }
        }

        let result = Console::builder()
            .command(CommandEntry::new("", Noop))
            .build();
        let Err(err) = result else {
            panic!("expected build to fail");
        };
        assert!(matches!(err, Error::InvalidRegistration(_)));
    }
}
