//! Command registry
//!
//! Maps command names (and aliases) to handlers plus display metadata.
//! The registry sits behind `RwLock`s so it can be shared with the router
//! and still accept registrations after construction.
//!
//! # Custom commands
//!
//! Implement [`Handler`] and register a [`CommandEntry`]:
//!
//! ```rust
//! use cmdkit::{async_trait, CommandEntry, Handler, HostContext};
//!
//! struct Greet;
//!
//! #[async_trait]
//! impl Handler for Greet {
//!     async fn run(
//!         &self,
//!         args: &[String],
//!         _ctx: &mut HostContext,
//!     ) -> anyhow::Result<Option<String>> {
//!         let name = args.first().map(String::as_str).unwrap_or("world");
//!         Ok(Some(format!("Hello, {name}!")))
//!     }
//! }
//!
//! # fn main() -> cmdkit::Result<()> {
//! let registry = cmdkit::CommandRegistry::new();
//! registry.register(
//!     CommandEntry::new("greet", Greet)
//!         .description("Say hello")
//!         .usage("greet [name]")
//!         .alias("hi"),
//! )?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::context::HostContext;
use crate::error::{Error, Result};

/// Capability implementing one command's behavior.
///
/// Returning `Ok(None)` means "no output" and the console renders nothing.
/// Returning `Err` is the documented failure signal; the router catches it
/// and reports the message without crashing the console loop.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Execute the command with whitespace-split arguments.
    async fn run(&self, args: &[String], ctx: &mut HostContext) -> anyhow::Result<Option<String>>;
}

/// One registered command: handler plus metadata for help and listing UIs.
#[derive(Clone)]
pub struct CommandEntry {
    /// Canonical command name.
    pub name: String,
    /// The handler invoked for this command.
    pub handler: Arc<dyn Handler>,
    /// Alternate names resolving to this command.
    pub aliases: Vec<String>,
    /// One-line description.
    pub description: String,
    /// Usage string, e.g. `"run <name>"`.
    pub usage: String,
    /// Provenance tag naming the owning module. Informational only.
    pub module: String,
}

impl CommandEntry {
    /// Create an entry with empty metadata.
    pub fn new(name: impl Into<String>, handler: impl Handler + 'static) -> Self {
        Self {
            name: name.into(),
            handler: Arc::new(handler),
            aliases: Vec::new(),
            description: String::new(),
            usage: String::new(),
            module: String::new(),
        }
    }

    /// Add an alias.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Set the one-line description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the usage string.
    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    /// Set the owning-module tag.
    pub fn module(mut self, module: impl Into<String>) -> Self {
        self.module = module.into();
        self
    }
}

/// Registry mapping command names and aliases to entries.
///
/// Registration order matters: registering a name or alias that already
/// exists overwrites the earlier binding (last registration wins).
#[derive(Default)]
pub struct CommandRegistry {
    commands: RwLock<HashMap<String, CommandEntry>>,
    aliases: RwLock<HashMap<String, String>>,
}

impl CommandRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an entry and bind each of its aliases to the canonical name.
    ///
    /// An empty name or alias is rejected with
    /// [`Error::InvalidRegistration`]; the registry is left unchanged.
    pub fn register(&self, entry: CommandEntry) -> Result<()> {
        if entry.name.trim().is_empty() {
            return Err(Error::InvalidRegistration(
                "command name must not be empty".to_string(),
            ));
        }
        if entry.aliases.iter().any(|a| a.trim().is_empty()) {
            return Err(Error::InvalidRegistration(format!(
                "alias for '{}' must not be empty",
                entry.name
            )));
        }

        tracing::debug!(command = %entry.name, aliases = ?entry.aliases, "registering command");

        let mut aliases = self.aliases.write().expect("registry poisoned");
        for alias in &entry.aliases {
            aliases.insert(alias.clone(), entry.name.clone());
        }
        drop(aliases);

        self.commands
            .write()
            .expect("registry poisoned")
            .insert(entry.name.clone(), entry);
        Ok(())
    }

    /// Resolve a name or alias to its entry.
    ///
    /// Canonical names win over aliases when both exist, regardless of
    /// registration order: an alias never shadows a command of the same
    /// name. Last-registration-wins applies within each map only.
    pub fn resolve(&self, name: &str) -> Option<CommandEntry> {
        let commands = self.commands.read().expect("registry poisoned");
        if let Some(entry) = commands.get(name) {
            return Some(entry.clone());
        }
        let aliases = self.aliases.read().expect("registry poisoned");
        let canonical = aliases.get(name)?;
        commands.get(canonical).cloned()
    }

    /// Check whether a name or alias is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.commands.read().expect("registry poisoned").contains_key(name)
            || self.aliases.read().expect("registry poisoned").contains_key(name)
    }

    /// Snapshot of all canonical entries, sorted by name.
    ///
    /// Finite and restartable; intended for help and listing UIs.
    pub fn entries(&self) -> Vec<CommandEntry> {
        let mut entries: Vec<CommandEntry> = self
            .commands
            .read()
            .expect("registry poisoned")
            .values()
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }

    /// Number of canonical commands (aliases not counted).
    pub fn len(&self) -> usize {
        self.commands.read().expect("registry poisoned").len()
    }

    /// Check whether the registry has no commands.
    pub fn is_empty(&self) -> bool {
        self.commands.read().expect("registry poisoned").is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{BufferSink, HostContext};

    struct Static(&'static str);

    #[async_trait]
    impl Handler for Static {
        async fn run(
            &self,
            _args: &[String],
            _ctx: &mut HostContext,
        ) -> anyhow::Result<Option<String>> {
            Ok(Some(self.0.to_string()))
        }
    }

    fn test_ctx() -> HostContext {
        HostContext::new(Arc::new(BufferSink::new()))
    }

    #[test]
    fn register_and_resolve_with_alias() {
        let registry = CommandRegistry::new();
        registry
            .register(CommandEntry::new("status", Static("ok")).alias("st"))
            .unwrap();

        assert!(registry.contains("status"));
        assert!(registry.contains("st"));
        assert_eq!(registry.resolve("st").unwrap().name, "status");
        assert!(registry.resolve("unknown").is_none());
    }

    #[test]
    fn empty_name_is_rejected() {
        let registry = CommandRegistry::new();
        let err = registry
            .register(CommandEntry::new("", Static("x")))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRegistration(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn empty_alias_is_rejected() {
        let registry = CommandRegistry::new();
        let err = registry
            .register(CommandEntry::new("status", Static("x")).alias(""))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRegistration(_)));
        assert!(!registry.contains("status"));
    }

    #[tokio::test]
    async fn last_registration_wins() {
        let registry = CommandRegistry::new();
        registry
            .register(CommandEntry::new("status", Static("old")))
            .unwrap();
        registry
            .register(CommandEntry::new("status", Static("new")))
            .unwrap();

        let entry = registry.resolve("status").unwrap();
        let out = entry.handler.run(&[], &mut test_ctx()).await.unwrap();
        assert_eq!(out.as_deref(), Some("new"));
    }

    #[test]
    fn canonical_name_beats_later_alias() {
        let registry = CommandRegistry::new();
        registry
            .register(CommandEntry::new("status", Static("canonical")))
            .unwrap();
        registry
            .register(CommandEntry::new("other", Static("other")).alias("status"))
            .unwrap();

        // The alias is recorded but cannot shadow the canonical command.
        assert_eq!(registry.resolve("status").unwrap().name, "status");
        assert_eq!(registry.resolve("other").unwrap().name, "other");
    }

    #[test]
    fn entries_sorted_and_restartable() {
        let registry = CommandRegistry::new();
        registry
            .register(CommandEntry::new("beta", Static("b")))
            .unwrap();
        registry
            .register(CommandEntry::new("alpha", Static("a")))
            .unwrap();

        let names: Vec<String> = registry.entries().iter().map(|e| e.name.clone()).collect();
        assert_eq!(names, vec!["alpha", "beta"]);
        // A second listing starts over from the beginning.
        let again: Vec<String> = registry.entries().iter().map(|e| e.name.clone()).collect();
        assert_eq!(names, again);
    }
}
