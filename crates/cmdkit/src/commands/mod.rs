//! Console-level commands
//!
//! These are ordinary [`Handler`](crate::Handler) implementations registered
//! into the same registry user commands go into: `run` and `script` drive the
//! script engine, `help` and `history` serve the listing UIs.

mod help;
mod history;
mod run;
mod script;

pub use help::Help;
pub use history::History;
pub use run::Run;
pub use script::ScriptCommand;

use std::sync::Arc;

use crate::error::Result;
use crate::registry::{CommandEntry, CommandRegistry};
use crate::router::Router;
use crate::store::ScriptStore;

/// Register the built-in console commands.
pub fn register_all(
    registry: &Arc<CommandRegistry>,
    router: &Arc<Router>,
    store: &Arc<dyn ScriptStore>,
) -> Result<()> {
    registry.register(
        CommandEntry::new("run", Run)
            .description("Execute a saved script")
            .usage("run <name>")
            .module("scripts"),
    )?;
    registry.register(
        CommandEntry::new("script", ScriptCommand::new(Arc::clone(store)))
            .description("Manage saved scripts")
            .usage("script list|create|delete|info|run <name>")
            .module("scripts"),
    )?;
    registry.register(
        CommandEntry::new("help", Help::new(registry))
            .alias("?")
            .description("List commands or show one command's usage")
            .usage("help [command]")
            .module("console"),
    )?;
    registry.register(
        CommandEntry::new("history", History::new(router.history()))
            .description("Show previously executed lines")
            .usage("history")
            .module("console"),
    )?;
    Ok(())
}
