//! `run` command - execute a saved script

use anyhow::anyhow;
use async_trait::async_trait;

use crate::context::HostContext;
use crate::interpreter::ScriptEngine;
use crate::registry::Handler;

/// Executes a saved script by name through the session's script engine.
///
/// The engine is looked up through the host context's module map, so the
/// command works in any session that carries one.
pub struct Run;

#[async_trait]
impl Handler for Run {
    async fn run(&self, args: &[String], ctx: &mut HostContext) -> anyhow::Result<Option<String>> {
        let name = args
            .first()
            .ok_or_else(|| anyhow!("usage: run <name>"))?
            .clone();
        let engine = ctx
            .module_as::<ScriptEngine>(ScriptEngine::MODULE_NAME)
            .ok_or_else(|| anyhow!("no script engine in this session"))?;

        // Script output streams to the session sink as it is produced, so
        // there is nothing further to render here.
        let report = engine.run(&name, ctx).await?;
        if report.stopped {
            Ok(Some(format!("script '{name}' stopped")))
        } else {
            Ok(None)
        }
    }
}
