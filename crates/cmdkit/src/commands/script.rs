//! `script` command - manage saved scripts

use std::sync::Arc;

use anyhow::{anyhow, bail};
use async_trait::async_trait;

use crate::context::HostContext;
use crate::error::Error;
use crate::interpreter::ScriptEngine;
use crate::registry::Handler;
use crate::store::{Script, ScriptStore};

const USAGE: &str = "usage: script list|create|delete|info|run <name>";

/// Script management: list, create, delete, info, and run-by-name.
pub struct ScriptCommand {
    store: Arc<dyn ScriptStore>,
}

impl ScriptCommand {
    /// Create the command over the session's script store.
    pub fn new(store: Arc<dyn ScriptStore>) -> Self {
        Self { store }
    }

    async fn list(&self) -> Option<String> {
        let scripts = self.store.list().await;
        if scripts.is_empty() {
            return Some("no scripts saved".to_string());
        }
        let lines: Vec<String> = scripts
            .iter()
            .map(|s| {
                format!(
                    "{}  ({} lines, modified {})",
                    s.name,
                    s.content.lines().count(),
                    s.modified.format("%Y-%m-%d %H:%M")
                )
            })
            .collect();
        Some(lines.join("\n"))
    }

    async fn create(&self, name: &str, content: &str) -> anyhow::Result<Option<String>> {
        if self.store.get(name).await.is_some() {
            bail!("script '{name}' already exists; delete it first");
        }
        self.store.put(Script::new(name, content)).await;
        Ok(Some(format!("created script '{name}'")))
    }

    async fn delete(&self, name: &str) -> anyhow::Result<Option<String>> {
        if self.store.delete(name).await {
            Ok(Some(format!("deleted script '{name}'")))
        } else {
            Err(Error::ScriptNotFound(name.to_string()).into())
        }
    }

    async fn info(&self, name: &str) -> anyhow::Result<Option<String>> {
        let script = self
            .store
            .get(name)
            .await
            .ok_or_else(|| Error::ScriptNotFound(name.to_string()))?;
        let mut out = vec![
            format!("name:     {}", script.name),
            format!("created:  {}", script.created.format("%Y-%m-%d %H:%M:%S")),
            format!("modified: {}", script.modified.format("%Y-%m-%d %H:%M:%S")),
            format!("lines:    {}", script.content.lines().count()),
        ];
        if !script.content.is_empty() {
            out.push(String::new());
            out.extend(script.content.lines().map(str::to_string));
        }
        Ok(Some(out.join("\n")))
    }
}

#[async_trait]
impl Handler for ScriptCommand {
    async fn run(&self, args: &[String], ctx: &mut HostContext) -> anyhow::Result<Option<String>> {
        let subcommand = args.first().ok_or_else(|| anyhow!(USAGE))?.as_str();
        match subcommand {
            "list" => Ok(self.list().await),
            "create" => {
                let name = args.get(1).ok_or_else(|| anyhow!("usage: script create <name> [content]"))?;
                let content = args[2..].join(" ");
                self.create(name, &content).await
            }
            "delete" => {
                let name = args.get(1).ok_or_else(|| anyhow!("usage: script delete <name>"))?;
                self.delete(name).await
            }
            "info" => {
                let name = args.get(1).ok_or_else(|| anyhow!("usage: script info <name>"))?;
                self.info(name).await
            }
            "run" => {
                let name = args
                    .get(1)
                    .ok_or_else(|| anyhow!("usage: script run <name>"))?
                    .clone();
                let engine = ctx
                    .module_as::<ScriptEngine>(ScriptEngine::MODULE_NAME)
                    .ok_or_else(|| anyhow!("no script engine in this session"))?;
                let report = engine.run(&name, ctx).await?;
                if report.stopped {
                    Ok(Some(format!("script '{name}' stopped")))
                } else {
                    Ok(None)
                }
            }
            other => bail!("unknown subcommand '{other}'\n{USAGE}"),
        }
    }
}
