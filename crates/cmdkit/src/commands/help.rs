//! `help` command - command listing and per-command usage

use std::sync::{Arc, Weak};

use anyhow::{anyhow, bail};
use async_trait::async_trait;

use crate::context::HostContext;
use crate::registry::{CommandRegistry, Handler};

/// Lists registered commands, or shows one command's metadata.
pub struct Help {
    // Weak: the registry owns this handler, a strong reference would cycle.
    registry: Weak<CommandRegistry>,
}

impl Help {
    /// Create the command over the registry it will describe.
    pub fn new(registry: &Arc<CommandRegistry>) -> Self {
        Self {
            registry: Arc::downgrade(registry),
        }
    }
}

#[async_trait]
impl Handler for Help {
    async fn run(&self, args: &[String], _ctx: &mut HostContext) -> anyhow::Result<Option<String>> {
        let registry = self
            .registry
            .upgrade()
            .ok_or_else(|| anyhow!("console is shutting down"))?;

        if let Some(name) = args.first() {
            let Some(entry) = registry.resolve(name) else {
                bail!("no such command: {name}");
            };
            let mut out = vec![format!("{} - {}", entry.name, entry.description)];
            if !entry.usage.is_empty() {
                out.push(format!("usage: {}", entry.usage));
            }
            if !entry.aliases.is_empty() {
                out.push(format!("aliases: {}", entry.aliases.join(", ")));
            }
            if !entry.module.is_empty() {
                out.push(format!("module: {}", entry.module));
            }
            return Ok(Some(out.join("\n")));
        }

        let lines: Vec<String> = registry
            .entries()
            .iter()
            .map(|entry| {
                if entry.description.is_empty() {
                    entry.name.clone()
                } else {
                    format!("{:<12} {}", entry.name, entry.description)
                }
            })
            .collect();
        Ok(Some(lines.join("\n")))
    }
}
