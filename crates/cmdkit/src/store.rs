//! Script persistence
//!
//! The store exclusively owns script bodies; editors hold transient copies
//! until saved. [`ScriptStore`] is the persistence contract, [`MemoryStore`]
//! the default in-memory implementation. Embedders back it with whatever
//! storage the host environment offers.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored, named script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    /// Unique key.
    pub name: String,
    /// Raw DSL text.
    pub content: String,
    /// When the script was first created.
    pub created: DateTime<Utc>,
    /// When the content last changed.
    pub modified: DateTime<Utc>,
}

impl Script {
    /// Create a script stamped with the current time.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            content: content.into(),
            created: now,
            modified: now,
        }
    }

    /// Replace the content and bump the modified stamp.
    pub fn update(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.modified = Utc::now();
    }
}

/// Persistence contract for scripts.
#[async_trait]
pub trait ScriptStore: Send + Sync {
    /// Fetch a script by name.
    async fn get(&self, name: &str) -> Option<Script>;

    /// Store a script, replacing any existing script of the same name.
    async fn put(&self, script: Script);

    /// Remove a script. Returns whether it existed.
    async fn delete(&self, name: &str) -> bool;

    /// All stored scripts, sorted by name.
    async fn list(&self) -> Vec<Script>;
}

/// In-memory script store.
#[derive(Default)]
pub struct MemoryStore {
    // std RwLock: guards are short-lived and never held across an await.
    scripts: RwLock<HashMap<String, Script>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScriptStore for MemoryStore {
    async fn get(&self, name: &str) -> Option<Script> {
        self.scripts.read().expect("store poisoned").get(name).cloned()
    }

    async fn put(&self, script: Script) {
        self.scripts
            .write()
            .expect("store poisoned")
            .insert(script.name.clone(), script);
    }

    async fn delete(&self, name: &str) -> bool {
        self.scripts
            .write()
            .expect("store poisoned")
            .remove(name)
            .is_some()
    }

    async fn list(&self) -> Vec<Script> {
        let mut scripts: Vec<Script> = self
            .scripts
            .read()
            .expect("store poisoned")
            .values()
            .cloned()
            .collect();
        scripts.sort_by(|a, b| a.name.cmp(&b.name));
        scripts
    }
}
