//! Host context handed to command handlers
//!
//! Gives handlers a way to emit output, read session feature flags, and
//! reach sibling modules (script engine, audio, integrations) by name
//! without the core knowing their internals.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

/// Classification of an emitted output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputKind {
    /// Ordinary command or script output.
    Normal,
    /// A reported failure (command not found, handler error, aborted run).
    Error,
    /// Console chrome: prompts, confirmations, status lines.
    System,
}

/// Destination for output lines.
///
/// The embedding UI implements this once; handlers and the script
/// interpreter write through it and never touch the UI directly.
pub trait OutputSink: Send + Sync {
    /// Append one line of output.
    fn add_output(&self, text: &str, kind: OutputKind);
}

/// Sink that buffers lines in memory. Used by tests and available to
/// embedders that want to drain output themselves.
#[derive(Default)]
pub struct BufferSink {
    lines: Mutex<Vec<(String, OutputKind)>>,
}

impl BufferSink {
    /// Create an empty buffering sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain and return everything buffered so far.
    pub fn take(&self) -> Vec<(String, OutputKind)> {
        std::mem::take(&mut self.lines.lock().expect("sink poisoned"))
    }

    /// Snapshot of buffered line texts, kinds dropped.
    pub fn texts(&self) -> Vec<String> {
        self.lines
            .lock()
            .expect("sink poisoned")
            .iter()
            .map(|(text, _)| text.clone())
            .collect()
    }
}

impl OutputSink for BufferSink {
    fn add_output(&self, text: &str, kind: OutputKind) {
        self.lines
            .lock()
            .expect("sink poisoned")
            .push((text.to_string(), kind));
    }
}

/// Session state reachable from every handler invocation.
pub struct HostContext {
    sink: Arc<dyn OutputSink>,
    flags: HashMap<String, bool>,
    modules: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl HostContext {
    /// Create a context writing to the given sink.
    pub fn new(sink: Arc<dyn OutputSink>) -> Self {
        Self {
            sink,
            flags: HashMap::new(),
            modules: HashMap::new(),
        }
    }

    /// Emit one line of output through the session sink.
    pub fn add_output(&self, text: &str, kind: OutputKind) {
        self.sink.add_output(text, kind);
    }

    /// The session output sink.
    pub fn sink(&self) -> &Arc<dyn OutputSink> {
        &self.sink
    }

    /// Read a feature flag; unset flags are off.
    pub fn flag(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    /// Set a feature flag.
    pub fn set_flag(&mut self, name: impl Into<String>, value: bool) {
        self.flags.insert(name.into(), value);
    }

    /// Make a sibling module reachable under `name`.
    pub fn insert_module(&mut self, name: impl Into<String>, module: Arc<dyn Any + Send + Sync>) {
        self.modules.insert(name.into(), module);
    }

    /// Look up a sibling module by name.
    pub fn module(&self, name: &str) -> Option<Arc<dyn Any + Send + Sync>> {
        self.modules.get(name).cloned()
    }

    /// Look up a sibling module by name and concrete type.
    pub fn module_as<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.modules.get(name).cloned()?.downcast::<T>().ok()
    }
}
