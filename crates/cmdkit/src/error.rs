//! Error types for Cmdkit
//!
//! Only failures that abort an operation live here. "Command not found" and
//! handler failures are ordinary [`CommandOutcome`](crate::CommandOutcome)
//! values: the router reports them, it never throws them.

use thiserror::Error;

/// Result type alias using Cmdkit's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Cmdkit error types.
///
/// Messages are short and safe to render directly in a console; no stack
/// traces or internal paths.
#[derive(Error, Debug)]
pub enum Error {
    /// A command was registered with bad metadata (empty name or alias).
    /// Fatal to that `register` call only.
    #[error("invalid registration: {0}")]
    InvalidRegistration(String),

    /// A script failed to parse. Blocks the entire run; no statement executes.
    #[error("syntax error at line {line}: {message}")]
    ScriptSyntax { message: String, line: usize },

    /// A statement failed during execution. Aborts the remaining statements
    /// of that run only.
    #[error("script error at line {line}: {message}")]
    ScriptRuntime { message: String, line: usize },

    /// A script run was requested while another is still in flight.
    #[error("a script is already running")]
    ScriptAlreadyRunning,

    /// No stored script with the given name.
    #[error("script not found: {0}")]
    ScriptNotFound(String),
}

impl Error {
    /// Create a parse-time syntax error with a source line.
    pub fn syntax_at(message: impl Into<String>, line: usize) -> Self {
        Self::ScriptSyntax {
            message: message.into(),
            line,
        }
    }

    /// Create a runtime error with a source line.
    pub fn runtime_at(message: impl Into<String>, line: usize) -> Self {
        Self::ScriptRuntime {
            message: message.into(),
            line,
        }
    }
}
