//! Statement AST for the macro DSL

/// One parsed unit of script behavior.
///
/// Every variant carries its 1-based source line so runtime failures can
/// name where they happened. Block variants own their bodies: a statement
/// inside a skipped branch is never visited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `echo TEXT` — append the expanded text to the run's output.
    Echo { text: String, line: usize },
    /// `set NAME=VALUE` — expand the value and bind it.
    Set {
        name: String,
        value: String,
        line: usize,
    },
    /// `wait MILLIS` (alias `sleep`) — suspend between statements.
    /// The duration is an expression; it is expanded and parsed at runtime.
    Wait { duration: String, line: usize },
    /// `terminal LINE` — route the expanded line through the command router.
    Terminal { command: String, line: usize },
    /// `if COND ... [else ...] endif`.
    If {
        condition: String,
        then_block: Vec<Statement>,
        else_block: Vec<Statement>,
        line: usize,
    },
    /// `for VAR in ITEM... ... done`.
    For {
        var: String,
        items: Vec<String>,
        body: Vec<Statement>,
        line: usize,
    },
    /// A `#` comment line. Kept so line numbering survives; never executed.
    Comment { line: usize },
    /// Any other line: routed as an ordinary console command.
    Raw { command: String, line: usize },
}

impl Statement {
    /// Source line this statement started on (1-based).
    pub fn line(&self) -> usize {
        match self {
            Statement::Echo { line, .. }
            | Statement::Set { line, .. }
            | Statement::Wait { line, .. }
            | Statement::Terminal { line, .. }
            | Statement::If { line, .. }
            | Statement::For { line, .. }
            | Statement::Comment { line }
            | Statement::Raw { line, .. } => *line,
        }
    }
}
