//! Execution history
//!
//! Append-only log of submitted lines with a navigation cursor for
//! up/down-arrow style recall.

/// Ordered log of every line submitted for execution, most recent last.
///
/// The cursor starts just past the last entry; [`previous`](Self::previous)
/// and [`next`](Self::next) clamp at the ends instead of wrapping.
#[derive(Debug, Default)]
pub struct HistoryLog {
    lines: Vec<String>,
    cursor: usize,
}

impl HistoryLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a submitted line and reset the cursor past the end.
    ///
    /// Every attempted execution is recorded, including lines that resolve
    /// to no command. Partial input never reaches this log.
    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
        self.cursor = self.lines.len();
    }

    /// Step the cursor backward and return the line there.
    ///
    /// Clamps at the oldest entry: once there, repeated calls keep
    /// returning it.
    pub fn previous(&mut self) -> Option<&str> {
        if self.lines.is_empty() {
            return None;
        }
        if self.cursor > 0 {
            self.cursor -= 1;
        }
        self.lines.get(self.cursor).map(String::as_str)
    }

    /// Step the cursor forward and return the line there.
    ///
    /// Past the newest entry the cursor clamps to its starting position and
    /// `None` is returned, signalling an empty input line.
    pub fn next(&mut self) -> Option<&str> {
        if self.cursor + 1 < self.lines.len() {
            self.cursor += 1;
            self.lines.get(self.cursor).map(String::as_str)
        } else {
            self.cursor = self.lines.len();
            None
        }
    }

    /// Number of recorded lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check whether anything has been recorded.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Line at `index`, oldest first.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// Iterate over recorded lines, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_navigate() {
        let mut log = HistoryLog::new();
        log.push("one");
        log.push("two");
        log.push("three");

        assert_eq!(log.previous(), Some("three"));
        assert_eq!(log.previous(), Some("two"));
        assert_eq!(log.previous(), Some("one"));
        // Clamped at the oldest entry.
        assert_eq!(log.previous(), Some("one"));

        assert_eq!(log.next(), Some("two"));
        assert_eq!(log.next(), Some("three"));
        // Clamped past the newest entry.
        assert_eq!(log.next(), None);
        assert_eq!(log.next(), None);
        // Going back still works after clamping forward.
        assert_eq!(log.previous(), Some("three"));
    }

    #[test]
    fn empty_log_navigates_nowhere() {
        let mut log = HistoryLog::new();
        assert_eq!(log.previous(), None);
        assert_eq!(log.next(), None);
    }

    #[test]
    fn push_resets_cursor() {
        let mut log = HistoryLog::new();
        log.push("one");
        log.push("two");
        assert_eq!(log.previous(), Some("two"));
        assert_eq!(log.previous(), Some("one"));

        log.push("three");
        assert_eq!(log.previous(), Some("three"));
    }

    #[test]
    fn duplicates_are_kept() {
        let mut log = HistoryLog::new();
        log.push("same");
        log.push("same");
        assert_eq!(log.len(), 2);
    }
}
