//! Variable store and `$name` / `${name}` expansion
//!
//! One store exists per script run. Lookups of unset names yield the empty
//! string, matching shell behavior, so macros can reference optional
//! variables without guarding every use.

use std::collections::HashMap;

/// Per-run variable environment.
#[derive(Debug, Default, Clone)]
pub struct VariableStore {
    values: HashMap<String, String>,
}

impl VariableStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value under `name`, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Look up a value; unset names expand to the empty string.
    pub fn get(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or("")
    }

    /// Look up a value, distinguishing unset from empty.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Remove a binding, returning the previous value if any.
    pub fn unset(&mut self, name: &str) -> Option<String> {
        self.values.remove(name)
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check whether the store has no bindings.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Substitute `$name` and `${name}` occurrences in `text`, left to right.
    ///
    /// `$name` matches the longest run of letters, digits, and underscores.
    /// Expansion is a single pass: substituted values are not re-scanned, so
    /// user-controlled content cannot cause unbounded re-expansion. A `$`
    /// that starts no identifier, and a `${` with no closing brace, pass
    /// through literally.
    pub fn expand(&self, text: &str) -> String {
        let mut result = String::with_capacity(text.len());
        let mut chars = text.chars().peekable();

        while let Some(ch) = chars.next() {
            if ch != '$' {
                result.push(ch);
                continue;
            }

            if chars.peek() == Some(&'{') {
                chars.next();
                let mut name = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    name.push(c);
                }
                if closed {
                    result.push_str(self.get(&name));
                } else {
                    // Unterminated ${ is literal text.
                    result.push_str("${");
                    result.push_str(&name);
                }
            } else {
                let mut name = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if name.is_empty() {
                    result.push('$');
                } else {
                    result.push_str(self.get(&name));
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let mut vars = VariableStore::new();
        vars.set("a", "1");
        assert_eq!(vars.get("a"), "1");
        assert_eq!(vars.value("a"), Some("1"));
    }

    #[test]
    fn unset_name_is_empty_string() {
        let vars = VariableStore::new();
        assert_eq!(vars.get("missing"), "");
        assert_eq!(vars.value("missing"), None);
        assert_eq!(vars.expand("$missing"), "");
    }

    #[test]
    fn expand_both_forms() {
        let mut vars = VariableStore::new();
        vars.set("a", "1");
        assert_eq!(vars.expand("$a and ${a}"), "1 and 1");
    }

    #[test]
    fn expand_greedy_identifier() {
        let mut vars = VariableStore::new();
        vars.set("name", "Adrian");
        vars.set("name2", "Beth");
        assert_eq!(vars.expand("Hello $name2"), "Hello Beth");
        assert_eq!(vars.expand("Hello ${name}2"), "Hello Adrian2");
    }

    #[test]
    fn expand_is_not_recursive() {
        let mut vars = VariableStore::new();
        vars.set("a", "$b");
        vars.set("b", "deep");
        assert_eq!(vars.expand("$a"), "$b");
    }

    #[test]
    fn lone_dollar_is_literal() {
        let vars = VariableStore::new();
        assert_eq!(vars.expand("cost: 5$"), "cost: 5$");
        assert_eq!(vars.expand("$ alone"), "$ alone");
    }

    #[test]
    fn unterminated_brace_is_literal() {
        let vars = VariableStore::new();
        assert_eq!(vars.expand("${oops"), "${oops");
    }

    #[test]
    fn overwrite_and_unset() {
        let mut vars = VariableStore::new();
        vars.set("x", "1");
        vars.set("x", "2");
        assert_eq!(vars.get("x"), "2");
        assert_eq!(vars.unset("x"), Some("2".to_string()));
        assert_eq!(vars.get("x"), "");
    }
}
