//! Runtime environment: the tables that outlive individual statements.
//!
//! One [`Environment`] belongs to exactly one interpreter instance and is
//! handed by reference to every evaluation step.  Nothing here is global.

use std::collections::HashMap;

use super::builtins::FunctionTable;
use super::value::Value;

/// Variable bindings.  Script code can only read them; the host seeds them.
#[derive(Debug, Clone, Default)]
pub struct VariableTable {
    vars: HashMap<String, Value>,
}

impl VariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or overwrite) a variable.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// Value of `name`, or the empty string when unbound.
    pub fn read(&self, name: &str) -> Value {
        self.vars.get(name).cloned().unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.vars.iter()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Environment {
    pub vars: VariableTable,
    pub functions: FunctionTable,
    /// Reserved; nothing in the grammar reads or writes it yet.
    pub constants: HashMap<String, Value>,
}

impl Default for Environment {
    fn default() -> Self {
        Environment {
            vars: VariableTable::new(),
            functions: FunctionTable::with_builtins(),
            constants: HashMap::new(),
        }
    }
}

impl Environment {
    /// A fresh environment with the built-in functions registered.
    pub fn new() -> Self {
        Self::default()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let mut vars = VariableTable::new();
        vars.set("x", 1i64);
        assert_eq!(vars.get("x"), Some(&Value::Int(1)));
    }

    #[test]
    fn overwrite() {
        let mut vars = VariableTable::new();
        vars.set("x", "old");
        vars.set("x", "new");
        assert_eq!(vars.read("x"), Value::from("new"));
        assert_eq!(vars.len(), 1);
    }

    #[test]
    fn unbound_reads_empty_string() {
        let vars = VariableTable::new();
        assert_eq!(vars.read("missing"), Value::Str(String::new()));
        assert!(!vars.contains("missing"));
    }

    #[test]
    fn new_environment_is_seeded() {
        let env = Environment::new();
        assert!(env.functions.contains("test_func"));
        assert!(env.vars.is_empty());
        assert!(env.constants.is_empty());
    }
}
