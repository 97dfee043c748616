//! Variable Type Registry (§4.7 (d)): maps `(file, scope, local_name)` to
//! an inferred class name, so `v.m(...)` after `v = C(...)` resolves as
//! `C.m`. `isinstance(v, T)` narrows the binding inside a guarded branch;
//! modeled as a push/pop stack per key so the ingestion walker can shadow
//! a binding for the lexical extent of one `if` branch and restore it on
//! exit, without threading control-flow state through the registry itself.

use janitor_core::types::collections::FxHashMap;

type Key = (String, String, String);

#[derive(Debug, Default)]
pub struct VariableTypeRegistry {
    stacks: FxHashMap<Key, Vec<String>>,
}

impl VariableTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(file: &str, scope: &str, name: &str) -> Key {
        (file.to_string(), scope.to_string(), name.to_string())
    }

    /// Record `v = C(...)`. Replaces any prior binding at this scope depth
    /// by pushing a fresh base entry — a second plain assignment in the
    /// same scope simply rebinds going forward.
    pub fn bind(&mut self, file: &str, scope: &str, name: &str, class_name: &str) {
        let stack = self.stacks.entry(Self::key(file, scope, name)).or_default();
        if stack.is_empty() {
            stack.push(class_name.to_string());
        } else {
            *stack.last_mut().unwrap() = class_name.to_string();
        }
    }

    /// Narrow `v`'s type to `class_name` for the extent of a guarded
    /// branch (`isinstance(v, T)`); paired with [`Self::pop_narrow`].
    pub fn push_narrow(&mut self, file: &str, scope: &str, name: &str, class_name: &str) {
        self.stacks
            .entry(Self::key(file, scope, name))
            .or_default()
            .push(class_name.to_string());
    }

    pub fn pop_narrow(&mut self, file: &str, scope: &str, name: &str) {
        if let Some(stack) = self.stacks.get_mut(&Self::key(file, scope, name)) {
            stack.pop();
        }
    }

    pub fn resolve(&self, file: &str, scope: &str, name: &str) -> Option<&str> {
        self.stacks
            .get(&Self::key(file, scope, name))
            .and_then(|stack| stack.last())
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrowing_shadows_then_restores() {
        let mut reg = VariableTypeRegistry::new();
        reg.bind("a.py", "run", "v", "Base");
        assert_eq!(reg.resolve("a.py", "run", "v"), Some("Base"));
        reg.push_narrow("a.py", "run", "v", "Derived");
        assert_eq!(reg.resolve("a.py", "run", "v"), Some("Derived"));
        reg.pop_narrow("a.py", "run", "v");
        assert_eq!(reg.resolve("a.py", "run", "v"), Some("Base"));
    }
}
