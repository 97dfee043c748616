//! Inheritance Map (§4.7 (c)): child -> parents and parent -> children,
//! derived from each class entity's `base_classes`. Backs the inheritance
//! shield's descendant walk.

use janitor_core::types::collections::{FxHashMap, FxHashSet};

#[derive(Debug, Default)]
pub struct InheritanceMap {
    parents_of: FxHashMap<String, Vec<String>>,
    children_of: FxHashMap<String, Vec<String>>,
}

impl InheritanceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, class_name: &str, base_classes: &[String]) {
        for base in base_classes {
            // Base class names may appear dotted (`module.Base`) or bare;
            // only the final segment is a class identifier we can match
            // against other extracted class entities.
            let base_simple = base.rsplit('.').next().unwrap_or(base).to_string();
            self.parents_of
                .entry(class_name.to_string())
                .or_default()
                .push(base_simple.clone());
            self.children_of
                .entry(base_simple)
                .or_default()
                .push(class_name.to_string());
        }
    }

    /// Every class reachable by walking *down* from `base` through the
    /// `children_of` map, `base` itself included. Used by the inheritance
    /// shield: "every entity ... whose `parent_class` is a descendant of
    /// `B`" (§4.7 — symmetric traversal upward is explicitly not applied).
    pub fn descendants_of(&self, base: &str) -> FxHashSet<String> {
        let mut seen = FxHashSet::default();
        let mut stack = vec![base.to_string()];
        seen.insert(base.to_string());
        while let Some(current) = stack.pop() {
            if let Some(children) = self.children_of.get(&current) {
                for child in children {
                    if seen.insert(child.clone()) {
                        stack.push(child.clone());
                    }
                }
            }
        }
        seen
    }

    pub fn direct_parents(&self, class_name: &str) -> &[String] {
        self.parents_of
            .get(class_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descendants_include_self_and_children() {
        let mut map = InheritanceMap::new();
        map.record("Dog", &["Animal".to_string()]);
        map.record("Puppy", &["Dog".to_string()]);
        let descendants = map.descendants_of("Animal");
        assert!(descendants.contains("Animal"));
        assert!(descendants.contains("Dog"));
        assert!(descendants.contains("Puppy"));
    }

    #[test]
    fn unrelated_class_not_a_descendant() {
        let mut map = InheritanceMap::new();
        map.record("Dog", &["Animal".to_string()]);
        let descendants = map.descendants_of("Animal");
        assert!(!descendants.contains("Cat"));
    }
}
