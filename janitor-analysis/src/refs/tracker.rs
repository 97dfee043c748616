//! `ReferenceTracker` — the symbol-level reference graph builder (C7,
//! §4.7), the hardest component. Grounded end-to-end on
//! `drift-analysis`'s `call_graph/builder.rs`: its `name_index` /
//! `qualified_index` / `export_index` multi-strategy resolver is the
//! direct model for this tracker's 3-strategy `add_reference` chain,
//! constructor shield, and inheritance shield.

use janitor_core::types::collections::{FxHashMap, FxHashSet};
use janitor_core::types::{Entity, EntityKind, Reference, ReferenceGraph, ReferenceKind, SymbolId};

use super::candidate::CandidateReference;
use super::inheritance::InheritanceMap;
use super::type_registry::VariableTypeRegistry;

fn is_package_init_file(path: &str) -> bool {
    let name = path.rsplit('/').next().unwrap_or(path);
    matches!(
        name,
        "__init__.py" | "index.ts" | "index.tsx" | "index.js" | "index.jsx"
    )
}

/// The definitions table plus every index `add_reference` resolves
/// against (§4.7 (a)): by `SymbolId`, by bare name (a multimap for
/// fallback), by `(file, name)` for cross-module resolution, by
/// `(parent_class, name)` for `self`/`cls` resolution, and by
/// `qualified_name` for dotted fallback matching.
pub struct ReferenceTracker {
    entities: Vec<Entity>,
    by_file_and_name: FxHashMap<(String, String), Vec<usize>>,
    by_class_and_name: FxHashMap<(String, String), Vec<usize>>,
    by_name: FxHashMap<String, Vec<usize>>,
    by_qualified_name: FxHashMap<String, Vec<usize>>,

    graph: ReferenceGraph,
    references_by_target: FxHashMap<SymbolId, Vec<Reference>>,
    inheritance: InheritanceMap,
    type_registry: VariableTypeRegistry,
    package_exports: FxHashSet<String>,

    shielded_classes: FxHashSet<String>,
    shielded_methods: FxHashSet<String>,

    ambiguous_resolutions: usize,
}

impl ReferenceTracker {
    pub fn new(entities: Vec<Entity>) -> Self {
        let mut by_file_and_name: FxHashMap<(String, String), Vec<usize>> = FxHashMap::default();
        let mut by_class_and_name: FxHashMap<(String, String), Vec<usize>> = FxHashMap::default();
        let mut by_name: FxHashMap<String, Vec<usize>> = FxHashMap::default();
        let mut by_qualified_name: FxHashMap<String, Vec<usize>> = FxHashMap::default();
        let mut inheritance = InheritanceMap::new();

        for (idx, entity) in entities.iter().enumerate() {
            by_file_and_name
                .entry((entity.file_path.clone(), entity.name.clone()))
                .or_default()
                .push(idx);
            by_name.entry(entity.name.clone()).or_default().push(idx);
            by_qualified_name
                .entry(entity.qualified_name.clone())
                .or_default()
                .push(idx);
            if let Some(parent) = &entity.parent_class {
                by_class_and_name
                    .entry((parent.clone(), entity.name.clone()))
                    .or_default()
                    .push(idx);
            }
            if entity.kind == EntityKind::Class {
                inheritance.record(&entity.name, &entity.base_classes);
            }
        }

        Self {
            entities,
            by_file_and_name,
            by_class_and_name,
            by_name,
            by_qualified_name,
            graph: ReferenceGraph::new(),
            references_by_target: FxHashMap::default(),
            inheritance,
            type_registry: VariableTypeRegistry::new(),
            package_exports: FxHashSet::default(),
            shielded_classes: FxHashSet::default(),
            shielded_methods: FxHashSet::default(),
            ambiguous_resolutions: 0,
        }
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn type_registry_mut(&mut self) -> &mut VariableTypeRegistry {
        &mut self.type_registry
    }

    pub fn type_registry(&self) -> &VariableTypeRegistry {
        &self.type_registry
    }

    pub fn inheritance(&self) -> &InheritanceMap {
        &self.inheritance
    }

    fn lookup_by_file_and_name(&self, file: &str, name: &str) -> Vec<usize> {
        self.by_file_and_name
            .get(&(file.to_string(), name.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    fn lookup_by_class_and_name(&self, class_name: &str, name: &str) -> Vec<usize> {
        self.by_class_and_name
            .get(&(class_name.to_string(), name.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    /// Strategy 3: match on simple name, or on `qualified_name` when the
    /// candidate is dotted (§4.7).
    fn lookup_name_fallback(&self, name: &str) -> Vec<usize> {
        if name.contains('.') {
            self.by_qualified_name
                .get(name)
                .cloned()
                .unwrap_or_default()
        } else {
            self.by_name.get(name).cloned().unwrap_or_default()
        }
    }

    /// Resolve one candidate through the three strategies in order,
    /// falling through on an empty match at any stage (§4.7: "If none
    /// found, fall back to strategy 3" is mandatory from strategy 2; the
    /// same fallthrough is applied from strategy 1 so an import whose
    /// target file resolved but whose exact name didn't still gets a
    /// chance at the name-fallback match rather than being silently lost).
    ///
    /// Ambiguous matches (more than one definition) produce one edge per
    /// candidate match (§4.7) — this never aborts, per §7's
    /// `ResolutionAmbiguity` recovery policy.
    pub fn add_reference(&mut self, candidate: CandidateReference) {
        let mut matches = Vec::new();

        if let Some(target_file) = &candidate.target_file {
            matches = self.lookup_by_file_and_name(target_file, &candidate.symbol_name);
        }

        if matches.is_empty() {
            if let Some(class_context) = &candidate.class_context {
                matches = self.lookup_by_class_and_name(class_context, &candidate.symbol_name);
            }
        }

        if matches.is_empty() {
            matches = self.lookup_name_fallback(&candidate.symbol_name);
        }

        if matches.len() > 1 {
            self.ambiguous_resolutions += 1;
        }

        let source_id = match &candidate.source_symbol {
            Some(qualified) => SymbolId::new(&candidate.source_file, qualified),
            None => SymbolId::new(&candidate.source_file, "<module>"),
        };

        let is_package_export_source = candidate.kind == ReferenceKind::Import
            && is_package_init_file(&candidate.source_file);

        for idx in matches {
            let target_id = self.entities[idx].symbol_id();
            let reference = Reference {
                source_file: candidate.source_file.clone(),
                source_symbol: candidate.source_symbol.clone(),
                target_symbol_id: target_id.clone(),
                kind: candidate.kind,
            };
            self.graph.add_edge(&source_id, &target_id, candidate.kind);
            self.references_by_target
                .entry(target_id.clone())
                .or_default()
                .push(reference);

            if is_package_export_source {
                self.package_exports.insert(target_id.to_string());
            }

            if self.entities[idx].kind == EntityKind::Class {
                self.apply_constructor_shield(idx);
            }
            if self.entities[idx].kind == EntityKind::Method {
                self.apply_inheritance_shield(idx);
            }
        }
    }

    /// Whenever a class receives any reference, every dunder method on it
    /// is protected, once per class per run (§4.7).
    fn apply_constructor_shield(&mut self, class_idx: usize) {
        let class_symbol_id = self.entities[class_idx].symbol_id();
        if !self.shielded_classes.insert(class_symbol_id.to_string()) {
            return;
        }
        let class_name = self.entities[class_idx].name.clone();
        let file = self.entities[class_idx].file_path.clone();

        let dunder_targets: Vec<SymbolId> = self
            .entities
            .iter()
            .filter(|e| {
                e.file_path == file
                    && e.parent_class.as_deref() == Some(class_name.as_str())
                    && e.is_dunder()
            })
            .map(Entity::symbol_id)
            .collect();

        for target_id in dunder_targets {
            self.graph
                .add_edge(&class_symbol_id, &target_id, ReferenceKind::ConstructorShield);
            self.references_by_target
                .entry(target_id.clone())
                .or_default()
                .push(Reference {
                    source_file: file.clone(),
                    source_symbol: Some(class_name.clone()),
                    target_symbol_id: target_id,
                    kind: ReferenceKind::ConstructorShield,
                });
        }
    }

    /// Whenever method `M` on class `B` is referenced, every override of
    /// `M` on a descendant of `B` is protected (§4.7). Symmetric upward
    /// traversal is explicitly not applied.
    fn apply_inheritance_shield(&mut self, method_idx: usize) {
        let entity = &self.entities[method_idx];
        let Some(base_class) = entity.parent_class.clone() else {
            return;
        };
        let method_name = entity.name.clone();
        let referenced_id = entity.symbol_id();

        let shield_key = format!("{base_class}::{method_name}");
        if !self.shielded_methods.insert(shield_key) {
            return;
        }

        let descendants = self.inheritance.descendants_of(&base_class);
        let override_targets: Vec<(SymbolId, String)> = self
            .entities
            .iter()
            .filter(|e| {
                e.name == method_name
                    && e.parent_class
                        .as_deref()
                        .map(|p| p != base_class && descendants.contains(p))
                        .unwrap_or(false)
            })
            .map(|e| (e.symbol_id(), e.file_path.clone()))
            .collect();

        for (target_id, file) in override_targets {
            self.graph
                .add_edge(&referenced_id, &target_id, ReferenceKind::InheritanceShield);
            self.references_by_target
                .entry(target_id.clone())
                .or_default()
                .push(Reference {
                    source_file: file,
                    source_symbol: Some(format!("{base_class}.{method_name}")),
                    target_symbol_id: target_id,
                    kind: ReferenceKind::InheritanceShield,
                });
        }
    }

    pub fn references_of(&self, symbol_id: &SymbolId) -> &[Reference] {
        self.references_by_target
            .get(symbol_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn graph(&self) -> &ReferenceGraph {
        &self.graph
    }

    pub fn is_package_export(&self, symbol_id: &SymbolId) -> bool {
        self.package_exports.contains(symbol_id.as_str())
    }

    pub fn ambiguous_resolution_count(&self) -> usize {
        self.ambiguous_resolutions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use janitor_core::types::entity::{ByteRange, LineRange};

    fn entity(
        name: &str,
        file: &str,
        qualified: &str,
        parent: Option<&str>,
        base_classes: &[&str],
        kind: EntityKind,
    ) -> Entity {
        Entity {
            name: name.to_string(),
            kind,
            file_path: file.to_string(),
            byte_range: ByteRange::new(0, 1),
            line_range: LineRange { start: 1, end: 1 },
            qualified_name: qualified.to_string(),
            parent_class: parent.map(str::to_string),
            base_classes: base_classes.iter().map(|s| s.to_string()).collect(),
            decorators: Vec::new(),
            structural_hash: None,
            protected_by: None,
        }
    }

    #[test]
    fn self_method_falls_back_to_name_match() {
        // S1 from the testable-properties scenarios: `self._helper()`
        // inside `run` must resolve even though no cross-module import
        // target is known for a same-class call.
        let entities = vec![
            entity("_helper", "a.py", "C._helper", Some("C"), &[], EntityKind::Method),
            entity("run", "a.py", "C.run", Some("C"), &[], EntityKind::Method),
        ];
        let mut tracker = ReferenceTracker::new(entities);
        let candidate = CandidateReference::new("_helper", "a.py", ReferenceKind::Call)
            .with_source_symbol("C.run")
            .with_class_context("C");
        tracker.add_reference(candidate);

        let helper_id = SymbolId::new("a.py", "C._helper");
        assert_eq!(tracker.graph().live_in_degree(&helper_id), 1);
    }

    #[test]
    fn constructor_shield_protects_dunders_once() {
        let entities = vec![
            entity("C", "a.py", "C", None, &[], EntityKind::Class),
            entity("__init__", "a.py", "C.__init__", Some("C"), &[], EntityKind::Method),
            entity("helper", "a.py", "C.helper", Some("C"), &[], EntityKind::Method),
        ];
        let mut tracker = ReferenceTracker::new(entities);
        tracker.add_reference(CandidateReference::new("C", "b.py", ReferenceKind::Import).with_target_file("a.py"));

        let init_id = SymbolId::new("a.py", "C.__init__");
        let helper_id = SymbolId::new("a.py", "C.helper");
        assert_eq!(tracker.graph().total_in_degree(&init_id), 1);
        assert_eq!(tracker.graph().total_in_degree(&helper_id), 0);
    }

    #[test]
    fn inheritance_shield_protects_override() {
        let entities = vec![
            entity("Base", "a.py", "Base", None, &[], EntityKind::Class),
            entity("Derived", "a.py", "Derived", None, &["Base"], EntityKind::Class),
            entity("handle", "a.py", "Base.handle", Some("Base"), &[], EntityKind::Method),
            entity("handle", "a.py", "Derived.handle", Some("Derived"), &[], EntityKind::Method),
        ];
        let mut tracker = ReferenceTracker::new(entities);
        tracker.add_reference(
            CandidateReference::new("handle", "a.py", ReferenceKind::Call)
                .with_class_context("Base"),
        );

        let derived_handle = SymbolId::new("a.py", "Derived.handle");
        assert_eq!(tracker.graph().total_in_degree(&derived_handle), 1);
    }

    #[test]
    fn two_classes_same_method_name_independent() {
        let entities = vec![
            entity("run", "a.py", "X.run", Some("X"), &[], EntityKind::Method),
            entity("run", "a.py", "Y.run", Some("Y"), &[], EntityKind::Method),
        ];
        let mut tracker = ReferenceTracker::new(entities);
        tracker.add_reference(
            CandidateReference::new("run", "a.py", ReferenceKind::Call).with_class_context("X"),
        );
        let x_run = SymbolId::new("a.py", "X.run");
        let y_run = SymbolId::new("a.py", "Y.run");
        assert_eq!(tracker.graph().live_in_degree(&x_run), 1);
        assert_eq!(tracker.graph().live_in_degree(&y_run), 0);
    }
}
