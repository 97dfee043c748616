//! JavaScript/TypeScript ingestion walk (§4.7). Grounded on `ingest/python.rs`'s
//! walk shape (class-context threading, type-registry narrowing,
//! import-target resolution) retargeted to JS/TS CST node kinds, plus the
//! subset of §4.7's language-specific heuristics that apply to this family:
//! type-hint annotations, JSX element usage, and `this`-scoped method
//! resolution in place of Python's `self`/`cls`.

use tree_sitter::Node;

use janitor_core::types::collections::FxHashSet;
use janitor_core::types::{Entity, EntityKind, Import, ReferenceKind};

use super::last_segment;
use crate::depgraph::DependencyGraphBuilder;
use crate::parser::{Cst, Language};
use crate::refs::candidate::CandidateReference;
use crate::refs::type_registry::VariableTypeRegistry;

const MODULE_SCOPE: &str = "<module>";

/// Resolve each file-local import to a canonical target file, keyed by the
/// local name it binds — default imports and named imports both bind
/// exactly the local identifier tree-sitter records in `names`.
fn build_import_targets(
    imports: &[Import],
    dep_builder: &DependencyGraphBuilder,
) -> janitor_core::types::collections::FxHashMap<String, String> {
    let mut targets = janitor_core::types::collections::FxHashMap::default();
    for import in imports {
        let resolved = dep_builder.resolve(import, Language::TypeScript);
        let Some(target) = resolved.into_iter().next() else {
            continue;
        };
        let target = crate::depgraph::normalize(&target);
        for name in &import.names {
            targets.entry(name.clone()).or_insert_with(|| target.clone());
        }
    }
    targets
}

struct Walker<'a> {
    cst: &'a Cst,
    file: String,
    imported_targets: janitor_core::types::collections::FxHashMap<String, String>,
    class_names: FxHashSet<String>,
    type_registry: &'a mut VariableTypeRegistry,
    out: Vec<CandidateReference>,
}

impl<'a> Walker<'a> {
    fn source_symbol(scope: &str) -> Option<String> {
        if scope == MODULE_SCOPE {
            None
        } else {
            Some(scope.to_string())
        }
    }

    fn push(&mut self, symbol_name: impl Into<String>, scope: &str, kind: ReferenceKind) -> usize {
        let mut candidate = CandidateReference::new(symbol_name, self.file.clone(), kind);
        if let Some(src) = Self::source_symbol(scope) {
            candidate = candidate.with_source_symbol(src);
        }
        self.out.push(candidate);
        self.out.len() - 1
    }

    fn walk(&mut self, node: Node, class_context: Option<&str>, scope: &str) {
        match node.kind() {
            "function_declaration" | "generator_function_declaration" | "method_definition" => {
                return self.handle_function(node, class_context, scope)
            }
            "class_declaration" => return self.handle_class(node, scope),
            "if_statement" => return self.handle_if(node, class_context, scope),
            "call_expression" => self.handle_call(node, class_context, scope),
            "new_expression" => self.handle_new(node, scope),
            "jsx_opening_element" | "jsx_self_closing_element" => self.handle_jsx(node, scope),
            "type_annotation" => self.handle_type_annotation(node, scope),
            _ => {}
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk(child, class_context, scope);
        }
    }

    fn handle_function(&mut self, node: Node, class_context: Option<&str>, scope: &str) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let name = self.cst.text_of_lossy(&name_node);
        let inner_scope = match class_context {
            Some(class) => format!("{class}.{name}"),
            None if scope == MODULE_SCOPE => name.clone(),
            None => format!("{scope}.{name}"),
        };
        if let Some(body) = node.child_by_field_name("body") {
            self.walk(body, class_context, &inner_scope);
        }
    }

    fn handle_class(&mut self, node: Node, scope: &str) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let class_name = self.cst.text_of_lossy(&name_node);
        if let Some(body) = node.child_by_field_name("body") {
            let mut cursor = body.walk();
            for member in body.children(&mut cursor) {
                self.walk(member, Some(&class_name), scope);
            }
        }
    }

    /// `v instanceof T` — the JS/TS analogue of Python's `isinstance(v, T)`
    /// scope-narrowing (§4.7 "Type inference for indirect calls").
    fn instanceof_binding(&self, node: &Node) -> Option<(String, String)> {
        if node.kind() != "binary_expression" {
            return None;
        }
        let operator = node
            .child(1)
            .map(|n| self.cst.text_of_lossy(&n))
            .unwrap_or_default();
        if operator != "instanceof" {
            return None;
        }
        let left = node.child_by_field_name("left")?;
        let right = node.child_by_field_name("right")?;
        if left.kind() != "identifier" {
            return None;
        }
        let v = self.cst.text_of_lossy(&left);
        let t = self.cst.text_of_lossy(&right);
        Some((v, last_segment(&t)))
    }

    fn handle_if(&mut self, node: Node, class_context: Option<&str>, scope: &str) {
        let condition = node.child_by_field_name("condition");
        if let Some(cond) = condition {
            self.walk(cond, class_context, scope);
        }
        // tree-sitter wraps the condition in a parenthesized_expression;
        // unwrap one level so `instanceof_binding` sees the binary
        // expression directly.
        let narrow = condition
            .and_then(|c| c.named_child(0).or(Some(c)))
            .and_then(|c| self.instanceof_binding(&c));
        if let Some((var, ty)) = &narrow {
            self.type_registry.push_narrow(&self.file, scope, var, ty);
        }
        if let Some(consequence) = node.child_by_field_name("consequence") {
            self.walk(consequence, class_context, scope);
        }
        if let Some((var, _)) = &narrow {
            self.type_registry.pop_narrow(&self.file, scope, var);
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if condition.map(|c| c == child).unwrap_or(false) {
                continue;
            }
            if node
                .child_by_field_name("consequence")
                .map(|c| c == child)
                .unwrap_or(false)
            {
                continue;
            }
            self.walk(child, class_context, scope);
        }
    }

    fn handle_call(&mut self, node: Node, class_context: Option<&str>, scope: &str) {
        let Some(function) = node.child_by_field_name("function") else {
            return;
        };
        match function.kind() {
            "identifier" => {
                let name = self.cst.text_of_lossy(&function);
                if let Some(target) = self.imported_targets.get(&name).cloned() {
                    let idx = self.push(name, scope, ReferenceKind::Call);
                    self.out[idx].target_file = Some(target);
                } else {
                    self.push(name, scope, ReferenceKind::Call);
                }
            }
            "member_expression" => {
                let Some(obj) = function.child_by_field_name("object") else {
                    return;
                };
                let Some(prop) = function.child_by_field_name("property") else {
                    return;
                };
                let obj_text = self.cst.text_of_lossy(&obj);
                let prop_name = self.cst.text_of_lossy(&prop);

                if let Some(target) = self.imported_targets.get(&obj_text).cloned() {
                    let idx = self.push(prop_name, scope, ReferenceKind::Call);
                    self.out[idx].target_file = Some(target);
                    return;
                }

                let class_ctx = if obj_text == "this" {
                    class_context.map(str::to_string)
                } else if let Some(resolved) = self.type_registry.resolve(&self.file, scope, &obj_text) {
                    Some(resolved.to_string())
                } else if self.class_names.contains(&obj_text) {
                    Some(obj_text.clone())
                } else {
                    None
                };

                match class_ctx {
                    Some(cc) => {
                        let idx = self.push(prop_name, scope, ReferenceKind::Call);
                        self.out[idx].class_context = Some(cc);
                    }
                    None => {
                        self.push(prop_name, scope, ReferenceKind::Attribute);
                    }
                }
            }
            _ => {}
        }
    }

    /// `const v = new C(...)` binds `v -> C` in the type registry, mirroring
    /// Python's `v = C(...)` assignment tracking.
    fn handle_new(&mut self, node: Node, scope: &str) {
        let Some(constructor) = node.child_by_field_name("constructor") else {
            return;
        };
        let class_name = match constructor.kind() {
            "identifier" => self.cst.text_of_lossy(&constructor),
            "member_expression" => constructor
                .child_by_field_name("property")
                .map(|p| self.cst.text_of_lossy(&p))
                .unwrap_or_default(),
            _ => return,
        };
        if !self.class_names.contains(&class_name) {
            return;
        }
        let Some(parent) = node.parent() else {
            return;
        };
        if parent.kind() != "variable_declarator" {
            return;
        }
        let Some(name_node) = parent.child_by_field_name("name") else {
            return;
        };
        if name_node.kind() != "identifier" {
            return;
        }
        let var_name = self.cst.text_of_lossy(&name_node);
        self.type_registry.bind(&self.file, scope, &var_name, &class_name);
    }

    /// `<MyComponent />` / `<MyComponent>...</MyComponent>` references the
    /// component function or class by name, even though it never appears
    /// in call position — a JSX element usage is functionally a call.
    fn handle_jsx(&mut self, node: Node, scope: &str) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let name = self.cst.text_of_lossy(&name_node);
        // Lowercase-leading tags are host elements (`div`, `span`), never
        // user-defined components.
        if name.chars().next().map(char::is_lowercase).unwrap_or(true) {
            return;
        }
        if let Some(target) = self.imported_targets.get(&name).cloned() {
            let idx = self.push(name, scope, ReferenceKind::Call);
            self.out[idx].target_file = Some(target);
        } else {
            self.push(name, scope, ReferenceKind::Call);
        }
    }

    /// A TypeScript type annotation (`: SomeType`) references the named
    /// type the same way a Python type hint does (§4.7).
    fn handle_type_annotation(&mut self, node: Node, scope: &str) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if matches!(child.kind(), "type_identifier" | "generic_type") {
                let type_node = if child.kind() == "generic_type" {
                    child.child_by_field_name("name").unwrap_or(child)
                } else {
                    child
                };
                let name = self.cst.text_of_lossy(&type_node);
                self.push(name, scope, ReferenceKind::TypeHint);
            }
        }
    }
}

/// Every identifier occurring textually after a function's `return`-like
/// teardown boundary is out of scope for JS/TS (no `asynccontextmanager`
/// analogue); this family's heuristic pass is limited to what the CST walk
/// above does not already cover as a structural reference: decorated class
/// members (Angular/NestJS DI tokens passed as decorator arguments).
fn apply_heuristics(entities: &[Entity], out: &mut Vec<CandidateReference>) {
    for entity in entities {
        if entity.kind != EntityKind::Method && entity.kind != EntityKind::Class {
            continue;
        }
        for decorator in &entity.decorators {
            // `@Inject(SOME_TOKEN)` / `@UseGuards(AuthGuard)` style DI
            // decorators name another symbol as a bare identifier argument.
            if let Some(start) = decorator.find('(') {
                if let Some(end) = decorator.rfind(')') {
                    if end > start {
                        let inner = &decorator[start + 1..end];
                        let token = inner.trim();
                        if !token.is_empty()
                            && token.chars().next().map(char::is_alphabetic).unwrap_or(false)
                            && token.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '.')
                        {
                            out.push(CandidateReference::new(
                                last_segment(token),
                                entity.file_path.clone(),
                                ReferenceKind::Attribute,
                            ));
                        }
                    }
                }
            }
        }
    }
}

/// Walk `cst` a second time, producing every candidate reference the file
/// contains (§4.7), mirroring `ingest::python::ingest`'s contract.
pub fn ingest(
    cst: &Cst,
    entities: &[Entity],
    imports: &[Import],
    dep_builder: &DependencyGraphBuilder,
    type_registry: &mut VariableTypeRegistry,
) -> Vec<CandidateReference> {
    let imported_targets = build_import_targets(imports, dep_builder);
    let class_names: FxHashSet<String> = entities
        .iter()
        .filter(|e| e.kind == EntityKind::Class)
        .map(|e| e.name.clone())
        .collect();

    let mut walker = Walker {
        cst,
        file: cst.file_path.clone(),
        imported_targets,
        class_names,
        type_registry,
        out: Vec::new(),
    };
    walker.walk(cst.root_node(), None, MODULE_SCOPE);
    let mut out = walker.out;

    apply_heuristics(entities, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depgraph::KnownFiles;
    use crate::parser::adapter::ParserAdapter;
    use std::path::Path;

    fn parse(path: &str, source: &str) -> Cst {
        let adapter = ParserAdapter::new();
        adapter
            .parse(source.as_bytes(), Path::new(path))
            .expect("parse")
            .expect("typescript is a supported extension")
    }

    #[test]
    fn this_call_emits_class_context_candidate() {
        let source = "class C {\n  run() {\n    this.helper();\n  }\n  helper() {}\n}\n";
        let cst = parse("a.ts", source);
        let entities_result = crate::entities::extract(&cst);
        let known = KnownFiles::new(Path::new("/proj"), vec!["/proj/a.ts".to_string()]);
        let builder = DependencyGraphBuilder::new(&known);
        let mut registry = VariableTypeRegistry::new();
        let candidates = ingest(&cst, &entities_result.entities, &entities_result.imports, &builder, &mut registry);
        assert!(candidates
            .iter()
            .any(|c| c.symbol_name == "helper" && c.class_context.as_deref() == Some("C")));
    }

    #[test]
    fn jsx_element_usage_emits_call_candidate() {
        let source = "import Widget from './widget';\nfunction App() {\n  return <Widget />;\n}\n";
        let cst = parse("a.tsx", source);
        let entities_result = crate::entities::extract(&cst);
        let known = KnownFiles::new(
            Path::new("/proj"),
            vec!["/proj/a.tsx".to_string(), "/proj/widget.tsx".to_string()],
        );
        let builder = DependencyGraphBuilder::new(&known);
        let mut registry = VariableTypeRegistry::new();
        let candidates = ingest(&cst, &entities_result.entities, &entities_result.imports, &builder, &mut registry);
        assert!(candidates.iter().any(|c| c.symbol_name == "Widget"));
    }

    #[test]
    fn new_expression_binds_type_registry() {
        let source = "class Service {\n  call() {}\n}\nfunction run() {\n  const s = new Service();\n  s.call();\n}\n";
        let cst = parse("a.ts", source);
        let entities_result = crate::entities::extract(&cst);
        let known = KnownFiles::new(Path::new("/proj"), vec!["/proj/a.ts".to_string()]);
        let builder = DependencyGraphBuilder::new(&known);
        let mut registry = VariableTypeRegistry::new();
        let candidates = ingest(&cst, &entities_result.entities, &entities_result.imports, &builder, &mut registry);
        assert!(candidates
            .iter()
            .any(|c| c.symbol_name == "call" && c.class_context.as_deref() == Some("Service")));
    }
}
