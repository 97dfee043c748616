//! Python ingestion walk (§4.7). Grounded on `entities/python.rs`'s CST
//! walk shape (field-based child access, decorator accumulation through
//! recursion), retargeted from declaration extraction to candidate
//! references, plus the §4.7 language-specific heuristic pass over
//! already-extracted entities and raw source text.

use std::sync::OnceLock;

use regex::Regex;
use tree_sitter::Node;

use janitor_core::types::collections::FxHashSet;
use janitor_core::types::{Entity, EntityKind, Import, ReferenceKind};

use super::{last_segment, slice_lossy};
use crate::depgraph::DependencyGraphBuilder;
use crate::parser::{Cst, Language};
use crate::refs::candidate::CandidateReference;
use crate::refs::type_registry::VariableTypeRegistry;

const MODULE_SCOPE: &str = "<module>";

const ORM_LIFECYCLE_METHODS: &[&str] = &["save", "delete", "update", "create", "get", "filter"];
const ORM_BASE_NAMES: &[&str] = &["Model", "Base", "Document"];
const QT_BASE_HINTS: &[&str] = &["QWidget", "QObject", "QDialog", "QMainWindow", "QThread", "QApplication"];

const PY_KEYWORDS: &[&str] = &[
    "if", "else", "elif", "return", "self", "cls", "None", "True", "False", "and", "or", "not",
    "is", "in", "for", "while", "def", "class", "import", "from", "as", "with", "try", "except",
    "finally", "raise", "yield", "await", "async", "pass", "break", "continue", "lambda",
    "global", "nonlocal", "assert", "del",
];

fn is_orm_base(name: &str) -> bool {
    let simple = name.rsplit('.').next().unwrap_or(name);
    ORM_BASE_NAMES.contains(&simple)
}

fn is_qt_base(name: &str) -> bool {
    let simple = name.rsplit('.').next().unwrap_or(name);
    QT_BASE_HINTS.iter().any(|hint| simple == *hint || simple.starts_with('Q'))
}

fn qt_slot_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^on_[A-Za-z0-9]+_[A-Za-z0-9]+$").unwrap())
}

fn depends_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(?:Depends|Security|Inject)\(\s*([A-Za-z_][\w\.]*)").unwrap()
    })
}

fn task_call_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\b(?:signature|get_model)\(\s*['"]([\w\.]+)['"]"#).unwrap()
    })
}

fn dependency_override_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"dependency_overrides\[\s*[\w\.]+\s*\]\s*=\s*([A-Za-z_][\w\.]*)").unwrap()
    })
}

fn forward_ref_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#":\s*['"]([A-Za-z_][\w\.]*)['"]"#).unwrap())
}

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").unwrap())
}

/// Resolve each file-local import to a canonical target file, keyed by the
/// name it binds locally — `import x` binds `x` (first dotted segment,
/// since Python binds the top package name); `from x import a` binds `a`.
fn build_import_targets(
    imports: &[Import],
    dep_builder: &DependencyGraphBuilder,
) -> janitor_core::types::collections::FxHashMap<String, String> {
    let mut targets = janitor_core::types::collections::FxHashMap::default();
    for import in imports {
        let resolved = dep_builder.resolve(import, Language::Python);
        let Some(target) = resolved.into_iter().next() else {
            continue;
        };
        let target = crate::depgraph::normalize(&target);
        if import.is_bare() {
            let bound = import.module.split('.').next().unwrap_or(&import.module);
            targets.entry(bound.to_string()).or_insert_with(|| target.clone());
        } else {
            for name in &import.names {
                targets.entry(name.clone()).or_insert_with(|| target.clone());
            }
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

    /// Push a candidate and return its index so callers can set
    /// `target_file`/`class_context` afterward without fighting the
    /// consuming-`self` builder methods on [`CandidateReference`].
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
            "function_definition" => return self.handle_function(node, class_context, scope),
            "class_definition" => return self.handle_class(node, scope),
            "decorated_definition" => {
                let mut cursor = node.walk();
                for child in node.children(&mut cursor) {
                    if matches!(child.kind(), "function_definition" | "class_definition") {
                        self.walk(child, class_context, scope);
                    }
                }
                return;
            }
            "if_statement" => return self.handle_if(node, class_context, scope),
            "call" => self.handle_call(node, class_context, scope),
            "assignment" => self.handle_assignment(node, class_context, scope),
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

    fn isinstance_binding(&self, node: &Node) -> Option<(String, String)> {
        if node.kind() != "call" {
            return None;
        }
        let func = node.child_by_field_name("function")?;
        if func.kind() != "identifier" || self.cst.text_of_lossy(&func) != "isinstance" {
            return None;
        }
        let args = node.child_by_field_name("arguments")?;
        let mut cursor = args.walk();
        let positional: Vec<Node> = args
            .children(&mut cursor)
            .filter(|c| matches!(c.kind(), "identifier" | "attribute" | "tuple"))
            .collect();
        if positional.len() < 2 {
            return None;
        }
        let v = self.cst.text_of_lossy(&positional[0]);
        let t_full = self.cst.text_of_lossy(&positional[1]);
        Some((v, last_segment(&t_full)))
    }

    fn handle_if(&mut self, node: Node, class_context: Option<&str>, scope: &str) {
        let condition = node.child_by_field_name("condition");
        if let Some(cond) = condition {
            self.walk(cond, class_context, scope);
        }
        let narrow = condition.as_ref().and_then(|c| self.isinstance_binding(c));
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
                if name == "isinstance" {
                    return;
                }
                if let Some(target) = self.imported_targets.get(&name).cloned() {
                    let idx = self.push(name, scope, ReferenceKind::Call);
                    self.out[idx].target_file = Some(target);
                } else {
                    self.push(name, scope, ReferenceKind::Call);
                }
            }
            "attribute" => {
                let Some(obj) = function.child_by_field_name("object") else {
                    return;
                };
                let Some(attr) = function.child_by_field_name("attribute") else {
                    return;
                };
                let obj_text = self.cst.text_of_lossy(&obj);
                let attr_name = self.cst.text_of_lossy(&attr);

                if let Some(target) = self.imported_targets.get(&obj_text).cloned() {
                    let idx = self.push(attr_name, scope, ReferenceKind::Call);
                    self.out[idx].target_file = Some(target);
                    return;
                }

                let class_ctx = if obj_text == "self" || obj_text == "cls" {
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
                        let idx = self.push(attr_name, scope, ReferenceKind::Call);
                        self.out[idx].class_context = Some(cc);
                    }
                    None => {
                        self.push(attr_name, scope, ReferenceKind::Attribute);
                    }
                }
            }
            _ => {}
        }
    }

    fn handle_assignment(&mut self, node: Node, _class_context: Option<&str>, scope: &str) {
        let Some(left) = node.child_by_field_name("left") else {
            return;
        };
        if left.kind() != "identifier" {
            return;
        }
        let Some(right) = node.child_by_field_name("right") else {
            return;
        };
        if right.kind() != "call" {
            return;
        }
        let Some(func) = right.child_by_field_name("function") else {
            return;
        };
        let callee = match func.kind() {
            "identifier" => self.cst.text_of_lossy(&func),
            "attribute" => match func.child_by_field_name("attribute") {
                Some(attr) => self.cst.text_of_lossy(&attr),
                None => return,
            },
            _ => return,
        };
        if self.class_names.contains(&callee) {
            let var_name = self.cst.text_of_lossy(&left);
            self.type_registry.bind(&self.file, scope, &var_name, &callee);
        }
    }
}

fn self_reference(out: &mut Vec<CandidateReference>, entity: &Entity) {
    let mut candidate =
        CandidateReference::new(entity.name.clone(), entity.file_path.clone(), ReferenceKind::Attribute)
            .with_target_file(entity.file_path.clone());
    if let Some(parent) = &entity.parent_class {
        candidate = candidate.with_class_context(parent.clone());
    }
    out.push(candidate);
}

/// The §4.7 "language-specific heuristics" pass: text/entity-table driven,
/// run once per file after the structural CST walk.
fn apply_heuristics(cst: &Cst, entities: &[Entity], out: &mut Vec<CandidateReference>) {
    let file = &cst.file_path;
    let source = cst.text_of_lossy(&cst.root_node());

    for caps in depends_re().captures_iter(&source) {
        out.push(CandidateReference::new(
            last_segment(&caps[1]),
            file.clone(),
            ReferenceKind::TypeHint,
        ));
    }
    for caps in task_call_re().captures_iter(&source) {
        out.push(CandidateReference::new(
            last_segment(&caps[1]),
            file.clone(),
            ReferenceKind::String,
        ));
    }
    for caps in dependency_override_re().captures_iter(&source) {
        out.push(CandidateReference::new(
            last_segment(&caps[1]),
            file.clone(),
            ReferenceKind::Attribute,
        ));
    }
    for caps in forward_ref_re().captures_iter(&source) {
        out.push(CandidateReference::new(
            last_segment(&caps[1]),
            file.clone(),
            ReferenceKind::String,
        ));
    }

    let is_conftest =
        file.rsplit('/').next() == Some("conftest.py") && source.contains("pytest");

    for entity in entities.iter().filter(|e| &e.file_path == file) {
        let decorator_text = entity.decorators.join(" ");

        if decorator_text.contains("pytest.fixture")
            || (is_conftest && matches!(entity.kind, EntityKind::Function | EntityKind::AsyncFunction))
        {
            self_reference(out, entity);
        }
        if decorator_text.contains("declared_attr") || decorator_text.contains("hybrid_property") {
            self_reference(out, entity);
        }
        if decorator_text.contains("asynccontextmanager") {
            let body = slice_lossy(cst, entity.byte_range);
            if let Some(pos) = body.find("yield") {
                let after = &body[pos + "yield".len()..];
                let mut seen = FxHashSet::default();
                for m in identifier_re().find_iter(after) {
                    let name = m.as_str();
                    if PY_KEYWORDS.contains(&name) || !seen.insert(name.to_string()) {
                        continue;
                    }
                    out.push(CandidateReference::new(name, file.clone(), ReferenceKind::Attribute));
                }
            }
        }

        if entity.kind == EntityKind::Method {
            if ORM_LIFECYCLE_METHODS.contains(&entity.name.as_str())
                && entity.base_classes.iter().any(|b| is_orm_base(b))
            {
                self_reference(out, entity);
            }
            if entity.base_classes.iter().any(|b| is_qt_base(b)) && qt_slot_re().is_match(&entity.name) {
                self_reference(out, entity);
            }
        }

        if entity.kind == EntityKind::Class {
            let body = slice_lossy(cst, entity.byte_range);
            if body.contains("__tablename__") || body.contains("__mapper_args__") || body.contains("__abstract__") {
                self_reference(out, entity);
            }
            if body.contains("alias_generator") {
                self_reference(out, entity);
            }
        }
    }
}

/// Walk `cst` a second time, producing every candidate reference the file
/// contains (§4.7). `entities` must be this file's own entities (already
/// extracted by C2); `imports` this file's own import records; `dep_builder`
/// resolves them to target files exactly as the dependency graph builder
/// does, so cross-module resolution agrees with the file graph.
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

    apply_heuristics(cst, entities, &mut out);
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
            .expect("python is a supported extension")
    }

    #[test]
    fn self_call_emits_class_context_candidate() {
        let source = "class C:\n    def run(self):\n        self._helper()\n\n    def _helper(self):\n        pass\n";
        let cst = parse("a.py", source);
        let entities_result = crate::entities::extract(&cst);
        let known = KnownFiles::new(Path::new("/proj"), vec!["/proj/a.py".to_string()]);
        let builder = DependencyGraphBuilder::new(&known);
        let mut registry = VariableTypeRegistry::new();
        let candidates = ingest(&cst, &entities_result.entities, &entities_result.imports, &builder, &mut registry);
        assert!(candidates
            .iter()
            .any(|c| c.symbol_name == "_helper" && c.class_context.as_deref() == Some("C")));
    }

    #[test]
    fn pytest_fixture_gets_self_reference() {
        let source = "import pytest\n\n@pytest.fixture\ndef client():\n    pass\n";
        let cst = parse("conftest.py", source);
        let entities_result = crate::entities::extract(&cst);
        let known = KnownFiles::new(Path::new("/proj"), vec!["/proj/conftest.py".to_string()]);
        let builder = DependencyGraphBuilder::new(&known);
        let mut registry = VariableTypeRegistry::new();
        let candidates = ingest(&cst, &entities_result.entities, &entities_result.imports, &builder, &mut registry);
        assert!(candidates
            .iter()
            .any(|c| c.symbol_name == "client" && c.target_file.as_deref() == Some("conftest.py")));
    }

    #[test]
    fn depends_type_hint_produces_candidate() {
        let source = "def route(token: str = Depends(get_current_user)):\n    pass\n";
        let cst = parse("a.py", source);
        let entities_result = crate::entities::extract(&cst);
        let known = KnownFiles::new(Path::new("/proj"), vec!["/proj/a.py".to_string()]);
        let builder = DependencyGraphBuilder::new(&known);
        let mut registry = VariableTypeRegistry::new();
        let candidates = ingest(&cst, &entities_result.entities, &entities_result.imports, &builder, &mut registry);
        assert!(candidates
            .iter()
            .any(|c| c.symbol_name == "get_current_user" && c.kind == ReferenceKind::TypeHint));
    }
}
