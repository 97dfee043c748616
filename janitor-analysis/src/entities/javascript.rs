//! JavaScript/TypeScript entity/import extraction (§4.2).
//!
//! Default exports are implicitly protected in all non-library modes (§4.2);
//! this extractor only records the fact (an `"@export-default"` decorator
//! marker) — the protection decision itself is the pipeline's job (C8).

use janitor_core::types::entity::{ByteRange, LineRange};
use janitor_core::types::{Entity, EntityKind, Import};
use tree_sitter::Node;

use super::ExtractionResult;
use crate::parser::Cst;

const EXPORT_MARKER: &str = "@export";
const EXPORT_DEFAULT_MARKER: &str = "@export-default";
const EXPORT_NAMED_MARKER: &str = "@export-named";
const EXPORT_STAR_MARKER: &str = "@export-star";

pub fn extract(cst: &Cst) -> ExtractionResult {
    let mut out = ExtractionResult::default();
    let root = cst.root_node();
    let mut cursor = root.walk();
    let mut pending_decorators: Vec<String> = Vec::new();
    for child in root.children(&mut cursor) {
        match child.kind() {
            "decorator" => pending_decorators.push(cst.text_of_lossy(&child)),
            "import_statement" => {
                extract_import(cst, &child, &mut out);
                pending_decorators.clear();
            }
            "export_statement" => {
                visit_export(cst, &child, std::mem::take(&mut pending_decorators), &mut out);
            }
            _ => {
                visit_declaration(cst, &child, std::mem::take(&mut pending_decorators), None, &[], &mut out);
            }
        }
    }
    out
}

fn byte_range_of(node: &Node) -> ByteRange {
    let r = node.byte_range();
    ByteRange::new(r.start, r.end.max(r.start + 1))
}

fn line_range_of(node: &Node) -> LineRange {
    LineRange {
        start: node.start_position().row as u32 + 1,
        end: node.end_position().row as u32 + 1,
    }
}

fn text_starts_with(cst: &Cst, node: &Node, token: &str) -> bool {
    cst.text_of_lossy(node).trim_start().starts_with(token)
}

/// Dispatches a single declaration-shaped node (function, class, lexical/var
/// declaration) to the right entity-producing handler. `decorators` are
/// carried in from any preceding `@decorator` siblings or from the
/// enclosing `export` keyword.
fn visit_declaration(
    cst: &Cst,
    node: &Node,
    mut decorators: Vec<String>,
    parent_class: Option<&str>,
    base_classes: &[String],
    out: &mut ExtractionResult,
) {
    match node.kind() {
        "function_declaration" | "generator_function_declaration" => {
            let Some(name_node) = node.child_by_field_name("name") else {
                return;
            };
            let name = cst.text_of_lossy(&name_node);
            let kind = if text_starts_with(cst, node, "async") {
                EntityKind::AsyncFunction
            } else {
                EntityKind::Function
            };
            out.entities.push(Entity {
                name: name.clone(),
                kind,
                file_path: cst.file_path.clone(),
                byte_range: byte_range_of(node),
                line_range: line_range_of(node),
                qualified_name: name,
                parent_class: None,
                base_classes: Vec::new(),
                decorators,
                structural_hash: None,
                protected_by: None,
            });
        }
        "class_declaration" => visit_class(cst, node, decorators, out),
        "lexical_declaration" | "variable_declaration" => {
            visit_variable_declaration(cst, node, &mut decorators, parent_class, out)
        }
        _ => {}
    }
}

fn visit_class(cst: &Cst, node: &Node, decorators: Vec<String>, out: &mut ExtractionResult) {
    let Some(name_node) = node.child_by_field_name("name") else {
        return;
    };
    let class_name = cst.text_of_lossy(&name_node);

    let base_classes = node
        .child_by_field_name("heritage")
        .map(|h| {
            let mut cursor = h.walk();
            h.children(&mut cursor)
                .filter(|c| matches!(c.kind(), "identifier" | "member_expression"))
                .map(|c| cst.text_of_lossy(&c))
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    out.entities.push(Entity {
        name: class_name.clone(),
        kind: EntityKind::Class,
        file_path: cst.file_path.clone(),
        byte_range: byte_range_of(node),
        line_range: line_range_of(node),
        qualified_name: class_name.clone(),
        parent_class: None,
        base_classes: base_classes.clone(),
        decorators,
        structural_hash: None,
        protected_by: None,
    });

    let Some(body) = node.child_by_field_name("body") else {
        return;
    };
    let mut cursor = body.walk();
    let mut pending_decorators: Vec<String> = Vec::new();
    for member in body.children(&mut cursor) {
        match member.kind() {
            "decorator" => pending_decorators.push(cst.text_of_lossy(&member)),
            "method_definition" => {
                let Some(name_node) = member.child_by_field_name("name") else {
                    pending_decorators.clear();
                    continue;
                };
                let name = cst.text_of_lossy(&name_node);
                let qualified_name = format!("{class_name}.{name}");
                out.entities.push(Entity {
                    name,
                    kind: EntityKind::Method,
                    file_path: cst.file_path.clone(),
                    byte_range: byte_range_of(&member),
                    line_range: line_range_of(&member),
                    qualified_name,
                    parent_class: Some(class_name.clone()),
                    base_classes: base_classes.clone(),
                    decorators: std::mem::take(&mut pending_decorators),
                    structural_hash: None,
                    protected_by: None,
                });
            }
            _ => {
                pending_decorators.clear();
            }
        }
    }
}

fn visit_variable_declaration(
    cst: &Cst,
    node: &Node,
    decorators: &mut Vec<String>,
    parent_class: Option<&str>,
    out: &mut ExtractionResult,
) {
    if parent_class.is_some() {
        return;
    }
    let mut cursor = node.walk();
    for declarator in node.children(&mut cursor) {
        if declarator.kind() != "variable_declarator" {
            continue;
        }
        let Some(name_node) = declarator.child_by_field_name("name") else {
            continue;
        };
        if name_node.kind() != "identifier" {
            continue;
        }
        let name = cst.text_of_lossy(&name_node);
        out.entities.push(Entity {
            name: name.clone(),
            kind: EntityKind::ModuleVariable,
            file_path: cst.file_path.clone(),
            byte_range: byte_range_of(node),
            line_range: line_range_of(node),
            qualified_name: name,
            parent_class: None,
            base_classes: Vec::new(),
            decorators: std::mem::take(decorators),
            structural_hash: None,
            protected_by: None,
        });
    }
}

fn visit_export(cst: &Cst, node: &Node, mut decorators: Vec<String>, out: &mut ExtractionResult) {
    let is_default = node
        .children(&mut node.walk())
        .any(|c| c.kind() == "default");

    if let Some(decl) = node.child_by_field_name("declaration") {
        decorators.push(EXPORT_MARKER.to_string());
        if is_default {
            decorators.push(EXPORT_DEFAULT_MARKER.to_string());
        }
        visit_declaration(cst, &decl, decorators, None, &[], out);
        return;
    }

    let text = cst.text_of_lossy(node);
    if text.contains('*') {
        out.entities.push(export_entity(cst, node, "*", vec![EXPORT_STAR_MARKER.to_string()]));
        return;
    }

    if is_default {
        out.entities.push(export_entity(
            cst,
            node,
            "default",
            vec![EXPORT_DEFAULT_MARKER.to_string()],
        ));
        return;
    }

    // `export { a, b as c };`
    let mut cursor = node.walk();
    for clause in node.children(&mut cursor) {
        if clause.kind() != "export_clause" {
            continue;
        }
        let mut spec_cursor = clause.walk();
        for spec in clause.children(&mut spec_cursor) {
            if spec.kind() != "export_specifier" {
                continue;
            }
            let name = spec
                .child_by_field_name("alias")
                .or_else(|| spec.child_by_field_name("name"))
                .map(|n| cst.text_of_lossy(&n))
                .unwrap_or_default();
            if !name.is_empty() {
                out.entities
                    .push(export_entity(cst, &spec, &name, vec![EXPORT_NAMED_MARKER.to_string()]));
            }
        }
    }
}

fn export_entity(cst: &Cst, node: &Node, name: &str, decorators: Vec<String>) -> Entity {
    Entity {
        name: name.to_string(),
        kind: EntityKind::Export,
        file_path: cst.file_path.clone(),
        byte_range: byte_range_of(node),
        line_range: line_range_of(node),
        qualified_name: name.to_string(),
        parent_class: None,
        base_classes: Vec::new(),
        decorators,
        structural_hash: None,
        protected_by: None,
    }
}

fn extract_import(cst: &Cst, node: &Node, out: &mut ExtractionResult) {
    let Some(source) = node.child_by_field_name("source") else {
        return;
    };
    let module = cst.text_of_lossy(&source).trim_matches(['\'', '"', '`']).to_string();
    let is_relative = module.starts_with('.');

    let mut any_name = false;
    let mut cursor = node.walk();
    for clause in node.children(&mut cursor) {
        match clause.kind() {
            "import_clause" => {
                let mut cc = clause.walk();
                for part in clause.children(&mut cc) {
                    match part.kind() {
                        "identifier" => {
                            any_name = true;
                            out.imports.push(Import {
                                module: module.clone(),
                                names: vec![cst.text_of_lossy(&part)],
                                is_relative,
                                relative_level: is_relative as u32,
                                file_path: cst.file_path.clone(),
                            });
                        }
                        "namespace_import" => {
                            any_name = true;
                            out.imports.push(Import {
                                module: module.clone(),
                                names: vec![cst.text_of_lossy(&part)],
                                is_relative,
                                relative_level: is_relative as u32,
                                file_path: cst.file_path.clone(),
                            });
                        }
                        "named_imports" => {
                            let mut nc = part.walk();
                            for spec in part.children(&mut nc) {
                                if spec.kind() != "import_specifier" {
                                    continue;
                                }
                                let name = spec
                                    .child_by_field_name("alias")
                                    .or_else(|| spec.child_by_field_name("name"))
                                    .map(|n| cst.text_of_lossy(&n));
                                if let Some(name) = name {
                                    any_name = true;
                                    out.imports.push(Import {
                                        module: module.clone(),
                                        names: vec![name],
                                        is_relative,
                                        relative_level: is_relative as u32,
                                        file_path: cst.file_path.clone(),
                                    });
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    if !any_name {
        out.imports.push(Import {
            module,
            names: Vec::new(),
            is_relative,
            relative_level: is_relative as u32,
            file_path: cst.file_path.clone(),
        });
    }
}
