//! Python entity/import extraction (§4.2).
//!
//! For Python, `qualified_name` is `Class.Method` for methods and `name`
//! otherwise. Decorators are preserved as source-text fragments (including
//! the leading `@`) to feed the Wisdom Registry (§4.3).

use janitor_core::types::entity::{ByteRange, LineRange};
use janitor_core::types::{Entity, EntityKind, Import};
use tree_sitter::Node;

use super::ExtractionResult;
use crate::parser::Cst;

pub fn extract(cst: &Cst) -> ExtractionResult {
    let mut out = ExtractionResult::default();
    let root = cst.root_node();
    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        visit_top_level(cst, &child, &mut out);
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

fn is_async(cst: &Cst, node: &Node) -> bool {
    cst.text_of_lossy(node).trim_start().starts_with("async")
}

/// Unwraps a `decorated_definition`, returning its decorator text fragments
/// and the inner `function_definition`/`class_definition` node.
fn unwrap_decorated<'a>(cst: &Cst, node: &'a Node<'a>) -> (Vec<String>, Option<Node<'a>>) {
    if node.kind() != "decorated_definition" {
        return (Vec::new(), Some(*node));
    }
    let mut decorators = Vec::new();
    let mut inner = None;
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "decorator" => decorators.push(cst.text_of_lossy(&child)),
            "function_definition" | "class_definition" => inner = Some(child),
            _ => {}
        }
    }
    (decorators, inner)
}

fn visit_top_level(cst: &Cst, node: &Node, out: &mut ExtractionResult) {
    match node.kind() {
        "decorated_definition" => {
            let (decorators, inner) = unwrap_decorated(cst, node);
            if let Some(inner) = inner {
                visit_definition(cst, &inner, decorators, None, &[], out);
            }
        }
        "function_definition" => visit_definition(cst, node, Vec::new(), None, &[], out),
        "class_definition" => visit_class(cst, node, Vec::new(), out),
        "expression_statement" => visit_module_assignment(cst, node, out),
        "import_statement" => extract_import_statement(cst, node, out),
        "import_from_statement" => extract_import_from_statement(cst, node, out),
        _ => {}
    }
}

fn visit_definition(
    cst: &Cst,
    node: &Node,
    decorators: Vec<String>,
    parent_class: Option<&str>,
    base_classes: &[String],
    out: &mut ExtractionResult,
) {
    let Some(name_node) = node.child_by_field_name("name") else {
        return;
    };
    let name = cst.text_of_lossy(&name_node);
    let kind = if parent_class.is_some() {
        EntityKind::Method
    } else if is_async(cst, node) {
        EntityKind::AsyncFunction
    } else {
        EntityKind::Function
    };
    let qualified_name = match parent_class {
        Some(class) => format!("{class}.{name}"),
        None => name.clone(),
    };

    out.entities.push(Entity {
        name,
        kind,
        file_path: cst.file_path.clone(),
        byte_range: byte_range_of(node),
        line_range: line_range_of(node),
        qualified_name,
        parent_class: parent_class.map(str::to_owned),
        base_classes: base_classes.to_vec(),
        decorators,
        structural_hash: None,
        protected_by: None,
    });
}

fn visit_class(cst: &Cst, node: &Node, decorators: Vec<String>, out: &mut ExtractionResult) {
    let Some(name_node) = node.child_by_field_name("name") else {
        return;
    };
    let class_name = cst.text_of_lossy(&name_node);

    let base_classes = node
        .child_by_field_name("superclasses")
        .map(|args| {
            let mut cursor = args.walk();
            args.children(&mut cursor)
                .filter(|c| matches!(c.kind(), "identifier" | "attribute"))
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
    for member in body.children(&mut cursor) {
        match member.kind() {
            "decorated_definition" => {
                let (decorators, inner) = unwrap_decorated(cst, &member);
                if let Some(inner) = inner {
                    if inner.kind() == "function_definition" {
                        visit_definition(
                            cst,
                            &inner,
                            decorators,
                            Some(&class_name),
                            &base_classes,
                            out,
                        );
                    }
                }
            }
            "function_definition" => {
                visit_definition(cst, &member, Vec::new(), Some(&class_name), &base_classes, out)
            }
            _ => {}
        }
    }
}

/// Module-level `name = value` assignment — the only shape the spec counts
/// as a `ModuleVariable` entity (bare left-hand-side name).
fn visit_module_assignment(cst: &Cst, stmt: &Node, out: &mut ExtractionResult) {
    let mut cursor = stmt.walk();
    let Some(assignment) = stmt
        .children(&mut cursor)
        .find(|c| c.kind() == "assignment")
    else {
        return;
    };
    let Some(left) = assignment.child_by_field_name("left") else {
        return;
    };
    if left.kind() != "identifier" {
        return;
    }
    let name = cst.text_of_lossy(&left);
    out.entities.push(Entity {
        name: name.clone(),
        kind: EntityKind::ModuleVariable,
        file_path: cst.file_path.clone(),
        byte_range: byte_range_of(stmt),
        line_range: line_range_of(stmt),
        qualified_name: name,
        parent_class: None,
        base_classes: Vec::new(),
        decorators: Vec::new(),
        structural_hash: None,
        protected_by: None,
    });
}

fn extract_import_statement(cst: &Cst, node: &Node, out: &mut ExtractionResult) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        let module = match child.kind() {
            "dotted_name" => cst.text_of_lossy(&child),
            "aliased_import" => child
                .child_by_field_name("name")
                .map(|n| cst.text_of_lossy(&n))
                .unwrap_or_default(),
            _ => continue,
        };
        if module.is_empty() {
            continue;
        }
        out.imports.push(Import {
            module,
            names: Vec::new(),
            is_relative: false,
            relative_level: 0,
            file_path: cst.file_path.clone(),
        });
    }
}

fn extract_import_from_statement(cst: &Cst, node: &Node, out: &mut ExtractionResult) {
    let Some(module_node) = node.child_by_field_name("module_name") else {
        return;
    };

    let (module, is_relative, relative_level) = if module_node.kind() == "relative_import" {
        let text = cst.text_of_lossy(&module_node);
        let level = text.chars().take_while(|&c| c == '.').count().max(1);
        let rest = text.trim_start_matches('.').to_string();
        (rest, true, level as u32)
    } else {
        (cst.text_of_lossy(&module_node), false, 0)
    };

    let mut cursor = node.walk();
    let mut any_name = false;
    for child in node.children(&mut cursor) {
        let local_name = match child.kind() {
            "dotted_name" | "identifier" if child.byte_range() != module_node.byte_range() => {
                Some(cst.text_of_lossy(&child))
            }
            "aliased_import" => child
                .child_by_field_name("alias")
                .or_else(|| child.child_by_field_name("name"))
                .map(|n| cst.text_of_lossy(&n)),
            "wildcard_import" => Some("*".to_string()),
            _ => None,
        };
        if let Some(name) = local_name {
            any_name = true;
            out.imports.push(Import {
                module: module.clone(),
                names: vec![name],
                is_relative,
                relative_level,
                file_path: cst.file_path.clone(),
            });
        }
    }

    if !any_name {
        out.imports.push(Import {
            module,
            names: Vec::new(),
            is_relative,
            relative_level,
            file_path: cst.file_path.clone(),
        });
    }
}
