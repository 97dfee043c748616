//! Generic recursive walker over a parsed JSON/YAML/TOML tree, collecting
//! every string value reachable under a key in the known config-reference
//! key set (§4.4), regardless of nesting depth — `serverless.yml`'s
//! `functions.upload.handler` (a string nested two levels under `handler`'s
//! *sibling* `functions`) and `package.json`'s `scripts.build` (a string
//! nested *inside* the tracked key `scripts`, keyed by an untracked script
//! name) both fall out of the same walk: once a tracked key is entered,
//! every string anywhere in its subtree is collected.

use janitor_core::constants::CONFIG_REFERENCE_KEYS;

/// One string value found under a tracked key, with the key itself so the
/// scanner can decide how to turn it into candidate symbol names.
pub struct FoundValue {
    pub key: String,
    pub value: String,
}

fn is_tracked_key(key: &str) -> bool {
    CONFIG_REFERENCE_KEYS.iter().any(|k| *k == key)
}

pub fn walk_json(value: &serde_json::Value, out: &mut Vec<FoundValue>) {
    walk_json_inner(value, None, false, out);
}

fn walk_json_inner(
    value: &serde_json::Value,
    current_key: Option<&str>,
    inside_tracked: bool,
    out: &mut Vec<FoundValue>,
) {
    match value {
        serde_json::Value::Object(map) => {
            for (k, v) in map {
                let tracked = inside_tracked || is_tracked_key(k.as_str());
                walk_json_inner(v, Some(k.as_str()), tracked, out);
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                walk_json_inner(item, current_key, inside_tracked, out);
            }
        }
        serde_json::Value::String(s) => {
            let tracked_key = current_key.filter(|k| is_tracked_key(k));
            if inside_tracked || tracked_key.is_some() {
                out.push(FoundValue {
                    key: tracked_key.or(current_key).unwrap_or("").to_string(),
                    value: s.clone(),
                });
            }
        }
        _ => {}
    }
}

pub fn walk_yaml(value: &serde_yaml::Value, out: &mut Vec<FoundValue>) {
    walk_yaml_inner(value, None, false, out);
}

fn walk_yaml_inner(
    value: &serde_yaml::Value,
    current_key: Option<&str>,
    inside_tracked: bool,
    out: &mut Vec<FoundValue>,
) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (k, v) in map {
                let key_str = k.as_str();
                let tracked = inside_tracked || key_str.is_some_and(is_tracked_key);
                walk_yaml_inner(v, key_str, tracked, out);
            }
        }
        serde_yaml::Value::Sequence(items) => {
            for item in items {
                walk_yaml_inner(item, current_key, inside_tracked, out);
            }
        }
        serde_yaml::Value::String(s) => {
            let tracked_key = current_key.filter(|k| is_tracked_key(k));
            if inside_tracked || tracked_key.is_some() {
                out.push(FoundValue {
                    key: tracked_key.or(current_key).unwrap_or("").to_string(),
                    value: s.clone(),
                });
            }
        }
        _ => {}
    }
}

/// TOML's entry-point tables (`[project.scripts]`, `[project.entry-points]`)
/// are keyed by console-script name, not a tracked key; they're handled
/// directly in the scanner via [`super::scanner`]'s dedicated table walk
/// rather than through this generic one, which still covers `command`-
/// style keys anywhere else in a TOML file.
pub fn walk_toml(value: &toml::Value, out: &mut Vec<FoundValue>) {
    walk_toml_inner(value, None, false, out);
}

fn walk_toml_inner(
    value: &toml::Value,
    current_key: Option<&str>,
    inside_tracked: bool,
    out: &mut Vec<FoundValue>,
) {
    match value {
        toml::Value::Table(map) => {
            for (k, v) in map {
                let tracked = inside_tracked || is_tracked_key(k.as_str());
                walk_toml_inner(v, Some(k.as_str()), tracked, out);
            }
        }
        toml::Value::Array(items) => {
            for item in items {
                walk_toml_inner(item, current_key, inside_tracked, out);
            }
        }
        toml::Value::String(s) => {
            let tracked_key = current_key.filter(|k| is_tracked_key(k));
            if inside_tracked || tracked_key.is_some() {
                out.push(FoundValue {
                    key: tracked_key.or(current_key).unwrap_or("").to_string(),
                    value: s.clone(),
                });
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_collects_strings_inside_tracked_subtree() {
        let v: serde_json::Value =
            serde_json::from_str(r#"{"scripts": {"build": "webpack build", "test": "jest"}}"#)
                .unwrap();
        let mut out = Vec::new();
        walk_json(&v, &mut out);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn yaml_collects_nested_handler() {
        let v: serde_yaml::Value =
            serde_yaml::from_str("functions:\n  upload:\n    handler: handlers.image.upload\n")
                .unwrap();
        let mut out = Vec::new();
        walk_yaml(&v, &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].value, "handlers.image.upload");
    }
}
