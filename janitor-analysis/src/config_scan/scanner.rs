//! `ConfigReferenceScanner` — drives the per-format extraction and turns
//! every found string into one or more candidate symbol names (§4.4).

use std::fs;
use std::path::{Path, PathBuf};

use janitor_core::constants::{DAG_DIR, GITHUB_WORKFLOWS_DIR, SCANNED_CONFIG_FILES};

use super::python_text;
use super::value_walker::{self, FoundValue};

/// A candidate symbol name harvested from an infrastructure file, tagged
/// with the config file it came from so the tracker can attribute the
/// synthetic reference's `source_file` (§4.4: "source_file set to the
/// config file path").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigReference {
    /// Final dotted segment, e.g. `upload` from `handlers.image.upload`.
    pub name: String,
    /// Full dotted form as written, preserved for qualified-name
    /// resolution (§4.4 step 2).
    pub full: String,
    pub source_file: String,
}

#[derive(Debug, Default)]
pub struct ConfigReferenceScanner;

impl ConfigReferenceScanner {
    pub fn new() -> Self {
        Self
    }

    /// Scan `root` and every immediate child directory for the fixed set
    /// of infrastructure files (§4.4, §6), plus `dags/*.py` and
    /// `.github/workflows/*.yml`.
    pub fn scan_project(&self, root: &Path) -> Vec<ConfigReference> {
        let mut refs = Vec::new();

        for candidate in self.candidate_config_paths(root) {
            self.scan_file(&candidate, &mut refs);
        }

        let dags_dir = root.join(DAG_DIR);
        if dags_dir.is_dir() {
            if let Ok(entries) = fs::read_dir(&dags_dir) {
                for entry in entries.flatten() {
                    let path = entry.path();
                    if path.extension().and_then(|e| e.to_str()) == Some("py") {
                        self.scan_python_file(&path, &mut refs);
                    }
                }
            }
        }

        let workflows_dir = root.join(GITHUB_WORKFLOWS_DIR);
        if workflows_dir.is_dir() {
            if let Ok(entries) = fs::read_dir(&workflows_dir) {
                for entry in entries.flatten() {
                    let path = entry.path();
                    let ext = path.extension().and_then(|e| e.to_str());
                    if matches!(ext, Some("yml") | Some("yaml")) {
                        self.scan_yaml_file(&path, &mut refs);
                    }
                }
            }
        }

        refs
    }

    /// Enumerate every `SCANNED_CONFIG_FILES` name at `root` and one level
    /// deep (§4.4: "at project root (and one level deep)").
    fn candidate_config_paths(&self, root: &Path) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        for name in SCANNED_CONFIG_FILES {
            let direct = root.join(name);
            if direct.is_file() {
                paths.push(direct);
            }
        }
        if let Ok(entries) = fs::read_dir(root) {
            for entry in entries.flatten() {
                let dir = entry.path();
                if !dir.is_dir() {
                    continue;
                }
                for name in SCANNED_CONFIG_FILES {
                    let nested = dir.join(name);
                    if nested.is_file() {
                        paths.push(nested);
                    }
                }
            }
        }
        paths
    }

    fn scan_file(&self, path: &Path, refs: &mut Vec<ConfigReference>) {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return;
        };
        match name {
            "settings.py" => self.scan_python_file(path, refs),
            "pyproject.toml" => self.scan_toml_file(path, refs),
            "package.json" => self.scan_json_file(path, refs),
            "tsconfig.json" => {} // no config-reference keys live here
            _ => self.scan_yaml_file(path, refs),
        }
    }

    fn scan_python_file(&self, path: &Path, refs: &mut Vec<ConfigReference>) {
        let Ok(source) = fs::read_to_string(path) else {
            return;
        };
        let mut found = Vec::new();
        python_text::extract_from_python_source(&source, &mut found);
        push_candidates(found, path, refs);
    }

    fn scan_json_file(&self, path: &Path, refs: &mut Vec<ConfigReference>) {
        let Ok(text) = fs::read_to_string(path) else {
            return;
        };
        let Ok(value) = serde_json::from_str::<serde_json::Value>(&text) else {
            return;
        };
        let mut found = Vec::new();
        value_walker::walk_json(&value, &mut found);
        push_candidates(found, path, refs);
    }

    fn scan_yaml_file(&self, path: &Path, refs: &mut Vec<ConfigReference>) {
        let Ok(text) = fs::read_to_string(path) else {
            return;
        };
        let Ok(value) = serde_yaml::from_str::<serde_yaml::Value>(&text) else {
            return;
        };
        let mut found = Vec::new();
        value_walker::walk_yaml(&value, &mut found);
        push_candidates(found, path, refs);
    }

    fn scan_toml_file(&self, path: &Path, refs: &mut Vec<ConfigReference>) {
        let Ok(text) = fs::read_to_string(path) else {
            return;
        };
        let Ok(value) = text.parse::<toml::Value>() else {
            return;
        };
        let mut found = Vec::new();
        value_walker::walk_toml(&value, &mut found);
        // `[project.scripts]` / `[project.entry-points.console_scripts]` are
        // tables keyed by the console-script name whose *value* is the
        // dotted target (`mytool = "mypkg.cli:main"`) — not reachable
        // through the generic leaf-key walk, so handled here directly.
        if let Some(project) = value.get("project") {
            collect_entry_point_table(project.get("scripts"), "scripts", &mut found);
            if let Some(entry_points) = project.get("entry-points") {
                if let toml::Value::Table(groups) = entry_points {
                    for (group, table) in groups {
                        collect_entry_point_table(Some(table), group, &mut found);
                    }
                }
            }
        }
        push_candidates(found, path, refs);
    }
}

fn collect_entry_point_table(table: Option<&toml::Value>, key: &str, out: &mut Vec<FoundValue>) {
    let Some(toml::Value::Table(map)) = table else {
        return;
    };
    for value in map.values() {
        if let toml::Value::String(s) = value {
            // `mypkg.cli:main` — split the module path from the callable.
            let dotted = s.replace(':', ".");
            out.push(FoundValue {
                key: key.to_string(),
                value: dotted,
            });
        }
    }
}

fn push_candidates(found: Vec<FoundValue>, source_path: &Path, refs: &mut Vec<ConfigReference>) {
    let source_file = source_path.display().to_string();
    for value in found {
        let full = value.value;
        let name = full.rsplit(['.', ':', '/']).next().unwrap_or(&full).to_string();
        refs.push(ConfigReference {
            name,
            full,
            source_file: source_file.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn serverless_handler_extracted() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = fs::File::create(dir.path().join("serverless.yml")).unwrap();
        writeln!(
            f,
            "functions:\n  upload:\n    handler: handlers.image.upload"
        )
        .unwrap();
        let scanner = ConfigReferenceScanner::new();
        let refs = scanner.scan_project(dir.path());
        assert!(refs.iter().any(|r| r.name == "upload" && r.full == "handlers.image.upload"));
    }

    #[test]
    fn package_json_scripts_extracted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{"scripts": {"build": "webpack build"}}"#,
        )
        .unwrap();
        let scanner = ConfigReferenceScanner::new();
        let refs = scanner.scan_project(dir.path());
        assert!(refs.iter().any(|r| r.full == "webpack build"));
    }
}
