//! Test-command autodetection (§4.11): "Autodetects a test command by
//! probing conventional runners (pytest and friends for Python;
//! package-manager test scripts for JS/TS)." A custom command from
//! `JanitorConfig::custom_test_command` always wins over autodetection
//! (§6: "optional... a custom test command").

use std::path::Path;

/// Probe `root` for a conventional test runner, in the order a developer
/// would expect to find one: an explicit override always wins; otherwise
/// Python project markers are checked before falling back to
/// `package.json`'s own `test` script, since a polyglot repo with both is
/// far more often primarily Python with a thin JS frontend than the
/// reverse in this engine's target population (backend services, CLIs,
/// data pipelines).
pub fn detect_test_command(root: &Path, custom: Option<&[String]>) -> Option<Vec<String>> {
    if let Some(custom) = custom {
        if !custom.is_empty() {
            return Some(custom.to_vec());
        }
    }

    if has_pytest_markers(root) {
        return Some(vec!["pytest".to_string(), "-q".to_string()]);
    }

    if let Some(command) = npm_test_command(root) {
        return Some(command);
    }

    None
}

fn has_pytest_markers(root: &Path) -> bool {
    root.join("pytest.ini").is_file()
        || root.join("setup.cfg").is_file()
        || root.join("tox.ini").is_file()
        || root.join("conftest.py").is_file()
        || root.join("tests").is_dir()
        || pyproject_has_pytest_section(root)
}

fn pyproject_has_pytest_section(root: &Path) -> bool {
    let Ok(text) = std::fs::read_to_string(root.join("pyproject.toml")) else {
        return false;
    };
    text.contains("[tool.pytest") || text.contains("pytest")
}

fn npm_test_command(root: &Path) -> Option<Vec<String>> {
    let package_json = root.join("package.json");
    let text = std::fs::read_to_string(&package_json).ok()?;
    let value: serde_json::Value = serde_json::from_str(&text).ok()?;
    value.get("scripts")?.get("test")?;

    if root.join("yarn.lock").is_file() {
        return Some(vec!["yarn".to_string(), "test".to_string()]);
    }
    if root.join("pnpm-lock.yaml").is_file() {
        return Some(vec!["pnpm".to_string(), "test".to_string()]);
    }
    Some(vec!["npm".to_string(), "test".to_string()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_command_always_wins() {
        let dir = tempfile::tempdir().unwrap();
        let custom = vec!["make".to_string(), "test".to_string()];
        assert_eq!(
            detect_test_command(dir.path(), Some(&custom)),
            Some(custom)
        );
    }

    #[test]
    fn detects_pytest_from_tests_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("tests")).unwrap();
        assert_eq!(
            detect_test_command(dir.path(), None),
            Some(vec!["pytest".to_string(), "-q".to_string()])
        );
    }

    #[test]
    fn detects_npm_test_script() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("package.json"),
            r#"{"scripts": {"test": "jest"}}"#,
        )
        .unwrap();
        assert_eq!(
            detect_test_command(dir.path(), None),
            Some(vec!["npm".to_string(), "test".to_string()])
        );
    }

    #[test]
    fn yarn_lock_prefers_yarn_over_npm() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("package.json"),
            r#"{"scripts": {"test": "jest"}}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("yarn.lock"), "").unwrap();
        assert_eq!(
            detect_test_command(dir.path(), None),
            Some(vec!["yarn".to_string(), "test".to_string()])
        );
    }

    #[test]
    fn no_markers_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(detect_test_command(dir.path(), None), None);
    }
}
