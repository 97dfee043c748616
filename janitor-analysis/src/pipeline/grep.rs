//! Grep shield corpus builder (§4.8 shield 5, §9 open question 2). Opt-in
//! last resort: read every non-source file in the project (configs,
//! docs, infra manifests, templates — anything NOT in the target
//! language's own file family) and concatenate it into one haystack that
//! the pipeline substring-searches for each otherwise-dead entity's name.
//! Reuses the same walker the dependency graph builder and orphan detector
//! already use, so the shield respects the same `EXCLUDED_DIRS` exclusion.

use std::path::Path;

use crate::depgraph::walk_all_files;
use crate::parser::Language;

/// Concatenate every file under `root` that does not belong to
/// `language`'s own source-file family, skipping anything unreadable or
/// non-UTF-8-lossy-decodable cleanly. Separated by newlines so a pattern
/// can never accidentally span two unrelated files' content.
pub fn build_grep_corpus(root: &Path, language: Language, include_vendored: bool) -> String {
    let family = language.family_extensions();
    let mut corpus = String::new();

    for path in walk_all_files(root, include_vendored) {
        let is_same_family = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| family.contains(&ext))
            .unwrap_or(false);
        if is_same_family {
            continue;
        }
        if let Ok(bytes) = std::fs::read(&path) {
            corpus.push_str(&String::from_utf8_lossy(&bytes));
            corpus.push('\n');
        }
    }

    corpus
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn excludes_same_language_source_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("app.py"), "python_only_marker = 1").unwrap();
        fs::write(dir.path().join("deploy.yaml"), "task: helper_name\n").unwrap();

        let corpus = build_grep_corpus(dir.path(), Language::Python, false);

        assert!(corpus.contains("helper_name"));
        assert!(!corpus.contains("python_only_marker"));
    }
}
