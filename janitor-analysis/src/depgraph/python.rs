//! Python import resolution (§4.5).

use std::path::{Path, PathBuf};

use janitor_core::types::Import;

use super::KnownFiles;

/// Try `<base>.py` then `<base>/__init__.py`, in that order, returning the
/// first that's a known project file.
fn try_module_path(known: &KnownFiles, base: &Path) -> Option<PathBuf> {
    let as_file = base.with_extension("py");
    if known.contains(&as_file) {
        return Some(as_file);
    }
    let as_package = base.join("__init__.py");
    if known.contains(&as_package) {
        return Some(as_package);
    }
    None
}

fn descend(start: &Path, module: &str) -> PathBuf {
    let mut path = start.to_path_buf();
    if module.is_empty() {
        return path;
    }
    for segment in module.split('.') {
        if !segment.is_empty() {
            path = path.join(segment);
        }
    }
    path
}

pub fn resolve(known: &KnownFiles, importer: &Path, import: &Import) -> Vec<PathBuf> {
    if import.is_relative {
        // `relative_level` leading dots; level 1 means "this package" (the
        // importer's own directory), each further level walks one
        // directory up (§4.5: "walk relative_level - 1 directories up").
        let importer_dir = importer.parent().unwrap_or(Path::new(""));
        let mut base_dir = importer_dir.to_path_buf();
        for _ in 0..import.relative_level.saturating_sub(1) {
            base_dir = base_dir
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or(base_dir);
        }
        let candidate_base = descend(&base_dir, &import.module);
        return try_module_path(known, &candidate_base).into_iter().collect();
    }

    // Absolute import: try the project root first, then a conventional
    // `src/` root if present, stopping at the first resolution (§4.5).
    let candidate_root = descend(known.root(), &import.module);
    if let Some(hit) = try_module_path(known, &candidate_root) {
        return vec![hit];
    }
    if known.has_src_root() {
        let candidate_src = descend(&known.root().join("src"), &import.module);
        if let Some(hit) = try_module_path(known, &candidate_src) {
            return vec![hit];
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known(root: &str, files: &[&str]) -> KnownFiles {
        KnownFiles::new(
            Path::new(root),
            files.iter().map(|f| format!("{root}/{f}")),
        )
    }

    #[test]
    fn resolves_relative_single_dot() {
        let k = known("/proj", &["pkg/a.py", "pkg/b.py"]);
        let import = Import {
            module: "b".into(),
            names: vec!["x".into()],
            is_relative: true,
            relative_level: 1,
            file_path: "/proj/pkg/a.py".into(),
        };
        let resolved = resolve(&k, Path::new("/proj/pkg/a.py"), &import);
        assert_eq!(resolved, vec![PathBuf::from("/proj/pkg/b.py")]);
    }

    #[test]
    fn resolves_absolute_to_package_init() {
        let k = known("/proj", &["pkg/__init__.py", "main.py"]);
        let import = Import {
            module: "pkg".into(),
            names: vec![],
            is_relative: false,
            relative_level: 0,
            file_path: "/proj/main.py".into(),
        };
        let resolved = resolve(&k, Path::new("/proj/main.py"), &import);
        assert_eq!(resolved, vec![PathBuf::from("/proj/pkg/__init__.py")]);
    }

    #[test]
    fn unresolved_import_dropped_silently() {
        let k = known("/proj", &["main.py"]);
        let import = Import {
            module: "numpy".into(),
            names: vec![],
            is_relative: false,
            relative_level: 0,
            file_path: "/proj/main.py".into(),
        };
        assert!(resolve(&k, Path::new("/proj/main.py"), &import).is_empty());
    }
}
