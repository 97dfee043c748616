//! JS/TS import resolution (§4.5).

use std::path::{Path, PathBuf};

use janitor_core::types::Import;

use super::KnownFiles;

const EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx"];

/// Try `<base>.<ext>` for each extension, then `<base>/index.<ext>`,
/// returning the first that's a known project file (§4.5: "trying
/// extensions ... and the `index.*` forms in any matching directory").
fn try_specifier_path(known: &KnownFiles, base: &Path) -> Option<PathBuf> {
    if known.contains(base) {
        return Some(base.to_path_buf());
    }
    for ext in EXTENSIONS {
        let as_file = base.with_extension(ext);
        if known.contains(&as_file) {
            return Some(as_file);
        }
    }
    for ext in EXTENSIONS {
        let as_index = base.join(format!("index.{ext}"));
        if known.contains(&as_index) {
            return Some(as_index);
        }
    }
    None
}

pub fn resolve(known: &KnownFiles, importer: &Path, import: &Import) -> Vec<PathBuf> {
    if import.is_relative {
        let importer_dir = importer.parent().unwrap_or(Path::new(""));
        let candidate = importer_dir.join(&import.module);
        return try_specifier_path(known, &candidate).into_iter().collect();
    }

    // Non-relative: attempt project-root resolution with the same
    // extension set; anything unresolved is an external package and is
    // ignored (§4.5).
    let candidate = known.root().join(&import.module);
    try_specifier_path(known, &candidate).into_iter().collect()
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
    fn resolves_relative_with_extension() {
        let k = known("/proj", &["src/a.ts", "src/b.ts"]);
        let import = Import {
            module: "./b".into(),
            names: vec!["x".into()],
            is_relative: true,
            relative_level: 1,
            file_path: "/proj/src/a.ts".into(),
        };
        let resolved = resolve(&k, Path::new("/proj/src/a.ts"), &import);
        assert_eq!(resolved, vec![PathBuf::from("/proj/src/b.ts")]);
    }

    #[test]
    fn resolves_relative_directory_to_index() {
        let k = known("/proj", &["src/a.ts", "src/utils/index.ts"]);
        let import = Import {
            module: "./utils".into(),
            names: vec![],
            is_relative: true,
            relative_level: 1,
            file_path: "/proj/src/a.ts".into(),
        };
        let resolved = resolve(&k, Path::new("/proj/src/a.ts"), &import);
        assert_eq!(resolved, vec![PathBuf::from("/proj/src/utils/index.ts")]);
    }

    #[test]
    fn non_relative_external_package_ignored() {
        let k = known("/proj", &["src/a.ts"]);
        let import = Import {
            module: "react".into(),
            names: vec!["useState".into()],
            is_relative: false,
            relative_level: 0,
            file_path: "/proj/src/a.ts".into(),
        };
        assert!(resolve(&k, Path::new("/proj/src/a.ts"), &import).is_empty());
    }
}
