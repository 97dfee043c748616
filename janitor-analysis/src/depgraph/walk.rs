//! Project file walk, shared by the dependency graph builder, the orphan
//! detector, and the grep shield: enumerates every source file of a
//! language family under a root, excluding vendored/build directories
//! wholesale by name (§4.5). Canonicalizes every path (symlinks resolved,
//! `..` normalized) so the same file never produces two different graph
//! keys (§4.5). Grounded on the `ignore` crate's `WalkBuilder`, the same
//! crate `drift-analysis`'s scanner uses for its own project walk.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use janitor_core::constants::EXCLUDED_DIRS;

use crate::parser::Language;

/// Enumerate every file under `root` whose extension belongs to
/// `language`'s family, honoring the excluded-directory list unless
/// `include_vendored` is set (§6 flag).
pub fn walk_source_files(root: &Path, language: Language, include_vendored: bool) -> Vec<PathBuf> {
    let mut builder = WalkBuilder::new(root);
    builder.hidden(false).git_ignore(true).git_exclude(true);
    let extensions = language.family_extensions();

    builder
        .filter_entry(move |entry| {
            if include_vendored {
                return true;
            }
            entry
                .file_name()
                .to_str()
                .map(|name| !EXCLUDED_DIRS.contains(&name))
                .unwrap_or(true)
        })
        .build()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .map(|ext| extensions.contains(&ext))
                .unwrap_or(false)
        })
        .map(|entry| canonicalize_best_effort(entry.path()))
        .collect()
}

/// Enumerate every file under `root` regardless of language, for the grep
/// shield (§4.8 shield 5, §9 open question 2: "scanning all files in the
/// project tree not under an excluded directory").
pub fn walk_all_files(root: &Path, include_vendored: bool) -> Vec<PathBuf> {
    let mut builder = WalkBuilder::new(root);
    builder.hidden(false).git_ignore(true).git_exclude(true);

    builder
        .filter_entry(move |entry| {
            if include_vendored {
                return true;
            }
            entry
                .file_name()
                .to_str()
                .map(|name| !EXCLUDED_DIRS.contains(&name))
                .unwrap_or(true)
        })
        .build()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|entry| canonicalize_best_effort(entry.path()))
        .collect()
}

/// Canonicalize if possible; falls back to the as-given path (still
/// `/`-normalized by the caller through [`super::normalize`]) so a file
/// that vanishes between walk and canonicalize doesn't panic the scan.
fn canonicalize_best_effort(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
