//! Whole-project hash (§4.9 kind 4, §4.12): the cache key that lets an
//! unchanged tree skip graph construction entirely. Built from every
//! scanned file's content hash plus every config flag that changes the
//! pipeline's *output* for a fixed set of bytes — so flipping `library`
//! mode or `grep-shield` on correctly misses the cache even though no file
//! changed.

use janitor_core::config::{JanitorConfig, LanguageSelector, PipelineMode};
use xxhash_rust::xxh3::Xxh3;

/// `files` must be `(file_path, content_hash)` pairs; order-independent —
/// the caller need not pre-sort, this function does it internally so the
/// same file set always produces the same hash regardless of walk order.
pub fn compute(files: &mut [(String, Vec<u8>)], config: &JanitorConfig) -> String {
    files.sort_by(|a, b| a.0.cmp(&b.0));

    let mut hasher = Xxh3::new();
    for (path, hash) in files.iter() {
        hasher.update(path.as_bytes());
        hasher.update(hash);
    }

    let language_tag: u8 = match config.language {
        Some(LanguageSelector::Python) => 1,
        Some(LanguageSelector::JavaScriptTypeScript) => 2,
        None => 0,
    };
    hasher.update(&[language_tag]);
    hasher.update(&[match config.mode {
        PipelineMode::Application => 0,
        PipelineMode::Library => 1,
    }]);
    hasher.update(&[config.grep_shield as u8]);
    hasher.update(&[config.include_vendored as u8]);

    format!("{:016x}", hasher.digest())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_files_same_config_same_hash_regardless_of_order() {
        let config = JanitorConfig::default();
        let mut a = vec![
            ("a.py".to_string(), vec![1, 2, 3]),
            ("b.py".to_string(), vec![4, 5, 6]),
        ];
        let mut b = vec![
            ("b.py".to_string(), vec![4, 5, 6]),
            ("a.py".to_string(), vec![1, 2, 3]),
        ];
        assert_eq!(compute(&mut a, &config), compute(&mut b, &config));
    }

    #[test]
    fn grep_shield_flag_changes_the_hash() {
        let mut base = JanitorConfig::default();
        let mut files = vec![("a.py".to_string(), vec![1, 2, 3])];
        let without = compute(&mut files.clone(), &base);
        base.grep_shield = true;
        let with = compute(&mut files, &base);
        assert_ne!(without, with);
    }

    #[test]
    fn a_changed_file_hash_changes_the_project_hash() {
        let config = JanitorConfig::default();
        let mut a = vec![("a.py".to_string(), vec![1, 2, 3])];
        let mut b = vec![("a.py".to_string(), vec![9, 9, 9])];
        assert_ne!(compute(&mut a, &config), compute(&mut b, &config));
    }
}
