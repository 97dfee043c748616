//! Parse-level errors. Per §7 these never propagate past this crate: a
//! `ParseFailure` means "skip this file", logged at `info` and returned as
//! `None` to the caller, never as an `Err` that crosses into
//! `janitor-engine`.

#[derive(Debug, thiserror::Error)]
pub enum ParseFailure {
    #[error("unsupported file extension: {extension}")]
    UnsupportedExtension { extension: String },

    #[error("tree-sitter grammar could not be loaded for {0:?}")]
    GrammarUnavailable(super::language::Language),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
