//! Errors from loading wisdom-registry rule packs (§4.3).

use super::error_code::{self, JanitorErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("invalid rule pack JSON in {path}: {source}")]
    InvalidJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rule pack {path} matches no known shape (immortality rule, meta patterns, or framework-keyed)")]
    UnknownShape { path: String },
}

impl JanitorErrorCode for DetectionError {
    fn error_code(&self) -> &'static str {
        error_code::RULE_PACK_INVALID
    }
}
