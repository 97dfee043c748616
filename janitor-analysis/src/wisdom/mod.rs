//! Wisdom Registry (C3, §4.3). Loads JSON rule packs grouped into a
//! community tier (always loaded, embedded at compile time) and an
//! optional premium tier (loaded from a directory at runtime, if present),
//! and answers `is_immortal(name, source_text, language) -> Option<Reason>`.

pub mod matcher;
pub mod registry;
pub mod types;

pub use registry::{ImmortalityReason, WisdomRegistry};
pub use types::RulePack;
