//! Top-level engine configuration.

mod analysis_config;

pub use analysis_config::{JanitorConfig, LanguageSelector, PipelineMode};
