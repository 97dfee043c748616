//! # janitor-analysis
//!
//! The analysis pipeline: parser adapter, entity extractor, wisdom
//! registry, config-reference scanner, dependency graph builder, orphan
//! detector, reference tracker, dead-symbol pipeline, and the in-memory
//! half of the analysis cache. Everything here is read-only with respect
//! to the scanned project; mutation lives in `janitor-mutate`.

pub mod cache;
pub mod config_scan;
pub mod depgraph;
pub mod entities;
pub mod orphans;
pub mod parser;
pub mod pipeline;
pub mod refs;
pub mod wisdom;

pub use parser::language::Language;
pub use parser::cst::Cst;
pub use pipeline::{DeadSymbolPipeline, PipelineInput, PipelineOutcome};
pub use refs::tracker::ReferenceTracker;
pub use wisdom::registry::WisdomRegistry;
