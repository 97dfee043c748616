//! # janitor-core
//!
//! Foundation crate for the dead-code janitor engine.
//! Defines every type, trait, error, config, event, and constant shared
//! across the analysis pipeline and the safe-mutation engine. Every other
//! crate in the workspace depends on this one.

pub mod config;
pub mod constants;
pub mod errors;
pub mod events;
pub mod session;
pub mod tracing_init;
pub mod traits;
pub mod types;

pub use config::JanitorConfig;
pub use errors::error_code::JanitorErrorCode;
pub use events::dispatcher::EventDispatcher;
pub use events::handler::JanitorEventHandler;
pub use session::SessionGuard;
pub use types::collections::{FxHashMap, FxHashSet};
pub use types::entity::{Entity, EntityKind};
pub use types::identifiers::SymbolId;
pub use types::import::Import;
pub use types::reference::{Reference, ReferenceKind};
