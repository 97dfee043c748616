//! Reference Tracker (C7, §4.7) — three-phase build: (1) dependency
//! graph already resolved file-level edges, (2) entities already
//! extracted, (3) this module's ingestion walk emits [`CandidateReference`]
//! values that [`tracker::ReferenceTracker`] resolves against the
//! definitions table.

pub mod candidate;
pub mod inheritance;
pub mod ingest;
pub mod tracker;
pub mod type_registry;

pub use candidate::CandidateReference;
pub use tracker::ReferenceTracker;
