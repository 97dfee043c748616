//! # janitor-storage
//!
//! SQLite-backed persistence for the analysis cache (C9): file metadata,
//! per-file entity/candidate-reference blobs, dependency edges, and the
//! whole-project result. Trimmed from `drift-storage`'s module list
//! (`connection, batch, engine, migrations, queries, pagination,
//! materialized, retention`) to the subset this spec's four row kinds need:
//! no `pagination`/`materialized`/`retention`, which have no counterpart in
//! the spec's cache model.

pub mod connection;
pub mod engine;
pub mod migrations;
pub mod queries;

pub use connection::DatabaseManager;
pub use engine::SqliteCacheStore;
