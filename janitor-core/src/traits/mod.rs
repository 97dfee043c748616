//! Trait boundaries between business logic and storage backends.

pub mod cache_store;

pub use cache_store::{
    DependencyEdgeRow, FileMetadataRow, IJanitorCacheStore, ProjectResultRow,
};
