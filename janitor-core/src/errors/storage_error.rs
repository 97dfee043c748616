//! Storage-layer errors for the SQLite-backed analysis cache.

use super::error_code::{self, JanitorErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("sqlite error: {message}")]
    SqliteError { message: String },

    #[error("migration failed at version {version}: {message}")]
    MigrationFailed { version: u32, message: String },

    #[error("cache database busy (another process holds the write lock)")]
    DbBusy,

    #[error("cache database corrupt: {details}")]
    DbCorrupt { details: String },

    #[error("disk full while writing to the cache database")]
    DiskFull,

    #[error("row missing or undeserializable, treated as a cache miss: {key}")]
    CacheMiss { key: String },

    #[error("operation not supported: {operation} — {reason}")]
    NotSupported { operation: String, reason: String },
}

impl JanitorErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::DbBusy => error_code::DB_BUSY,
            Self::DbCorrupt { .. } => error_code::DB_CORRUPT,
            Self::DiskFull => error_code::DISK_FULL,
            Self::MigrationFailed { .. } => error_code::MIGRATION_FAILED,
            Self::CacheMiss { .. } => error_code::CACHE_MISS,
            _ => error_code::STORAGE_ERROR,
        }
    }
}
