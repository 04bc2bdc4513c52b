//! Refera Storage Library
//!
//! This crate provides the object-storage abstraction and implementations for
//! Refera. It includes the Storage trait and backends for S3 and the local
//! filesystem.
//!
//! # Storage key format
//!
//! Object keys are owner-scoped: `{user_id}/{epoch_millis}-{token}.pdf`.
//! The token is generated fresh per upload so concurrent uploads by the same
//! user never collide on a key. Keys must not contain `..` or a leading `/`.
//! Key generation is centralized in the `keys` module.
//!
//! Uploads use collision-as-error semantics: writing to a key that already
//! exists is a `StorageError::AlreadyExists`, never an overwrite.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod progress;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use progress::{percent_of, NoopProgress, ProgressSink, SharedProgress};
pub use refera_core::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult, StoredObject};
