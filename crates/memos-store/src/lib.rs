//! memos-store: Storage layer for memos
//!
//! This crate provides:
//! - SQLite storage for users, settings, memos, tags and resources
//! - An embedded, idempotent schema migration
//! - The [`ObjectStore`] seam for resource blobs, with filesystem and
//!   in-memory backends
//!
//! # Usage
//!
//! ```rust,ignore
//! use memos_store::{NewMemo, Store, StoreConfig};
//!
//! let config = StoreConfig::from_env()?;
//! let store = Store::connect(config).await?;
//!
//! let memo = store.create_memo(&NewMemo { /* ... */ }).await?;
//! let same = store.get_memo(memo.id).await?;
//! ```

pub mod blob;
pub mod error;
pub mod models;
pub mod schema;
pub mod store;

pub use blob::{LocalObjectStore, MemoryObjectStore, ObjectStore, StoredObject};
pub use error::{StoreError, StoreResult};
pub use models::*;
pub use store::{STATS_WINDOW_SECS, Store, StoreConfig};

// Re-export memos-core for downstream crates
pub use memos_core;
