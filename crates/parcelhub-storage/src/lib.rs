// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document store backends for parcelhub.
//!
//! [`SqliteStorage`] keeps documents as JSON in a WAL-mode SQLite file with
//! embedded migrations and a single-writer connection via `tokio-rusqlite`.
//! [`MemoryStorage`] keeps them in process memory for tests and throwaway runs.
//! Both implement [`StorageAdapter`] with identical filter and sort semantics.

pub mod adapter;
pub mod database;
pub mod memory;
pub mod migrations;
pub mod queries;

use std::sync::Arc;

use parcelhub_config::model::{StorageBackend, StorageConfig};
use parcelhub_core::{ParcelError, StorageAdapter};

pub use adapter::SqliteStorage;
pub use database::Database;
pub use memory::MemoryStorage;

/// Builds and initializes the backend selected in configuration.
pub async fn open_storage(config: &StorageConfig) -> Result<Arc<dyn StorageAdapter>, ParcelError> {
    let storage: Arc<dyn StorageAdapter> = match config.backend {
        StorageBackend::Sqlite => Arc::new(SqliteStorage::new(config.clone())),
        StorageBackend::Memory => Arc::new(MemoryStorage::new()),
    };
    storage.initialize().await?;
    tracing::info!(backend = storage.name(), "document store ready");
    Ok(storage)
}
