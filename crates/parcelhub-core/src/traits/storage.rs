// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document store adapter trait.

use async_trait::async_trait;

use crate::document::{Collection, Document, Filter, Sort, UpdateResult};
use crate::error::ParcelError;
use crate::traits::adapter::PluginAdapter;

/// Adapter for document store backends.
///
/// Each single-document call is atomic. Nothing spanning several calls is;
/// multi-document operations are sequenced by the caller.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the backend (schema, connection).
    async fn initialize(&self) -> Result<(), ParcelError>;

    /// Closes the backend, flushing pending writes and releasing connections.
    async fn close(&self) -> Result<(), ParcelError>;

    /// Returns every document matching `filter`, optionally sorted.
    ///
    /// Unsorted results come back in insertion order, and sorting is stable.
    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        sort: Option<&Sort>,
    ) -> Result<Vec<Document>, ParcelError>;

    /// Returns the first document matching `filter` in insertion order.
    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, ParcelError> {
        Ok(self.find(collection, filter, None).await?.into_iter().next())
    }

    /// Inserts a document and returns its identity.
    ///
    /// An `_id` is generated when the document does not carry one. Inserting
    /// an identity that already exists is a `Conflict`.
    async fn insert_one(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<String, ParcelError>;

    /// Applies field assignments to the first document matching `filter`.
    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        set: Document,
    ) -> Result<UpdateResult, ParcelError>;

    /// Deletes the first document matching `filter`, returning the deleted count.
    async fn delete_one(&self, collection: Collection, filter: &Filter)
    -> Result<u64, ParcelError>;
}
