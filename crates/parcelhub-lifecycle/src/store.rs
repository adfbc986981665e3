// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed helpers over the untyped document store.

use std::sync::Arc;

use parcelhub_core::document::{from_document, to_document};
use parcelhub_core::{Collection, Document, Filter, ParcelError, Sort, StorageAdapter};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Shared handle to the document store.
pub type Store = Arc<dyn StorageAdapter>;

pub(crate) async fn find_one<T: DeserializeOwned>(
    store: &Store,
    collection: Collection,
    filter: &Filter,
) -> Result<Option<T>, ParcelError> {
    store
        .find_one(collection, filter)
        .await?
        .map(from_document::<T>)
        .transpose()
}

pub(crate) async fn find_all<T: DeserializeOwned>(
    store: &Store,
    collection: Collection,
    filter: &Filter,
    sort: Option<&Sort>,
) -> Result<Vec<T>, ParcelError> {
    store
        .find(collection, filter, sort)
        .await?
        .into_iter()
        .map(from_document::<T>)
        .collect()
}

pub(crate) async fn insert<T: Serialize>(
    store: &Store,
    collection: Collection,
    record: &T,
) -> Result<String, ParcelError> {
    store.insert_one(collection, to_document(record)?).await
}

/// Turns a `json!({...})` object into a set of field assignments.
pub(crate) fn assignments(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        _ => Document::new(),
    }
}
