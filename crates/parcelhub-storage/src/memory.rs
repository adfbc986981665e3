// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory document store.
//!
//! Evaluates [`Filter`] and [`Sort`] in Rust. Each call holds the lock for its
//! whole duration, so single-document operations are atomic just as they are
//! in the SQLite backend. Contents are lost when the process exits.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use parcelhub_core::document;
use parcelhub_core::types::new_id;
use parcelhub_core::{
    AdapterType, Collection, Document, Filter, HealthStatus, ID_FIELD, ParcelError,
    PluginAdapter, Sort, StorageAdapter, UpdateResult,
};

/// A thread-safe in-memory document store.
///
/// Collections are vectors in insertion order, so unsorted reads and sort
/// ties come back in the order documents were inserted.
#[derive(Default, Clone)]
pub struct MemoryStorage {
    collections: Arc<RwLock<HashMap<Collection, Vec<Document>>>>,
}

impl MemoryStorage {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PluginAdapter for MemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, ParcelError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ParcelError> {
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for MemoryStorage {
    async fn initialize(&self) -> Result<(), ParcelError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), ParcelError> {
        Ok(())
    }

    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        sort: Option<&Sort>,
    ) -> Result<Vec<Document>, ParcelError> {
        filter.validate()?;
        let collections = self.collections.read().await;
        let mut docs: Vec<Document> = collections
            .get(&collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default();
        if let Some(sort) = sort {
            // sort_by is stable, so ties keep insertion order.
            docs.sort_by(|a, b| sort.compare(a, b));
        }
        Ok(docs)
    }

    async fn insert_one(
        &self,
        collection: Collection,
        mut document: Document,
    ) -> Result<String, ParcelError> {
        let id = match document.get(ID_FIELD) {
            None | Some(Value::Null) => {
                let id = new_id();
                document.insert(ID_FIELD.to_string(), Value::String(id.clone()));
                id
            }
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            Some(_) => {
                return Err(ParcelError::InvalidArgument(
                    "document identity must be a non-empty string".to_string(),
                ));
            }
        };

        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();
        if docs
            .iter()
            .any(|d| d.get(ID_FIELD).and_then(Value::as_str) == Some(id.as_str()))
        {
            return Err(ParcelError::Conflict(format!(
                "{collection} document `{id}` already exists"
            )));
        }
        docs.push(document);
        Ok(id)
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        set: Document,
    ) -> Result<UpdateResult, ParcelError> {
        filter.validate()?;
        document::validate_set(&set)?;
        let mut collections = self.collections.write().await;
        let target = collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|d| filter.matches(d)));
        Ok(match target {
            Some(doc) => UpdateResult {
                matched: 1,
                modified: u64::from(document::apply_set(doc, &set)),
            },
            None => UpdateResult::default(),
        })
    }

    async fn delete_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<u64, ParcelError> {
        filter.validate()?;
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(0);
        };
        match docs.iter().position(|d| filter.matches(d)) {
            Some(index) => {
                docs.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}
