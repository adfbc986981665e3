// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the complete HTTP surface over a fresh document
//! store with mock identity and payment collaborators. Requests are driven
//! in-process through the router, so no port is bound.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use parcelhub_config::model::{StorageBackend, StorageConfig};
use parcelhub_core::document::to_document;
use parcelhub_core::types::{new_id, now_timestamp};
use parcelhub_core::{
    Collection, ParcelError, Rider, RiderStatus, Role, StorageAdapter, User, WorkStatus,
};
use parcelhub_gateway::{AppState, router};
use parcelhub_lifecycle::{PayoutRates, Services};
use parcelhub_storage::{MemoryStorage, SqliteStorage};

use crate::mock_identity::MockIdentityVerifier;
use crate::mock_payments::MockPaymentProcessor;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    sqlite: bool,
    rates: PayoutRates,
    currency: String,
    users: Vec<(String, String, Role)>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            sqlite: false,
            rates: PayoutRates::default(),
            currency: "usd".to_string(),
            users: Vec::new(),
        }
    }

    /// Back the harness with a temp SQLite file instead of process memory.
    pub fn with_sqlite(mut self) -> Self {
        self.sqlite = true;
        self
    }

    pub fn with_payout_rates(mut self, rates: PayoutRates) -> Self {
        self.rates = rates;
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Registers a bearer token and seeds the matching user record.
    pub fn with_user(
        mut self,
        token: impl Into<String>,
        email: impl Into<String>,
        role: Role,
    ) -> Self {
        self.users.push((token.into(), email.into(), role));
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, ParcelError> {
        let (storage, temp_dir): (Arc<dyn StorageAdapter>, _) = if self.sqlite {
            let temp_dir = tempfile::TempDir::new().map_err(ParcelError::storage)?;
            let config = StorageConfig {
                backend: StorageBackend::Sqlite,
                database_path: temp_dir.path().join("test.db").to_string_lossy().to_string(),
                wal_mode: true,
            };
            (Arc::new(SqliteStorage::new(config)), Some(temp_dir))
        } else {
            (Arc::new(MemoryStorage::new()), None)
        };
        storage.initialize().await?;

        let identity = Arc::new(MockIdentityVerifier::new());
        let payments = Arc::new(MockPaymentProcessor::new());
        let services = Services::new(
            storage.clone(),
            payments.clone(),
            self.rates,
            self.currency,
        );
        let state = AppState {
            services: services.clone(),
            verifier: identity.clone(),
            storage: storage.clone(),
            processor: payments.clone(),
            started_at: Instant::now(),
        };

        let harness = TestHarness {
            router: router(state, false),
            services,
            storage,
            identity,
            payments,
            _temp_dir: temp_dir,
        };
        for (token, email, role) in self.users {
            harness.seed_user(&token, &email, role).await?;
        }
        Ok(harness)
    }
}

/// Status and decoded body of one in-process request.
#[derive(Debug, Clone)]
pub struct TestResponse {
    pub status: StatusCode,
    /// JSON body; a non-JSON body is returned as a string, an empty one as null.
    pub body: Value,
}

/// A complete test environment with mock collaborators and fresh storage.
pub struct TestHarness {
    /// The full route table.
    pub router: Router,
    /// Services over the same store, for direct assertions.
    pub services: Services,
    pub storage: Arc<dyn StorageAdapter>,
    pub identity: Arc<MockIdentityVerifier>,
    pub payments: Arc<MockPaymentProcessor>,
    /// Temp directory kept alive for SQLite-backed harnesses.
    _temp_dir: Option<tempfile::TempDir>,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Registers `token` for `email` and stores a user with `role`.
    ///
    /// Returns the user id.
    pub async fn seed_user(
        &self,
        token: &str,
        email: &str,
        role: Role,
    ) -> Result<String, ParcelError> {
        self.identity.add_token(token, email).await;
        let user = User {
            id: new_id(),
            email: email.to_ascii_lowercase(),
            name: None,
            role,
            created_at: now_timestamp(),
            last_login_at: None,
        };
        self.storage
            .insert_one(Collection::Users, to_document(&user)?)
            .await
    }

    /// Stores a rider record directly, bypassing the application flow.
    ///
    /// Returns the rider id.
    pub async fn seed_rider(
        &self,
        email: &str,
        district: &str,
        status: RiderStatus,
        work_status: Option<WorkStatus>,
    ) -> Result<String, ParcelError> {
        let rider = Rider {
            id: new_id(),
            name: format!("Rider {email}"),
            email: email.to_ascii_lowercase(),
            phone: None,
            region: None,
            district: district.to_string(),
            status,
            work_status,
            created_at: now_timestamp(),
        };
        self.storage
            .insert_one(Collection::Riders, to_document(&rider)?)
            .await
    }

    /// Sends one request through the router.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<TestResponse, ParcelError> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .map_err(|e| ParcelError::Internal(format!("bad test request: {e}")))?;

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .map_err(|e| ParcelError::Internal(format!("router failed: {e}")))?;
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| ParcelError::Internal(format!("body read failed: {e}")))?
            .to_bytes();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        Ok(TestResponse { status, body })
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<TestResponse, ParcelError> {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(
        &self,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> Result<TestResponse, ParcelError> {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn patch(
        &self,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> Result<TestResponse, ParcelError> {
        self.request(Method::PATCH, uri, token, Some(body)).await
    }

    pub async fn delete(
        &self,
        uri: &str,
        token: Option<&str>,
    ) -> Result<TestResponse, ParcelError> {
        self.request(Method::DELETE, uri, token, None).await
    }
}
