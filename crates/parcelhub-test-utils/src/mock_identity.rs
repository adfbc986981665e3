// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock identity verifier for deterministic testing.
//!
//! `MockIdentityVerifier` resolves bearer tokens through a fixed table, so
//! tests never call a real identity service.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use parcelhub_core::{
    AdapterType, HealthStatus, IdentityVerifier, ParcelError, PluginAdapter, VerifiedIdentity,
};

/// Maps tokens to emails. Unknown tokens are `Unauthenticated`.
#[derive(Clone, Default)]
pub struct MockIdentityVerifier {
    tokens: Arc<RwLock<HashMap<String, String>>>,
    unavailable: Arc<RwLock<bool>>,
}

impl MockIdentityVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `token` as belonging to `email`.
    pub async fn add_token(&self, token: impl Into<String>, email: impl Into<String>) {
        self.tokens.write().await.insert(token.into(), email.into());
    }

    /// Makes every verification fail as if the service were down.
    pub async fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.write().await = unavailable;
    }
}

#[async_trait]
impl PluginAdapter for MockIdentityVerifier {
    fn name(&self) -> &str {
        "mock-identity"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Identity
    }

    async fn health_check(&self) -> Result<HealthStatus, ParcelError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ParcelError> {
        Ok(())
    }
}

#[async_trait]
impl IdentityVerifier for MockIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, ParcelError> {
        if *self.unavailable.read().await {
            return Err(ParcelError::Upstream {
                service: "identity",
                message: "mock identity service unavailable".to_string(),
                source: None,
            });
        }
        self.tokens
            .read()
            .await
            .get(token)
            .map(|email| VerifiedIdentity {
                email: email.to_ascii_lowercase(),
                uid: Some(format!("uid-{token}")),
            })
            .ok_or_else(|| ParcelError::Unauthenticated("unknown token".to_string()))
    }
}
