// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Firebase identity verifier for parcelhub.
//!
//! Implements [`IdentityVerifier`] over the Identity Toolkit REST API. A
//! bearer token is verified by looking up the account it belongs to; the
//! account's email becomes the caller identity.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use parcelhub_config::model::IdentityConfig;
use parcelhub_core::{
    AdapterType, HealthStatus, IdentityVerifier, ParcelError, PluginAdapter, VerifiedIdentity,
};
use tracing::{debug, error, info};

use crate::client::IdentityToolkitClient;

/// Identity verifier backed by Firebase.
///
/// Without an API key every verification fails with `Unauthenticated`.
pub struct FirebaseVerifier {
    client: Option<IdentityToolkitClient>,
}

impl FirebaseVerifier {
    pub fn new(config: &IdentityConfig) -> Result<Self, ParcelError> {
        let client = match config.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Some(IdentityToolkitClient::new(
                key.to_string(),
                &config.base_url,
                Duration::from_secs(config.timeout_secs),
            )?),
            _ => {
                error!("identity.api_key is not set; every authenticated request will be refused");
                None
            }
        };
        if client.is_some() {
            info!(base_url = %config.base_url, "firebase identity verifier initialized");
        }
        Ok(Self { client })
    }
}

#[async_trait]
impl PluginAdapter for FirebaseVerifier {
    fn name(&self) -> &str {
        "firebase"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Identity
    }

    async fn health_check(&self) -> Result<HealthStatus, ParcelError> {
        // Checking liveness would need a real token, so only report configuration.
        Ok(match self.client {
            Some(_) => HealthStatus::Healthy,
            None => HealthStatus::Degraded("identity.api_key is not configured".into()),
        })
    }

    async fn shutdown(&self) -> Result<(), ParcelError> {
        debug!("firebase verifier shutting down");
        Ok(())
    }
}

#[async_trait]
impl IdentityVerifier for FirebaseVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, ParcelError> {
        let client = self.client.as_ref().ok_or_else(|| {
            ParcelError::Unauthenticated("identity verification is not configured".into())
        })?;
        let token = token.trim();
        if token.is_empty() {
            return Err(ParcelError::Unauthenticated("empty bearer token".into()));
        }

        let account = client.lookup(token).await?;
        if account.disabled {
            return Err(ParcelError::Unauthenticated("account is disabled".into()));
        }
        let email = account
            .email
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| ParcelError::Unauthenticated("account has no email".into()))?;

        Ok(VerifiedIdentity {
            email: email.trim().to_ascii_lowercase(),
            uid: account.local_id,
        })
    }
}
