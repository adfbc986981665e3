// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Identity Toolkit `accounts:lookup` endpoint.

use std::time::Duration;

use parcelhub_core::ParcelError;
use reqwest::StatusCode;
use tracing::debug;

use crate::types::{AccountInfo, ApiErrorResponse, LookupRequest, LookupResponse};

const SERVICE: &str = "identity";

fn upstream(message: String, source: Option<reqwest::Error>) -> ParcelError {
    ParcelError::Upstream {
        service: SERVICE,
        message,
        source: source.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
    }
}

/// Client bound to one API key.
#[derive(Debug, Clone)]
pub struct IdentityToolkitClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl IdentityToolkitClient {
    pub fn new(api_key: String, base_url: &str, timeout: Duration) -> Result<Self, ParcelError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| upstream(format!("failed to build HTTP client: {e}"), Some(e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Looks up the account behind an ID token.
    ///
    /// Rejected tokens (400, 401, 403) are `Unauthenticated`; anything else
    /// that goes wrong is `Upstream`.
    pub async fn lookup(&self, id_token: &str) -> Result<AccountInfo, ParcelError> {
        let url = format!("{}/accounts:lookup", self.base_url);
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&LookupRequest { id_token })
            .send()
            .await
            .map_err(|e| upstream(format!("HTTP request failed: {e}"), Some(e)))?;

        let status = response.status();
        debug!(status = %status, "account lookup response received");

        if status.is_success() {
            let body: LookupResponse = response
                .json()
                .await
                .map_err(|e| upstream(format!("failed to parse lookup response: {e}"), Some(e)))?;
            return body
                .users
                .into_iter()
                .next()
                .ok_or_else(|| ParcelError::Unauthenticated("token matches no account".into()));
        }

        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ApiErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);

        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(
                ParcelError::Unauthenticated(format!("token rejected: {detail}")),
            ),
            _ => Err(upstream(format!("lookup returned {status}: {detail}"), None)),
        }
    }
}
