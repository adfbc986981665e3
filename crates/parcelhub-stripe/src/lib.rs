// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stripe payment processor for parcelhub.
//!
//! Implements [`PaymentProcessor`] by creating Stripe PaymentIntents. The
//! card itself is collected by the client with the returned secret; this
//! crate never sees a payment instrument.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use parcelhub_config::model::PaymentsConfig;
use parcelhub_core::{
    AdapterType, HealthStatus, ParcelError, PaymentIntent, PaymentIntentRequest, PaymentProcessor,
    PluginAdapter,
};
use tracing::{debug, info, warn};

use crate::client::StripeClient;

/// Payment processor backed by Stripe.
///
/// A missing secret key is reported as a configuration error when an intent
/// is requested, so the rest of the service still starts.
pub struct StripeProcessor {
    client: Option<StripeClient>,
}

impl StripeProcessor {
    pub fn new(config: &PaymentsConfig) -> Result<Self, ParcelError> {
        let client = match config.secret_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => {
                info!(base_url = %config.base_url, "stripe payment processor initialized");
                Some(StripeClient::new(
                    key.to_string(),
                    &config.base_url,
                    Duration::from_secs(config.timeout_secs),
                )?)
            }
            _ => {
                warn!("payments.secret_key is not set; payment intents are unavailable");
                None
            }
        };
        Ok(Self { client })
    }
}

#[async_trait]
impl PluginAdapter for StripeProcessor {
    fn name(&self) -> &str {
        "stripe"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Payments
    }

    async fn health_check(&self) -> Result<HealthStatus, ParcelError> {
        Ok(match self.client {
            Some(_) => HealthStatus::Healthy,
            None => HealthStatus::Degraded("payments.secret_key is not configured".into()),
        })
    }

    async fn shutdown(&self) -> Result<(), ParcelError> {
        debug!("stripe processor shutting down");
        Ok(())
    }
}

#[async_trait]
impl PaymentProcessor for StripeProcessor {
    async fn create_payment_intent(
        &self,
        request: PaymentIntentRequest,
    ) -> Result<PaymentIntent, ParcelError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| ParcelError::Config("payments.secret_key is not configured".into()))?;
        let created = client.create_payment_intent(&request).await?;
        debug!(intent_id = %created.id, status = ?created.status, "payment intent created");
        Ok(PaymentIntent {
            id: created.id,
            client_secret: created.client_secret,
        })
    }
}
