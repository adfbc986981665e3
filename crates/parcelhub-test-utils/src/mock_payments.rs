// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock payment processor that records every request.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use parcelhub_core::{
    AdapterType, HealthStatus, ParcelError, PaymentIntent, PaymentIntentRequest, PaymentProcessor,
    PluginAdapter,
};

#[derive(Clone, Default)]
pub struct MockPaymentProcessor {
    requests: Arc<Mutex<Vec<PaymentIntentRequest>>>,
    failing: Arc<Mutex<bool>>,
}

impl MockPaymentProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request seen so far, in order.
    pub async fn requests(&self) -> Vec<PaymentIntentRequest> {
        self.requests.lock().await.clone()
    }

    /// Makes subsequent intents fail with an upstream error.
    pub async fn set_failing(&self, failing: bool) {
        *self.failing.lock().await = failing;
    }
}

#[async_trait]
impl PluginAdapter for MockPaymentProcessor {
    fn name(&self) -> &str {
        "mock-payments"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Payments
    }

    async fn health_check(&self) -> Result<HealthStatus, ParcelError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ParcelError> {
        Ok(())
    }
}

#[async_trait]
impl PaymentProcessor for MockPaymentProcessor {
    async fn create_payment_intent(
        &self,
        request: PaymentIntentRequest,
    ) -> Result<PaymentIntent, ParcelError> {
        if *self.failing.lock().await {
            return Err(ParcelError::Upstream {
                service: "payments",
                message: "card_declined".to_string(),
                source: None,
            });
        }
        let mut requests = self.requests.lock().await;
        requests.push(request);
        let n = requests.len();
        Ok(PaymentIntent {
            id: format!("pi_mock_{n}"),
            client_secret: format!("pi_mock_{n}_secret"),
        })
    }
}
