// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Stripe PaymentIntents API.
//!
//! Stripe takes form-encoded bodies and a bearer secret key.

use std::time::Duration;

use parcelhub_core::{ParcelError, PaymentIntentRequest};
use tracing::debug;

use crate::types::{ApiErrorResponse, PaymentIntentResponse};

const SERVICE: &str = "payments";

fn upstream(message: String, source: Option<reqwest::Error>) -> ParcelError {
    ParcelError::Upstream {
        service: SERVICE,
        message,
        source: source.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
    }
}

/// Form fields for `POST /payment_intents`.
pub fn intent_form(request: &PaymentIntentRequest) -> Vec<(&'static str, String)> {
    let mut form = vec![
        ("amount", request.amount_minor.to_string()),
        ("currency", request.currency.to_ascii_lowercase()),
        ("payment_method_types[]", "card".to_string()),
    ];
    if let Some(parcel_id) = &request.parcel_id {
        form.push(("metadata[parcel_id]", parcel_id.clone()));
    }
    form
}

#[derive(Debug, Clone)]
pub struct StripeClient {
    client: reqwest::Client,
    base_url: String,
    secret_key: String,
}

impl StripeClient {
    pub fn new(secret_key: String, base_url: &str, timeout: Duration) -> Result<Self, ParcelError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| upstream(format!("failed to build HTTP client: {e}"), Some(e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key,
        })
    }

    /// Creates a PaymentIntent. Sent once; no idempotency key is attached.
    pub async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> Result<PaymentIntentResponse, ParcelError> {
        let response = self
            .client
            .post(format!("{}/payment_intents", self.base_url))
            .bearer_auth(&self.secret_key)
            .form(&intent_form(request))
            .send()
            .await
            .map_err(|e| upstream(format!("HTTP request failed: {e}"), Some(e)))?;

        let status = response.status();
        debug!(status = %status, "payment intent response received");

        if status.is_success() {
            return response
                .json::<PaymentIntentResponse>()
                .await
                .map_err(|e| upstream(format!("failed to parse payment intent: {e}"), Some(e)));
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
            Ok(api_err) => format!("Stripe error ({}): {}", api_err.error.type_, api_err.error.message),
            Err(_) => format!("Stripe returned {status}: {body}"),
        };
        Err(upstream(message, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(parcel_id: Option<&str>) -> PaymentIntentRequest {
        PaymentIntentRequest {
            amount_minor: 1250,
            currency: "USD".into(),
            parcel_id: parcel_id.map(String::from),
        }
    }

    #[test]
    fn form_carries_card_method_and_metadata() {
        let form = intent_form(&request(Some("p1")));
        assert!(form.contains(&("amount", "1250".to_string())));
        assert!(form.contains(&("currency", "usd".to_string())));
        assert!(form.contains(&("payment_method_types[]", "card".to_string())));
        assert!(form.contains(&("metadata[parcel_id]", "p1".to_string())));
        assert_eq!(intent_form(&request(None)).len(), 3);
    }

    #[tokio::test]
    async fn sends_bearer_key_and_form_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payment_intents"))
            .and(header("authorization", "Bearer sk_test_123"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("amount=1250"))
            .and(body_string_contains("payment_method_types%5B%5D=card"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "pi_1",
                "client_secret": "pi_1_secret_abc",
                "status": "requires_payment_method"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            StripeClient::new("sk_test_123".into(), &server.uri(), Duration::from_secs(5)).unwrap();
        let intent = client.create_payment_intent(&request(Some("p1"))).await.unwrap();
        assert_eq!(intent.client_secret, "pi_1_secret_abc");
    }

    #[tokio::test]
    async fn card_error_surfaces_provider_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payment_intents"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {"type": "invalid_request_error", "message": "Amount must be at least 50 cents"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            StripeClient::new("sk_test".into(), &server.uri(), Duration::from_secs(5)).unwrap();
        let err = client.create_payment_intent(&request(None)).await.unwrap_err();
        assert!(matches!(err, ParcelError::Upstream { service: "payments", .. }));
        assert!(err.to_string().contains("at least 50 cents"), "got: {err}");
    }
}
