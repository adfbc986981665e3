// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stripe PaymentIntents response types.

use serde::Deserialize;

/// The fields of a created PaymentIntent that parcelhub uses.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntentResponse {
    pub id: String,
    pub client_secret: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Error envelope returned on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(rename = "type", default)]
    pub type_: String,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_intent_and_ignores_extra_fields() {
        let intent: PaymentIntentResponse = serde_json::from_str(
            r#"{"id": "pi_1", "object": "payment_intent", "client_secret": "pi_1_secret_x", "amount": 1000}"#,
        )
        .unwrap();
        assert_eq!(intent.id, "pi_1");
        assert_eq!(intent.client_secret, "pi_1_secret_x");
        assert!(intent.status.is_none());
    }

    #[test]
    fn parses_error_envelope() {
        let err: ApiErrorResponse = serde_json::from_str(
            r#"{"error": {"type": "invalid_request_error", "message": "Amount must be at least 50 cents"}}"#,
        )
        .unwrap();
        assert_eq!(err.error.type_, "invalid_request_error");
    }
}
