// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity Toolkit `accounts:lookup` request/response types.

use serde::{Deserialize, Serialize};

/// Body of `POST /accounts:lookup`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupRequest<'a> {
    pub id_token: &'a str,
}

/// Successful lookup response.
#[derive(Debug, Clone, Deserialize)]
pub struct LookupResponse {
    #[serde(default)]
    pub users: Vec<AccountInfo>,
}

/// One account as reported by the identity service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    /// The provider's subject id.
    pub local_id: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub disabled: bool,
}

/// Error envelope returned on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_request_uses_camel_case() {
        let json = serde_json::to_value(LookupRequest { id_token: "abc" }).unwrap();
        assert_eq!(json, serde_json::json!({"idToken": "abc"}));
    }

    #[test]
    fn lookup_response_tolerates_missing_fields() {
        let resp: LookupResponse = serde_json::from_str(r#"{"kind": "x"}"#).unwrap();
        assert!(resp.users.is_empty());

        let resp: LookupResponse =
            serde_json::from_str(r#"{"users": [{"localId": "u1", "email": "A@x.com"}]}"#).unwrap();
        assert_eq!(resp.users[0].local_id.as_deref(), Some("u1"));
        assert!(!resp.users[0].disabled);
    }

    #[test]
    fn error_envelope_parses() {
        let err: ApiErrorResponse =
            serde_json::from_str(r#"{"error": {"code": 400, "message": "INVALID_ID_TOKEN"}}"#)
                .unwrap();
        assert_eq!(err.error.code, 400);
        assert_eq!(err.error.message, "INVALID_ID_TOKEN");
    }
}
