// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity verifier trait for bearer-token authentication.

use async_trait::async_trait;

use crate::error::ParcelError;
use crate::traits::adapter::PluginAdapter;
use crate::types::VerifiedIdentity;

/// Validates bearer credentials issued by an external identity service.
#[async_trait]
pub trait IdentityVerifier: PluginAdapter {
    /// Verifies `token` (without the `Bearer ` prefix).
    ///
    /// Fails with `Unauthenticated` when the token is rejected, and with
    /// `Upstream` when the service itself could not be reached.
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, ParcelError>;
}
