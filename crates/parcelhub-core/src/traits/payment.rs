// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Payment processor trait.

use async_trait::async_trait;

use crate::error::ParcelError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{PaymentIntent, PaymentIntentRequest};

/// Creates payment intents with an external processor.
///
/// The processor hands back an opaque client secret; card details never pass
/// through parcelhub.
#[async_trait]
pub trait PaymentProcessor: PluginAdapter {
    async fn create_payment_intent(
        &self,
        request: PaymentIntentRequest,
    ) -> Result<PaymentIntent, ParcelError>;
}
