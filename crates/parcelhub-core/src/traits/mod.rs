// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter traits for the external collaborators parcelhub depends on.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` so they can be held as `Arc<dyn ...>`.

pub mod adapter;
pub mod identity;
pub mod payment;
pub mod storage;

pub use adapter::PluginAdapter;
pub use identity::IdentityVerifier;
pub use payment::PaymentProcessor;
pub use storage::StorageAdapter;
