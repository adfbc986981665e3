// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for parcelhub integration tests.
//!
//! Provides mock collaborators and a test harness for fast, deterministic
//! tests without external services.
//!
//! # Components
//!
//! - [`MockIdentityVerifier`] - token to email table
//! - [`MockPaymentProcessor`] - records intent requests, can be made to fail
//! - [`TestHarness`] - full router over a fresh store, driven in-process

pub mod harness;
pub mod mock_identity;
pub mod mock_payments;

pub use harness::{TestHarness, TestResponse};
pub use mock_identity::MockIdentityVerifier;
pub use mock_payments::MockPaymentProcessor;
