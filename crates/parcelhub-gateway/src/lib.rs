// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP surface for parcelhub.
//!
//! Every route returns JSON except the `/` banner. Handlers authenticate
//! through the [`auth`] extractors, call into `parcelhub-lifecycle`, and turn
//! failures into status codes through [`error::ApiError`].

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;

pub use error::{ApiError, ApiResult};
pub use server::{AppState, router, serve};
