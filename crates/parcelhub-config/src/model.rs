// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for parcelhub.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Placeholder printed in place of secret values.
pub const REDACTED: &str = "[redacted]";

/// Top-level parcelhub configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to values that
/// run a local server.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ParcelhubConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Document store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Identity verifier (Firebase Identity Toolkit) settings.
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Payment processor (Stripe) settings.
    #[serde(default)]
    pub payments: PaymentsConfig,

    /// Rider payout rates.
    #[serde(default)]
    pub payout: PayoutConfig,

    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

impl ParcelhubConfig {
    /// Returns a copy with every secret replaced by [`REDACTED`], for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.identity.api_key.is_some() {
            copy.identity.api_key = Some(REDACTED.to_string());
        }
        if copy.payments.secret_key.is_some() {
            copy.payments.secret_key = Some(REDACTED.to_string());
        }
        copy
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on. The bare `PORT` environment variable also sets it.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Allow cross-origin requests from any origin.
    #[serde(default = "default_permissive_cors")]
    pub permissive_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            permissive_cors: default_permissive_cors(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_permissive_cors() -> bool {
    true
}

/// Which document store implementation to run against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Durable SQLite file.
    #[default]
    Sqlite,
    /// Process-local store; contents are lost on exit.
    Memory,
}

/// Document store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("parcelhub").join("parcelhub.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("parcelhub.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Identity verifier configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityConfig {
    /// Web API key of the identity project. Without it every token is rejected.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_identity_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| REDACTED))
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_identity_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_identity_base_url() -> String {
    "https://identitytoolkit.googleapis.com/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

/// Payment processor configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PaymentsConfig {
    /// Processor secret key. Payment intents fail until it is set.
    #[serde(default)]
    pub secret_key: Option<String>,

    #[serde(default = "default_payments_base_url")]
    pub base_url: String,

    /// ISO 4217 currency code for payment intents.
    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl std::fmt::Debug for PaymentsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentsConfig")
            .field("secret_key", &self.secret_key.as_ref().map(|_| REDACTED))
            .field("base_url", &self.base_url)
            .field("currency", &self.currency)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            base_url: default_payments_base_url(),
            currency: default_currency(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_payments_base_url() -> String {
    "https://api.stripe.com/v1".to_string()
}

fn default_currency() -> String {
    "usd".to_string()
}

/// Share of a parcel's cost paid to the delivering rider.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PayoutConfig {
    /// Rate when sender and receiver districts match.
    #[serde(default = "default_same_district_rate")]
    pub same_district_rate: f64,

    /// Rate for every other delivery.
    #[serde(default = "default_cross_district_rate")]
    pub cross_district_rate: f64,
}

impl Default for PayoutConfig {
    fn default() -> Self {
        Self {
            same_district_rate: default_same_district_rate(),
            cross_district_rate: default_cross_district_rate(),
        }
    }
}

fn default_same_district_rate() -> f64 {
    0.8
}

fn default_cross_district_rate() -> f64 {
    0.3
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Level for parcelhub targets (trace, debug, info, warn, error).
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
