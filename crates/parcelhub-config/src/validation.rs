// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as valid bind addresses, non-empty paths, and rates within `[0, 1]`.

use crate::diagnostic::ConfigError;
use crate::model::{ParcelhubConfig, StorageBackend};

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ParcelhubConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let host = config.server.host.trim();
    if host.is_empty() {
        fail("server.host must not be empty".to_string());
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            fail(format!(
                "server.host `{host}` is not a valid IP address or hostname"
            ));
        }
    }

    if config.server.port == 0 {
        fail("server.port must be between 1 and 65535".to_string());
    }

    if config.storage.backend == StorageBackend::Sqlite
        && config.storage.database_path.trim().is_empty()
    {
        fail("storage.database_path must not be empty with the sqlite backend".to_string());
    }

    for (name, rate) in [
        ("payout.same_district_rate", config.payout.same_district_rate),
        ("payout.cross_district_rate", config.payout.cross_district_rate),
    ] {
        if !(0.0..=1.0).contains(&rate) {
            fail(format!("{name} must be between 0 and 1, got {rate}"));
        }
    }

    let currency = &config.payments.currency;
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        fail(format!(
            "payments.currency must be a three-letter ISO 4217 code, got `{currency}`"
        ));
    }

    if config.identity.timeout_secs == 0 {
        fail("identity.timeout_secs must be at least 1".to_string());
    }
    if config.payments.timeout_secs == 0 {
        fail("payments.timeout_secs must be at least 1".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_error(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = ParcelhubConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_for_sqlite_only() {
        let mut config = ParcelhubConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "database_path"));

        config.storage.backend = StorageBackend::Memory;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn out_of_range_rate_fails_validation() {
        let mut config = ParcelhubConfig::default();
        config.payout.cross_district_rate = 1.5;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "cross_district_rate"));
    }

    #[test]
    fn errors_are_collected_not_fail_fast() {
        let mut config = ParcelhubConfig::default();
        config.server.host = " ".to_string();
        config.server.port = 0;
        config.payments.currency = "dollars".to_string();
        config.identity.timeout_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(has_error(&errors, "server.host"));
        assert!(has_error(&errors, "server.port"));
        assert!(has_error(&errors, "payments.currency"));
        assert!(has_error(&errors, "identity.timeout_secs"));
    }

    #[test]
    fn invalid_host_characters_fail_validation() {
        let mut config = ParcelhubConfig::default();
        config.server.host = "local host!".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "not a valid IP address"));
    }
}
