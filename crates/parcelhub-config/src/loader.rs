// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./parcelhub.toml` > `~/.config/parcelhub/parcelhub.toml` >
//! `/etc/parcelhub/parcelhub.toml` with environment variable overrides via the
//! `PARCELHUB_` prefix and the bare `PORT` variable.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ParcelhubConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/parcelhub/parcelhub.toml";

/// Configuration file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "parcelhub.toml";

/// Sections recognised in `PARCELHUB_<SECTION>_<KEY>` variable names.
const ENV_SECTIONS: &[&str] = &["server", "storage", "identity", "payments", "payout", "log"];

/// User config file under the XDG config dir, if one can be determined.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("parcelhub").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/parcelhub/parcelhub.toml` (system-wide)
/// 3. `~/.config/parcelhub/parcelhub.toml` (user XDG config)
/// 4. `./parcelhub.toml` (local directory)
/// 5. `PARCELHUB_*` environment variables
/// 6. `PORT` environment variable
pub fn load_config() -> Result<ParcelhubConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<ParcelhubConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ParcelhubConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ParcelhubConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ParcelhubConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .merge(port_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ParcelhubConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
        .merge(port_provider())
}

/// Environment provider mapping `PARCELHUB_<SECTION>_<KEY>` to `section.key`.
///
/// Only the first underscore after the section name becomes a dot, so
/// `PARCELHUB_STORAGE_DATABASE_PATH` maps to `storage.database_path`, not
/// `storage.database.path`.
fn env_provider() -> Env {
    Env::prefixed("PARCELHUB_").map(|key| map_env_key(key.as_str()).into())
}

/// The bare `PORT` variable sets `server.port`.
fn port_provider() -> Env {
    Env::raw().only(&["port"]).map(|_| "server.port".into())
}

fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
