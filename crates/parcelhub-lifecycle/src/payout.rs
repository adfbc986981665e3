// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rider payout calculation.

use parcelhub_config::PayoutConfig;

/// Share of a parcel's cost paid to the rider who delivered it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayoutRates {
    pub same_district: f64,
    pub cross_district: f64,
}

impl Default for PayoutRates {
    fn default() -> Self {
        PayoutConfig::default().into()
    }
}

impl From<PayoutConfig> for PayoutRates {
    fn from(config: PayoutConfig) -> Self {
        Self {
            same_district: config.same_district_rate,
            cross_district: config.cross_district_rate,
        }
    }
}

impl PayoutRates {
    /// Payout for one delivery, rounded to two decimals.
    ///
    /// Districts are compared case-insensitively after trimming.
    pub fn payout(&self, total_cost: f64, sender_district: &str, receiver_district: &str) -> f64 {
        let same = sender_district
            .trim()
            .eq_ignore_ascii_case(receiver_district.trim());
        let rate = if same {
            self.same_district
        } else {
            self.cross_district
        };
        round2(total_cost * rate)
    }
}

/// Rounds half away from zero to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
