//! Shared test fixtures for integration tests.

use tariff_split::billing::{Tariff, TariffStep};
use tariff_split::config::TariffConfig;

/// The metropolitan residential tariff used across integration tests.
pub fn default_tariff() -> Tariff {
    TariffConfig::mea_residential().to_tariff()
}

/// A flat single-block tariff with no fixed components, for exact-value checks.
#[allow(dead_code)]
pub fn flat_tariff(rate: f64) -> Tariff {
    Tariff {
        steps: vec![TariffStep { upto: None, rate }],
        ft_per_kwh: 0.0,
        service_charge: 0.0,
        vat_rate: 0.07,
    }
}

/// Owned participant names from string literals.
#[allow(dead_code)]
pub fn participants(names: &[&str]) -> Vec<String> {
    names.iter().map(ToString::to_string).collect()
}
