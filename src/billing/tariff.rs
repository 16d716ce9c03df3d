//! Tariff schedule types: rate blocks and the full tariff parameter set.

use serde::Serialize;

/// One block of a tiered tariff.
///
/// Usage between the previous block's cap and `upto` is billed at `rate`.
/// `None` marks the final, unbounded block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TariffStep {
    /// Cumulative usage cap in kWh (`None` = unbounded).
    pub upto: Option<f64>,
    /// Energy rate for this block (currency per kWh).
    pub rate: f64,
}

impl TariffStep {
    /// The block cap, with unbounded treated as positive infinity.
    pub fn cap(&self) -> f64 {
        self.upto.unwrap_or(f64::INFINITY)
    }
}

/// Complete tariff parameter set for a billing period.
///
/// Built from a validated [`TariffConfig`](crate::config::TariffConfig) and
/// passed explicitly into every billing entry point; there is no implicit
/// default schedule inside the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tariff {
    /// Ordered rate blocks with ascending caps; the final block is unbounded.
    pub steps: Vec<TariffStep>,
    /// Flat fuel-adjustment surcharge (Ft) per kWh, applied uniformly.
    pub ft_per_kwh: f64,
    /// Fixed monthly service charge, independent of usage.
    pub service_charge: f64,
    /// VAT rate as a fraction (0.07 = 7%).
    pub vat_rate: f64,
}
