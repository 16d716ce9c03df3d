//! Bill composition: energy charge, Ft surcharge, service charge, VAT, discount.

use std::fmt;

use serde::Serialize;

use super::energy::energy_charge;
use super::money::{format_amount, round_to_cents};
use super::tariff::Tariff;

/// VAT rate applied when a bill summary does not carry one.
pub const DEFAULT_VAT_RATE: f64 = 0.07;

/// Line-item breakdown of a composed bill.
///
/// All currency fields are rounded to whole cents. The net total is clamped
/// at zero so a discount larger than the bill cannot produce a negative
/// amount due.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BillBreakdown {
    /// Billed usage (kWh).
    pub kwh: f64,
    /// Tiered energy charge.
    pub energy: f64,
    /// Flat Ft surcharge (`ft_per_kwh * kwh`).
    pub ft: f64,
    /// Fixed service charge.
    pub service: f64,
    /// Subtotal before VAT (`energy + ft + service`).
    pub pre_vat: f64,
    /// VAT on the pre-VAT subtotal.
    pub vat: f64,
    /// Subtotal including VAT.
    pub after_vat: f64,
    /// Discount applied after VAT.
    pub discount: f64,
    /// Net amount due: `max(0, after_vat - discount)`.
    pub total: f64,
}

/// Composes a full bill for `kwh` under `tariff`, less `discount`.
///
/// The discount is subtracted after VAT and the result clamped at zero.
pub fn compose_bill(kwh: f64, tariff: &Tariff, discount: f64) -> BillBreakdown {
    let energy = energy_charge(kwh, &tariff.steps);
    let ft = tariff.ft_per_kwh * kwh;
    let pre_vat = energy + ft + tariff.service_charge;
    let vat = pre_vat * tariff.vat_rate;
    let after_vat = pre_vat + vat;
    let total = (after_vat - discount).max(0.0);
    BillBreakdown {
        kwh,
        energy: round_to_cents(energy),
        ft: round_to_cents(ft),
        service: round_to_cents(tariff.service_charge),
        pre_vat: round_to_cents(pre_vat),
        vat: round_to_cents(vat),
        after_vat: round_to_cents(after_vat),
        discount: round_to_cents(discount),
        total: round_to_cents(total),
    }
}

impl fmt::Display for BillBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Bill breakdown ---")?;
        writeln!(f, "Usage:                {:>12} kWh", format_amount(self.kwh))?;
        writeln!(f, "Energy charge:        {:>12}", format_amount(self.energy))?;
        writeln!(f, "Ft surcharge:         {:>12}", format_amount(self.ft))?;
        writeln!(f, "Service charge:       {:>12}", format_amount(self.service))?;
        writeln!(f, "Subtotal (pre-VAT):   {:>12}", format_amount(self.pre_vat))?;
        writeln!(f, "VAT:                  {:>12}", format_amount(self.vat))?;
        writeln!(f, "Subtotal (incl. VAT): {:>12}", format_amount(self.after_vat))?;
        writeln!(f, "Discount:             {:>12}", format_amount(self.discount))?;
        write!(f, "Amount due:           {:>12}", format_amount(self.total))
    }
}

/// An already-known aggregate bill, used when the tariff detail is not
/// modeled explicitly. Input to the average-rate appliance estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BillSummary {
    /// Total billed usage (kWh).
    pub total_kwh: f64,
    /// Bill amount before VAT.
    pub pre_vat_amount: f64,
    /// VAT rate as a fraction.
    pub vat_rate: f64,
}

impl BillSummary {
    /// Creates a summary with the default 7% VAT rate.
    pub fn new(total_kwh: f64, pre_vat_amount: f64) -> Self {
        Self::with_vat_rate(total_kwh, pre_vat_amount, DEFAULT_VAT_RATE)
    }

    /// Creates a summary with an explicit VAT rate.
    pub fn with_vat_rate(total_kwh: f64, pre_vat_amount: f64, vat_rate: f64) -> Self {
        Self {
            total_kwh,
            pre_vat_amount,
            vat_rate,
        }
    }
}
