//! Appliance cost attribution: average-rate and marginal (differential) methods.

use std::fmt;

use serde::Serialize;

use super::bill::{BillSummary, compose_bill};
use super::money::{format_amount, round_to_cents};
use super::tariff::Tariff;
use crate::error::BillingError;

/// Appliance share estimated at the bill's uniform average rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProRataEstimate {
    /// Average pre-VAT rate across the whole bill (currency per kWh).
    pub avg_rate: f64,
    /// Appliance share before VAT.
    pub appliance_pre_vat: f64,
    /// Appliance share including VAT.
    pub appliance_total: f64,
}

/// Appliance share estimated as the bill difference with and without the
/// appliance's usage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarginalEstimate {
    /// Appliance-attributable cost, VAT included.
    pub appliance_cost: f64,
    /// Full bill total with the appliance usage included.
    pub with_appliance_total: f64,
    /// Remainder of the bill: `with_appliance_total - appliance_cost`.
    pub without_appliance_total: f64,
}

/// Estimates the appliance's share from a known aggregate bill.
///
/// Approximates the share as a uniform average rate across the whole bill.
/// Simple, but blind to block-tariff nonlinearity: every kWh is priced the
/// same regardless of which block it landed in.
///
/// # Errors
///
/// [`BillingError::ZeroTotalUsage`] when the summary's usage is not positive,
/// and [`BillingError::InvalidRange`] when `appliance_kwh` lies outside
/// `[0, total_kwh]`.
pub fn estimate_pro_rata(
    bill: &BillSummary,
    appliance_kwh: f64,
) -> Result<ProRataEstimate, BillingError> {
    if bill.total_kwh <= 0.0 {
        return Err(BillingError::ZeroTotalUsage);
    }
    if appliance_kwh < 0.0 || appliance_kwh > bill.total_kwh {
        return Err(BillingError::InvalidRange {
            appliance_kwh,
            total_kwh: bill.total_kwh,
        });
    }
    let avg_rate = bill.pre_vat_amount / bill.total_kwh;
    let appliance_pre_vat = appliance_kwh * avg_rate;
    let appliance_total = appliance_pre_vat * (1.0 + bill.vat_rate);
    Ok(ProRataEstimate {
        avg_rate: round_to_cents(avg_rate),
        appliance_pre_vat: round_to_cents(appliance_pre_vat),
        appliance_total: round_to_cents(appliance_total),
    })
}

/// Estimates the appliance's attributable cost as a bill differential.
///
/// Composes the bill with and without the appliance's usage and takes the
/// difference, which correctly reflects that removing the usage may drop
/// total consumption into a cheaper block. With
/// `allocate_service_proportionally` the appliance also carries
/// `service_charge * (1 + vat_rate) * (appliance_kwh / total_kwh)`; the
/// differential alone assigns the service charge entirely to the base usage,
/// since it appears in both terms and cancels out. The proportional term is
/// skipped when `total_kwh` is zero.
///
/// # Errors
///
/// [`BillingError::InvalidRange`] when `appliance_kwh` lies outside
/// `[0, total_kwh]`.
pub fn estimate_marginal(
    total_kwh: f64,
    appliance_kwh: f64,
    tariff: &Tariff,
    allocate_service_proportionally: bool,
    discount: f64,
) -> Result<f64, BillingError> {
    marginal_estimate(
        total_kwh,
        appliance_kwh,
        tariff,
        allocate_service_proportionally,
        discount,
    )
    .map(|estimate| estimate.appliance_cost)
}

/// Full marginal estimate, including the with/without bill totals.
///
/// The remainder is defined uniformly as
/// `without_appliance_total = with_appliance_total - appliance_cost`, so the
/// two parts always recompose into the full bill.
///
/// # Errors
///
/// [`BillingError::InvalidRange`] when `appliance_kwh` lies outside
/// `[0, total_kwh]`.
pub fn marginal_estimate(
    total_kwh: f64,
    appliance_kwh: f64,
    tariff: &Tariff,
    allocate_service_proportionally: bool,
    discount: f64,
) -> Result<MarginalEstimate, BillingError> {
    if appliance_kwh < 0.0 || appliance_kwh > total_kwh {
        return Err(BillingError::InvalidRange {
            appliance_kwh,
            total_kwh,
        });
    }
    let with_appliance = compose_bill(total_kwh, tariff, discount).total;
    let without_appliance = compose_bill(total_kwh - appliance_kwh, tariff, discount).total;
    let mut appliance_cost = with_appliance - without_appliance;
    if allocate_service_proportionally && total_kwh > 0.0 {
        appliance_cost +=
            tariff.service_charge * (1.0 + tariff.vat_rate) * (appliance_kwh / total_kwh);
    }
    let appliance_cost = round_to_cents(appliance_cost);
    Ok(MarginalEstimate {
        appliance_cost,
        with_appliance_total: with_appliance,
        without_appliance_total: round_to_cents(with_appliance - appliance_cost),
    })
}

/// Caller-selected attribution method, each variant carrying its own inputs.
#[derive(Debug, Clone)]
pub enum EstimateRequest<'a> {
    /// Average-rate share from a known aggregate bill.
    ProRata {
        /// The aggregate bill to average over.
        bill: BillSummary,
        /// Appliance usage to attribute (kWh).
        appliance_kwh: f64,
    },
    /// Bill difference with and without the appliance usage.
    Marginal {
        /// Total billed usage (kWh).
        total_kwh: f64,
        /// Appliance usage to attribute (kWh).
        appliance_kwh: f64,
        /// Tariff to compose both bills under.
        tariff: &'a Tariff,
        /// Whether the appliance carries a proportional service-charge share.
        allocate_service_proportionally: bool,
        /// Discount applied to both composed bills.
        discount: f64,
    },
}

/// Result of [`estimate`], mirroring the request variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum EstimateResult {
    /// Average-rate estimate.
    ProRata(ProRataEstimate),
    /// Differential estimate.
    Marginal(MarginalEstimate),
}

impl EstimateResult {
    /// The appliance-attributable amount, VAT included.
    pub fn appliance_cost(&self) -> f64 {
        match self {
            Self::ProRata(estimate) => estimate.appliance_total,
            Self::Marginal(estimate) => estimate.appliance_cost,
        }
    }
}

/// Runs the attribution method selected by the request.
///
/// # Errors
///
/// Propagates the selected method's validation failures.
pub fn estimate(request: &EstimateRequest<'_>) -> Result<EstimateResult, BillingError> {
    match request {
        EstimateRequest::ProRata {
            bill,
            appliance_kwh,
        } => estimate_pro_rata(bill, *appliance_kwh).map(EstimateResult::ProRata),
        EstimateRequest::Marginal {
            total_kwh,
            appliance_kwh,
            tariff,
            allocate_service_proportionally,
            discount,
        } => marginal_estimate(
            *total_kwh,
            *appliance_kwh,
            tariff,
            *allocate_service_proportionally,
            *discount,
        )
        .map(EstimateResult::Marginal),
    }
}

impl fmt::Display for ProRataEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Appliance share (average-rate) ---")?;
        writeln!(
            f,
            "Average rate (pre-VAT): {:>12} /kWh",
            format_amount(self.avg_rate)
        )?;
        writeln!(
            f,
            "Share before VAT:       {:>12}",
            format_amount(self.appliance_pre_vat)
        )?;
        write!(
            f,
            "Share incl. VAT:        {:>12}",
            format_amount(self.appliance_total)
        )
    }
}

impl fmt::Display for MarginalEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Appliance share (marginal) ---")?;
        writeln!(
            f,
            "Appliance share:        {:>12}",
            format_amount(self.appliance_cost)
        )?;
        writeln!(
            f,
            "Bill without appliance: {:>12}",
            format_amount(self.without_appliance_total)
        )?;
        write!(
            f,
            "Bill total:             {:>12}",
            format_amount(self.with_appliance_total)
        )
    }
}

impl fmt::Display for EstimateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProRata(estimate) => estimate.fmt(f),
            Self::Marginal(estimate) => estimate.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::{
        EstimateRequest, EstimateResult, estimate, estimate_marginal, estimate_pro_rata,
        marginal_estimate,
    };
    use crate::billing::bill::{BillSummary, compose_bill};
    use crate::billing::tariff::{Tariff, TariffStep};
    use crate::config::TariffConfig;
    use crate::error::BillingError;

    fn residential() -> Tariff {
        TariffConfig::mea_residential().to_tariff()
    }

    /// Flat single-block tariff with no fixed components, for exact checks.
    fn flat(rate: f64) -> Tariff {
        Tariff {
            steps: vec![TariffStep { upto: None, rate }],
            ft_per_kwh: 0.0,
            service_charge: 0.0,
            vat_rate: 0.07,
        }
    }

    #[test]
    fn pro_rata_concrete_scenario() {
        let summary = BillSummary::new(500.0, 2000.0);
        let estimate = estimate_pro_rata(&summary, 100.0).unwrap();
        assert_eq!(estimate.avg_rate, 4.0);
        assert_eq!(estimate.appliance_pre_vat, 400.0);
        assert_eq!(estimate.appliance_total, 428.0);
    }

    #[test]
    fn pro_rata_rejects_zero_total_usage() {
        let summary = BillSummary::new(0.0, 500.0);
        assert_eq!(
            estimate_pro_rata(&summary, 0.0),
            Err(BillingError::ZeroTotalUsage)
        );
    }

    #[test]
    fn pro_rata_rejects_out_of_range_usage() {
        let summary = BillSummary::new(500.0, 2000.0);
        assert!(matches!(
            estimate_pro_rata(&summary, 600.0),
            Err(BillingError::InvalidRange { .. })
        ));
        assert!(matches!(
            estimate_pro_rata(&summary, -1.0),
            Err(BillingError::InvalidRange { .. })
        ));
    }

    #[test]
    fn marginal_zero_appliance_usage_is_free() {
        let cost = estimate_marginal(500.0, 0.0, &residential(), false, 0.0).unwrap();
        assert_eq!(cost, 0.0);
    }

    #[test]
    fn marginal_full_removal_on_flat_tariff_equals_the_bill() {
        let tariff = flat(4.0);
        let cost = estimate_marginal(300.0, 300.0, &tariff, false, 0.0).unwrap();
        assert_eq!(cost, compose_bill(300.0, &tariff, 0.0).total);
    }

    #[test]
    fn marginal_full_removal_with_service_allocation_recovers_the_bill() {
        // With the proportional service share the full bill is attributed,
        // fixed charge included.
        let tariff = residential();
        let cost = estimate_marginal(500.0, 500.0, &tariff, true, 0.0).unwrap();
        let bill = compose_bill(500.0, &tariff, 0.0).total;
        assert_abs_diff_eq!(cost, bill, epsilon = 0.01);
    }

    #[test]
    fn marginal_bills_the_top_blocks() {
        // 150 kWh total, 100 kWh appliance: the differential prices the
        // appliance at the blocks its usage actually occupies.
        let tariff = Tariff {
            steps: vec![
                TariffStep {
                    upto: Some(100.0),
                    rate: 1.0,
                },
                TariffStep {
                    upto: None,
                    rate: 2.0,
                },
            ],
            ft_per_kwh: 0.0,
            service_charge: 0.0,
            vat_rate: 0.0,
        };
        // with = 100*1 + 50*2 = 200, without = 50*1 = 50
        let cost = estimate_marginal(150.0, 100.0, &tariff, false, 0.0).unwrap();
        assert_eq!(cost, 150.0);
    }

    #[test]
    fn marginal_service_allocation_adds_proportional_share() {
        let tariff = residential();
        let bare = estimate_marginal(500.0, 100.0, &tariff, false, 0.0).unwrap();
        let allocated = estimate_marginal(500.0, 100.0, &tariff, true, 0.0).unwrap();
        let share = tariff.service_charge * (1.0 + tariff.vat_rate) * (100.0 / 500.0);
        assert_abs_diff_eq!(allocated, bare + share, epsilon = 0.01);
    }

    #[test]
    fn marginal_concrete_scenario_with_allocation() {
        let cost = estimate_marginal(500.0, 100.0, &residential(), true, 0.0).unwrap();
        assert_eq!(cost, 499.50);
    }

    #[test]
    fn marginal_zero_total_usage_skips_the_allocation_term() {
        let cost = estimate_marginal(0.0, 0.0, &residential(), true, 0.0).unwrap();
        assert_eq!(cost, 0.0);
    }

    #[test]
    fn marginal_rejects_out_of_range_usage() {
        let tariff = residential();
        assert!(matches!(
            estimate_marginal(500.0, 600.0, &tariff, false, 0.0),
            Err(BillingError::InvalidRange { .. })
        ));
        assert!(matches!(
            estimate_marginal(500.0, -1.0, &tariff, false, 0.0),
            Err(BillingError::InvalidRange { .. })
        ));
    }

    #[test]
    fn marginal_parts_recompose_into_the_full_bill() {
        let estimate = marginal_estimate(500.0, 100.0, &residential(), true, 0.0).unwrap();
        assert_abs_diff_eq!(
            estimate.without_appliance_total + estimate.appliance_cost,
            estimate.with_appliance_total,
            epsilon = 1e-9
        );
    }

    #[test]
    fn dispatcher_selects_the_requested_method() {
        let tariff = residential();
        let pro_rata = estimate(&EstimateRequest::ProRata {
            bill: BillSummary::new(500.0, 2000.0),
            appliance_kwh: 100.0,
        })
        .unwrap();
        assert!(matches!(pro_rata, EstimateResult::ProRata(_)));
        assert_eq!(pro_rata.appliance_cost(), 428.0);

        let marginal = estimate(&EstimateRequest::Marginal {
            total_kwh: 500.0,
            appliance_kwh: 100.0,
            tariff: &tariff,
            allocate_service_proportionally: true,
            discount: 0.0,
        })
        .unwrap();
        assert!(matches!(marginal, EstimateResult::Marginal(_)));
        assert_eq!(marginal.appliance_cost(), 499.50);
    }
}
