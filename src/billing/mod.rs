//! Billing engine: energy charge, bill composition, attribution, and split.

/// Bill composition from usage, tariff, and discount.
pub mod bill;
/// Tiered (block) energy charge walk.
pub mod energy;
pub mod estimator;
pub mod money;
/// Per-person allocation of a composed bill.
pub mod split;
pub mod tariff;

// Re-export the main types for convenience
pub use bill::BillBreakdown;
pub use bill::BillSummary;
pub use bill::compose_bill;
pub use energy::energy_charge;
pub use estimator::{
    EstimateRequest, EstimateResult, MarginalEstimate, ProRataEstimate, estimate,
    estimate_marginal, estimate_pro_rata, marginal_estimate,
};
pub use split::{Share, SplitAllocation, split_bill};
pub use tariff::{Tariff, TariffStep};
