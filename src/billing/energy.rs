//! Tiered (block) energy charge computation.

use super::tariff::TariffStep;

/// Computes the energy charge for `kwh` against ordered rate blocks.
///
/// Walks the blocks in order, billing each unit of usage at the rate of the
/// block it falls into (true marginal-block pricing, not an average-rate
/// approximation). Usage beyond a block's cap spills into the next block,
/// and the walk stops as soon as all usage is billed.
///
/// The result is monotonically non-decreasing in `kwh` and piecewise-linear
/// with slope equal to the active block's rate. Zero usage costs nothing,
/// and no block is ever billed a negative quantity.
///
/// # Examples
///
/// ```
/// use tariff_split::billing::energy::energy_charge;
/// use tariff_split::billing::tariff::TariffStep;
///
/// let steps = [
///     TariffStep { upto: Some(150.0), rate: 3.0 },
///     TariffStep { upto: None, rate: 4.0 },
/// ];
/// assert_eq!(energy_charge(200.0, &steps), 650.0);
/// ```
pub fn energy_charge(kwh: f64, steps: &[TariffStep]) -> f64 {
    let mut remaining = kwh;
    let mut prev_cap = 0.0;
    let mut total = 0.0;
    for step in steps {
        let cap = step.cap();
        let quantity = remaining.min(cap - prev_cap).max(0.0);
        total += quantity * step.rate;
        remaining -= quantity;
        prev_cap = cap;
        if remaining <= 0.0 {
            break;
        }
    }
    total
}
