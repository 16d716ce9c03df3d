//! Per-person allocation of a composed bill.

use std::fmt;

use serde::Serialize;

use super::money::{format_amount, round_to_cents};
use crate::error::BillingError;

/// One participant's share of the bill.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share {
    /// Participant display name.
    pub name: String,
    /// Amount owed, rounded to cents.
    pub amount: f64,
}

/// Ordered per-person allocation of a bill.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitAllocation {
    /// Shares in the caller's participant order.
    pub shares: Vec<Share>,
}

impl SplitAllocation {
    /// Sum of all shares.
    pub fn total(&self) -> f64 {
        self.shares.iter().map(|share| share.amount).sum()
    }
}

impl fmt::Display for SplitAllocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Split allocation ---")?;
        for share in &self.shares {
            writeln!(f, "{:<24}{:>12}", share.name, format_amount(share.amount))?;
        }
        write!(f, "{:<24}{:>12}", "Total", format_amount(self.total()))
    }
}

/// Splits the bill among participants.
///
/// The non-appliance remainder `total - appliance_cost` is divided evenly;
/// the designated appliance user owes their even share plus the full
/// appliance cost. With no designated user, the whole bill (appliance cost
/// included) is divided evenly. Either way the shares sum to `total` before
/// per-share rounding to cents.
///
/// # Errors
///
/// [`BillingError::EmptyParticipantSet`] with no participants,
/// [`BillingError::BlankParticipantName`] or
/// [`BillingError::DuplicateParticipant`] on malformed names, and
/// [`BillingError::UnknownApplianceUser`] when the designated user is not in
/// the set.
pub fn split_bill(
    total: f64,
    appliance_cost: f64,
    participants: &[String],
    appliance_user: Option<&str>,
) -> Result<SplitAllocation, BillingError> {
    if participants.is_empty() {
        return Err(BillingError::EmptyParticipantSet);
    }
    for (i, name) in participants.iter().enumerate() {
        if name.trim().is_empty() {
            return Err(BillingError::BlankParticipantName);
        }
        if participants[..i].contains(name) {
            return Err(BillingError::DuplicateParticipant(name.clone()));
        }
    }
    let appliance_cost = match appliance_user {
        Some(user) => {
            if !participants.iter().any(|name| name == user) {
                return Err(BillingError::UnknownApplianceUser(user.to_string()));
            }
            appliance_cost
        }
        // Nobody to carry the appliance cost, so it stays in the even split.
        None => 0.0,
    };
    let base = total - appliance_cost;
    let per_person = base / participants.len() as f64;
    let shares = participants
        .iter()
        .map(|name| {
            let extra = if appliance_user == Some(name.as_str()) {
                appliance_cost
            } else {
                0.0
            };
            Share {
                name: name.clone(),
                amount: round_to_cents(per_person + extra),
            }
        })
        .collect();
    Ok(SplitAllocation { shares })
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::split_bill;
    use crate::error::BillingError;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn even_split_without_appliance_cost() {
        let allocation = split_bill(300.0, 0.0, &names(&["alice", "bob", "carol"]), None).unwrap();
        assert_eq!(allocation.shares.len(), 3);
        for share in &allocation.shares {
            assert_eq!(share.amount, 100.0);
        }
    }

    #[test]
    fn appliance_user_owes_the_extra() {
        let allocation = split_bill(
            2255.67,
            499.50,
            &names(&["alice", "bob", "carol"]),
            Some("bob"),
        )
        .unwrap();
        assert_eq!(allocation.shares[0].amount, 585.39);
        assert_eq!(allocation.shares[1].amount, 1084.89);
        assert_eq!(allocation.shares[2].amount, 585.39);
    }

    #[test]
    fn shares_sum_to_the_bill_total() {
        let participants = names(&["alice", "bob", "carol", "dan"]);
        let allocation = split_bill(1013.77, 217.31, &participants, Some("dan")).unwrap();
        // one cent of tolerance per participant
        assert_abs_diff_eq!(allocation.total(), 1013.77, epsilon = 0.04);
    }

    #[test]
    fn no_designated_user_splits_the_whole_bill_evenly() {
        let allocation = split_bill(300.0, 90.0, &names(&["alice", "bob"]), None).unwrap();
        assert_eq!(allocation.shares[0].amount, 150.0);
        assert_eq!(allocation.shares[1].amount, 150.0);
        assert_abs_diff_eq!(allocation.total(), 300.0, epsilon = 1e-9);
    }

    #[test]
    fn preserves_participant_order() {
        let participants = names(&["zoe", "alice", "mid"]);
        let allocation = split_bill(90.0, 0.0, &participants, None).unwrap();
        let ordered: Vec<&str> = allocation
            .shares
            .iter()
            .map(|share| share.name.as_str())
            .collect();
        assert_eq!(ordered, ["zoe", "alice", "mid"]);
    }

    #[test]
    fn rejects_empty_participant_set() {
        assert_eq!(
            split_bill(100.0, 0.0, &[], None),
            Err(BillingError::EmptyParticipantSet)
        );
    }

    #[test]
    fn rejects_blank_participant_name() {
        assert_eq!(
            split_bill(100.0, 0.0, &names(&["alice", "  "]), None),
            Err(BillingError::BlankParticipantName)
        );
    }

    #[test]
    fn rejects_duplicate_participant_name() {
        assert_eq!(
            split_bill(100.0, 0.0, &names(&["alice", "bob", "alice"]), None),
            Err(BillingError::DuplicateParticipant("alice".to_string()))
        );
    }

    #[test]
    fn rejects_appliance_user_outside_the_set() {
        assert_eq!(
            split_bill(100.0, 10.0, &names(&["alice", "bob"]), Some("mallory")),
            Err(BillingError::UnknownApplianceUser("mallory".to_string()))
        );
    }

    #[test]
    fn display_lists_every_participant_and_the_total() {
        let allocation = split_bill(300.0, 0.0, &names(&["alice", "bob", "carol"]), None).unwrap();
        let rendered = format!("{allocation}");
        assert!(rendered.contains("alice"));
        assert!(rendered.contains("carol"));
        assert!(rendered.contains("Total"));
        assert!(rendered.contains("300.00"));
    }
}
