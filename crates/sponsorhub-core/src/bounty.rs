use crate::error::SponsorError;
use crate::pool::BPS_DENOMINATOR;
use serde::{Deserialize, Serialize};

/// Per-org relayer tip policy, paid from the hub's own float.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BountyPolicy {
    pub enabled: bool,
    pub max_absolute: u64,
    pub pct_cap_basis_points: u16,
    pub total_paid: u64,
}

impl Default for BountyPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            max_absolute: 0,
            pct_cap_basis_points: 0,
            total_paid: 0,
        }
    }
}

impl BountyPolicy {
    pub fn configure(
        &mut self,
        enabled: bool,
        max_absolute: u64,
        pct_cap_basis_points: u16,
    ) -> Result<(), SponsorError> {
        if pct_cap_basis_points as u64 > BPS_DENOMINATOR {
            return Err(SponsorError::InvalidConfig(format!(
                "bounty percentage {pct_cap_basis_points} bps exceeds {BPS_DENOMINATOR}"
            )));
        }
        self.enabled = enabled;
        self.max_absolute = max_absolute;
        self.pct_cap_basis_points = pct_cap_basis_points;
        Ok(())
    }

    /// Tip for a settled operation: the smallest of the absolute cap, the
    /// percentage cap over actual cost, and the hub float.
    pub fn tip_for(&self, actual_cost: u64, hub_float: u64) -> u64 {
        if !self.enabled {
            return 0;
        }
        let pct_cap = (actual_cost as u128 * self.pct_cap_basis_points as u128
            / BPS_DENOMINATOR as u128) as u64;
        self.max_absolute.min(pct_cap).min(hub_float)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> BountyPolicy {
        let mut policy = BountyPolicy::default();
        policy.configure(true, 40, 500).unwrap(); // 5%
        policy
    }

    #[test]
    fn tip_is_minimum_of_three_caps() {
        let policy = policy();
        // pct cap binds: 5% of 100 = 5.
        assert_eq!(policy.tip_for(100, 1_000), 5);
        // absolute cap binds: 5% of 10_000 = 500 > 40.
        assert_eq!(policy.tip_for(10_000, 1_000), 40);
        // float binds.
        assert_eq!(policy.tip_for(10_000, 7), 7);
    }

    #[test]
    fn percentage_cap_survives_extreme_costs() {
        let mut policy = BountyPolicy::default();
        policy.configure(true, u64::MAX, 500).unwrap();
        assert_eq!(policy.tip_for(u64::MAX, u64::MAX), u64::MAX / 20);
    }

    #[test]
    fn disabled_policy_pays_nothing() {
        let mut policy = policy();
        policy.enabled = false;
        assert_eq!(policy.tip_for(10_000, 1_000), 0);
    }

    #[test]
    fn percentage_cap_is_bounded() {
        let mut policy = BountyPolicy::default();
        assert!(policy.configure(true, 10, 10_001).is_err());
        assert!(policy.configure(true, 10, 10_000).is_ok());
    }
}
