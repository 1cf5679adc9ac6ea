use crate::error::SponsorError;
use serde::{Deserialize, Serialize};

/// Basis-point denominator used by the fee skim and the bounty cap.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Global grace-period policy, admin-mutable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GracePeriodConfig {
    /// Length of the initial free tier, in days from registration.
    pub grace_days: u32,
    /// Flat per-period pool spend cap while in grace, balance ignored.
    pub max_spend_during_grace: u64,
    /// Minimum available balance for the tiered match allowance.
    pub min_deposit: u64,
}

impl Default for GracePeriodConfig {
    fn default() -> Self {
        Self {
            grace_days: 14,
            max_spend_during_grace: 0,
            min_deposit: 0,
        }
    }
}

impl GracePeriodConfig {
    pub fn grace_secs(&self) -> u64 {
        self.grace_days as u64 * 86_400
    }
}

/// Shared mutual-aid fund.
///
/// Fed by the per-settlement fee skim and voluntary donations; drawn down
/// by aid-funded settlements and onboarding subsidies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutualAidPool {
    pub balance: u64,
    pub fee_basis_points: u16,
    pub funded_orgs: u64,
}

/// Read model for the pool accessor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStatus {
    pub balance: u64,
    pub fee_basis_points: u16,
    pub funded_orgs: u64,
}

impl MutualAidPool {
    pub fn new(fee_basis_points: u16) -> Self {
        Self {
            balance: 0,
            fee_basis_points,
            funded_orgs: 0,
        }
    }

    pub fn donate(&mut self, amount: u64) {
        self.balance += amount;
    }

    /// Fee skimmed into the pool for a settled operation. Widened to u128
    /// so extreme costs cannot overflow the product.
    pub fn fee_for(&self, actual_cost: u64) -> u64 {
        (actual_cost as u128 * self.fee_basis_points as u128 / BPS_DENOMINATOR as u128) as u64
    }

    pub fn collect_fee(&mut self, actual_cost: u64) -> u64 {
        let fee = self.fee_for(actual_cost);
        self.balance += fee;
        fee
    }

    pub fn draw(&mut self, amount: u64) -> Result<(), SponsorError> {
        if self.balance < amount {
            return Err(SponsorError::PoolInsufficient {
                balance: self.balance,
                requested: amount,
            });
        }
        self.balance -= amount;
        Ok(())
    }

    pub fn set_fee_basis_points(&mut self, fee_basis_points: u16) -> Result<(), SponsorError> {
        if fee_basis_points as u64 > BPS_DENOMINATOR {
            return Err(SponsorError::InvalidConfig(format!(
                "pool fee {fee_basis_points} bps exceeds {BPS_DENOMINATOR}"
            )));
        }
        self.fee_basis_points = fee_basis_points;
        Ok(())
    }

    pub fn status(&self) -> PoolStatus {
        PoolStatus {
            balance: self.balance,
            fee_basis_points: self.fee_basis_points,
            funded_orgs: self.funded_orgs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_is_basis_points_of_actual() {
        let pool = MutualAidPool::new(250);
        assert_eq!(pool.fee_for(10_000), 250);
        assert_eq!(pool.fee_for(39), 0);
    }

    #[test]
    fn fee_survives_extreme_costs() {
        let pool = MutualAidPool::new(10_000);
        assert_eq!(pool.fee_for(u64::MAX), u64::MAX);
        let pool = MutualAidPool::new(250);
        assert_eq!(pool.fee_for(u64::MAX), u64::MAX / 40);
    }

    #[test]
    fn draw_fails_on_insufficient_balance() {
        let mut pool = MutualAidPool::new(0);
        pool.donate(10);
        assert!(pool.draw(11).is_err());
        assert!(pool.draw(10).is_ok());
        assert_eq!(pool.balance, 0);
    }

    #[test]
    fn fee_bps_is_bounded() {
        let mut pool = MutualAidPool::new(0);
        assert!(pool.set_fee_basis_points(10_000).is_ok());
        assert!(pool.set_fee_basis_points(10_001).is_err());
    }

    #[test]
    fn collect_fee_adds_to_balance() {
        let mut pool = MutualAidPool::new(100);
        let fee = pool.collect_fee(5_000);
        assert_eq!(fee, 50);
        assert_eq!(pool.balance, 50);
    }
}
