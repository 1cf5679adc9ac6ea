use crate::error::SponsorError;
use serde::{Deserialize, Serialize};
use sponsorhub_types::OrgId;

/// Accounting period for mutual-aid usage: 90 days.
pub const PERIOD_LEN_SECS: u64 = 90 * 86_400;

/// Per-org financial record.
///
/// Invariant: `spent <= deposited` at all times; `total_deposited` only
/// grows. `aid_used_this_period` tracks pool draws against the current
/// period, whether the grace cap or the match allowance governs them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgFinancials {
    pub deposited: u64,
    pub total_deposited: u64,
    pub spent: u64,
    pub aid_used_this_period: u64,
    pub period_start: u64,
}

/// How settlement funds an operation: the org's own deposits plus a pool
/// draw. Computed in full before anything commits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SettlementSplit {
    pub from_deposits: u64,
    pub from_pool: u64,
}

impl OrgFinancials {
    pub fn new(now: u64) -> Self {
        Self {
            deposited: 0,
            total_deposited: 0,
            spent: 0,
            aid_used_this_period: 0,
            period_start: now,
        }
    }

    pub fn available(&self) -> u64 {
        self.deposited - self.spent
    }

    /// Record a deposit. Returns true when this funding is the org's first
    /// ever, so the caller can bump the pool's funded-org count.
    ///
    /// The aid period resets when available balance crosses the minimum
    /// deposit threshold upward, and on the 90-day rollover.
    pub fn deposit(&mut self, amount: u64, min_deposit: u64, now: u64) -> bool {
        let newly_funded = self.total_deposited == 0 && amount > 0;
        let crossed_up =
            self.available() < min_deposit && self.available() + amount >= min_deposit;

        self.deposited += amount;
        self.total_deposited += amount;

        if newly_funded || crossed_up {
            self.reset_period(now);
        } else {
            self.roll_period(now);
        }
        newly_funded
    }

    /// Lazy 90-day rollover, applied before any aid accounting.
    pub fn roll_period(&mut self, now: u64) {
        if now >= self.period_start + PERIOD_LEN_SECS {
            self.reset_period(now);
        }
    }

    fn reset_period(&mut self, now: u64) {
        self.period_start = now;
        self.aid_used_this_period = 0;
    }

    /// Tiered mutual-aid match allowance as a step function of available
    /// balance relative to the minimum deposit `m`:
    ///
    /// - below `m`: no match
    /// - exactly `m`: double the balance
    /// - between `m` and `2m`: `2m` plus the excess over `m`
    /// - above `2m`: self-funded, no match
    pub fn match_allowance(&self, min_deposit: u64) -> u64 {
        let available = self.available();
        if available < min_deposit {
            0
        } else if available == min_deposit {
            2 * available
        } else if available <= 2 * min_deposit {
            2 * min_deposit + (available - min_deposit)
        } else {
            0
        }
    }

    /// Allowance headroom left in the current period.
    pub fn remaining_allowance(&self, min_deposit: u64) -> u64 {
        self.match_allowance(min_deposit)
            .saturating_sub(self.aid_used_this_period)
    }

    /// Plan the post-grace settlement split for `total`.
    ///
    /// Target is a 50/50 split between deposits and the remaining match
    /// allowance. A short side is topped up first from deposit headroom,
    /// then from allowance headroom; anything still uncovered fails the
    /// whole settlement.
    pub fn plan_split(
        &self,
        org: OrgId,
        total: u64,
        min_deposit: u64,
        pool_balance: u64,
    ) -> Result<SettlementSplit, SponsorError> {
        let available = self.available();
        let aid_cap = self.remaining_allowance(min_deposit).min(pool_balance);

        let pool_target = total / 2;
        let deposit_target = total - pool_target;

        let mut from_deposits = deposit_target.min(available);
        let mut from_pool = pool_target.min(aid_cap);

        let mut uncovered = total - from_deposits - from_pool;
        if uncovered > 0 {
            let topped = uncovered.min(available - from_deposits);
            from_deposits += topped;
            uncovered -= topped;
        }
        if uncovered > 0 {
            let topped = uncovered.min(aid_cap - from_pool);
            from_pool += topped;
            uncovered -= topped;
        }
        if uncovered > 0 {
            return Err(SponsorError::SettlementShortfall { org, uncovered });
        }

        Ok(SettlementSplit {
            from_deposits,
            from_pool,
        })
    }

    /// Commit a planned split against this record.
    pub fn apply_split(&mut self, split: SettlementSplit) {
        self.spent += split.from_deposits;
        self.aid_used_this_period += split.from_pool;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn funded(available: u64) -> OrgFinancials {
        let mut fin = OrgFinancials::new(0);
        fin.deposit(available, 10, 0);
        fin
    }

    #[test]
    fn tier_table_matches_step_function() {
        // min_deposit = 10.
        assert_eq!(funded(9).match_allowance(10), 0);
        assert_eq!(funded(10).match_allowance(10), 20);
        assert_eq!(funded(15).match_allowance(10), 25);
        assert_eq!(funded(20).match_allowance(10), 30);
        assert_eq!(funded(21).match_allowance(10), 0);
        assert_eq!(funded(25).match_allowance(10), 0);
    }

    #[test]
    fn first_deposit_resets_period() {
        let mut fin = OrgFinancials::new(0);
        fin.aid_used_this_period = 7;
        let newly_funded = fin.deposit(5, 100, 1_000);
        assert!(newly_funded);
        assert_eq!(fin.period_start, 1_000);
        assert_eq!(fin.aid_used_this_period, 0);
    }

    #[test]
    fn crossing_min_deposit_upward_resets_period() {
        let mut fin = OrgFinancials::new(0);
        fin.deposit(4, 10, 0);
        fin.aid_used_this_period = 3;

        // 4 -> 9 stays below the threshold: no reset.
        assert!(!fin.deposit(5, 10, 500));
        assert_eq!(fin.aid_used_this_period, 3);

        // 9 -> 12 crosses it: reset.
        assert!(!fin.deposit(3, 10, 900));
        assert_eq!(fin.period_start, 900);
        assert_eq!(fin.aid_used_this_period, 0);
    }

    #[test]
    fn period_rolls_after_ninety_days() {
        let mut fin = funded(50);
        fin.aid_used_this_period = 12;
        fin.roll_period(PERIOD_LEN_SECS - 1);
        assert_eq!(fin.aid_used_this_period, 12);

        fin.roll_period(PERIOD_LEN_SECS);
        assert_eq!(fin.aid_used_this_period, 0);
        assert_eq!(fin.period_start, PERIOD_LEN_SECS);
    }

    #[test]
    fn split_is_half_and_half_when_both_sides_cover() {
        let fin = funded(20); // min_deposit 10 -> allowance 30
        let split = fin.plan_split(OrgId(1), 10, 10, 1_000).unwrap();
        assert_eq!(split.from_deposits, 5);
        assert_eq!(split.from_pool, 5);
    }

    #[test]
    fn deposit_headroom_covers_pool_shortfall_first() {
        let fin = funded(20); // allowance 30
        // Pool can only contribute 2.
        let split = fin.plan_split(OrgId(1), 10, 10, 2).unwrap();
        assert_eq!(split.from_pool, 2);
        assert_eq!(split.from_deposits, 8);
    }

    #[test]
    fn allowance_headroom_covers_deposit_shortfall() {
        let fin = funded(10); // available 10, allowance 20
        let split = fin.plan_split(OrgId(1), 24, 10, 1_000).unwrap();
        assert_eq!(split.from_deposits, 10);
        assert_eq!(split.from_pool, 14);
    }

    #[test]
    fn exhausted_headroom_fails_the_settlement() {
        let fin = funded(10); // capacity 10 + 20
        let err = fin.plan_split(OrgId(1), 31, 10, 1_000).unwrap_err();
        assert!(matches!(
            err,
            SponsorError::SettlementShortfall { uncovered: 1, .. }
        ));
    }

    #[test]
    fn apply_split_preserves_spent_invariant() {
        let mut fin = funded(10);
        let split = fin.plan_split(OrgId(1), 24, 10, 1_000).unwrap();
        fin.apply_split(split);
        assert!(fin.spent <= fin.deposited);
        assert_eq!(fin.available(), 0);
        assert_eq!(fin.aid_used_this_period, 14);
    }
}
