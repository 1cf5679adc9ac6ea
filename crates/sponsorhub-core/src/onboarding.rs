use crate::error::SponsorError;
use serde::{Deserialize, Serialize};

const SECS_PER_DAY: u64 = 86_400;

/// Admin-set knobs for the accountless bootstrap path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingConfig {
    pub enabled: bool,
    pub max_cost_per_creation: u64,
    pub daily_creation_limit: u32,
}

impl Default for OnboardingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_cost_per_creation: 0,
            daily_creation_limit: 0,
        }
    }
}

/// Pool-funded onboarding, fully isolated from organization accounting.
///
/// The daily counter is keyed to the day id `now / 86400` and resets when
/// the day changes; config updates keep the counters.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct OnboardingSubsidizer {
    config: OnboardingConfig,
    created_today: u32,
    current_day: u64,
}

impl OnboardingSubsidizer {
    pub fn new(config: OnboardingConfig) -> Self {
        Self {
            config,
            created_today: 0,
            current_day: 0,
        }
    }

    pub fn config(&self) -> OnboardingConfig {
        self.config
    }

    pub fn set_config(&mut self, config: OnboardingConfig) {
        self.config = config;
    }

    pub fn created_today(&self, now: u64) -> u32 {
        if now / SECS_PER_DAY == self.current_day {
            self.created_today
        } else {
            0
        }
    }

    /// Admission check for one accountless creation.
    pub fn admit(&self, now: u64, requested: u64, pool_balance: u64) -> Result<(), SponsorError> {
        if !self.config.enabled {
            return Err(SponsorError::OnboardingDisabled);
        }
        if requested > self.config.max_cost_per_creation {
            return Err(SponsorError::OnboardingCostCap {
                cap: self.config.max_cost_per_creation,
                requested,
            });
        }
        if self.created_today(now) >= self.config.daily_creation_limit {
            return Err(SponsorError::OnboardingDailyLimit {
                limit: self.config.daily_creation_limit,
            });
        }
        if pool_balance < requested {
            return Err(SponsorError::PoolInsufficient {
                balance: pool_balance,
                requested,
            });
        }
        Ok(())
    }

    /// Settlement-side counter advance: reset to 1 on day rollover, else
    /// increment.
    pub fn record_creation(&mut self, now: u64) {
        let day = now / SECS_PER_DAY;
        if day == self.current_day {
            self.created_today += 1;
        } else {
            self.current_day = day;
            self.created_today = 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subsidizer() -> OnboardingSubsidizer {
        OnboardingSubsidizer::new(OnboardingConfig {
            enabled: true,
            max_cost_per_creation: 100,
            daily_creation_limit: 2,
        })
    }

    #[test]
    fn disabled_path_rejects() {
        let mut s = subsidizer();
        s.set_config(OnboardingConfig {
            enabled: false,
            ..s.config()
        });
        assert!(matches!(
            s.admit(0, 10, 1_000),
            Err(SponsorError::OnboardingDisabled)
        ));
    }

    #[test]
    fn per_creation_cap_applies() {
        let s = subsidizer();
        assert!(s.admit(0, 100, 1_000).is_ok());
        assert!(matches!(
            s.admit(0, 101, 1_000),
            Err(SponsorError::OnboardingCostCap { cap: 100, .. })
        ));
    }

    #[test]
    fn daily_limit_resets_on_day_change() {
        let mut s = subsidizer();
        s.record_creation(100);
        s.record_creation(200);
        assert!(matches!(
            s.admit(300, 10, 1_000),
            Err(SponsorError::OnboardingDailyLimit { limit: 2 })
        ));

        // Next day: counter resets to 1 on the first settlement.
        let next_day = SECS_PER_DAY + 5;
        assert!(s.admit(next_day, 10, 1_000).is_ok());
        s.record_creation(next_day);
        assert_eq!(s.created_today(next_day), 1);
    }

    #[test]
    fn pool_must_cover_requested_cost() {
        let s = subsidizer();
        assert!(matches!(
            s.admit(0, 50, 49),
            Err(SponsorError::PoolInsufficient { balance: 49, requested: 50 })
        ));
    }
}
