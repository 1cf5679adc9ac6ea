use crate::error::SponsorError;
use serde::{Deserialize, Serialize};
use sponsorhub_types::SubjectKey;
use std::collections::HashMap;

/// Bounds on configurable epoch lengths: one minute to one year.
pub const MIN_EPOCH_LEN_SECS: u64 = 60;
pub const MAX_EPOCH_LEN_SECS: u64 = 31_536_000;

/// Rolling-epoch usage cap for one subject.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub cap_per_epoch: u64,
    pub used_in_epoch: u64,
    pub epoch_len: u64,
    pub epoch_start: u64,
}

impl Budget {
    /// Roll the epoch window forward in a single step.
    ///
    /// However many epochs passed, the window lands on the boundary at or
    /// before `now` and usage resets once, never iteratively.
    fn roll(&mut self, now: u64) {
        if now >= self.epoch_start + self.epoch_len {
            let epochs_passed = (now - self.epoch_start) / self.epoch_len;
            self.epoch_start += epochs_passed * self.epoch_len;
            self.used_in_epoch = 0;
        }
    }
}

/// Org-scoped budget table keyed by subject.
///
/// A subject without a configured budget is unmetered: admission passes
/// with no epoch anchor and settlement records nothing.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BudgetBook {
    budgets: HashMap<SubjectKey, Budget>,
}

impl BudgetBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, subject: &SubjectKey) -> Option<&Budget> {
        self.budgets.get(subject)
    }

    pub fn configure(
        &mut self,
        subject: SubjectKey,
        cap_per_epoch: u64,
        epoch_len: u64,
        now: u64,
    ) -> Result<(), SponsorError> {
        if !(MIN_EPOCH_LEN_SECS..=MAX_EPOCH_LEN_SECS).contains(&epoch_len) {
            return Err(SponsorError::InvalidConfig(format!(
                "epoch length {epoch_len} out of bounds [{MIN_EPOCH_LEN_SECS}, {MAX_EPOCH_LEN_SECS}]"
            )));
        }

        self.budgets.insert(
            subject,
            Budget {
                cap_per_epoch,
                used_in_epoch: 0,
                epoch_len,
                epoch_start: now,
            },
        );
        Ok(())
    }

    /// Reposition the epoch window. Usage resets, so in-flight tokens
    /// anchored to the old window settle as stale no-ops.
    pub fn set_epoch_start(
        &mut self,
        subject: &SubjectKey,
        epoch_start: u64,
    ) -> Result<(), SponsorError> {
        let budget = self.budgets.get_mut(subject).ok_or_else(|| {
            SponsorError::InvalidConfig(format!("no budget configured for {subject}"))
        })?;
        budget.epoch_start = epoch_start;
        budget.used_in_epoch = 0;
        Ok(())
    }

    /// Admission check. Rolls the window, verifies the requested cost fits,
    /// and returns the epoch anchor the continuation token carries. `None`
    /// means the subject is unmetered.
    pub fn check_and_anchor(
        &mut self,
        subject: &SubjectKey,
        requested: u64,
        now: u64,
    ) -> Result<Option<u64>, SponsorError> {
        let Some(budget) = self.budgets.get_mut(subject) else {
            return Ok(None);
        };

        budget.roll(now);

        if budget.used_in_epoch.saturating_add(requested) > budget.cap_per_epoch {
            return Err(SponsorError::BudgetExceeded {
                subject: subject.clone(),
                cap: budget.cap_per_epoch,
                used: budget.used_in_epoch,
                requested,
            });
        }
        Ok(Some(budget.epoch_start))
    }

    /// Settlement-side usage recording. The actual cost counts only when
    /// the anchored epoch is still the current one; a stale anchor is
    /// skipped silently.
    pub fn apply_usage(&mut self, subject: &SubjectKey, anchor: u64, actual: u64, now: u64) {
        if let Some(budget) = self.budgets.get_mut(subject) {
            budget.roll(now);
            if budget.epoch_start == anchor {
                budget.used_in_epoch = budget.used_in_epoch.saturating_add(actual);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sponsorhub_types::{AccountId, SubjectKey};

    fn subject() -> SubjectKey {
        SubjectKey::Account(AccountId::new("alice"))
    }

    #[test]
    fn rollover_is_single_step() {
        let mut book = BudgetBook::new();
        book.configure(subject(), 100, 3600, 0).unwrap();
        book.apply_usage(&subject(), 0, 99, 0);
        assert_eq!(book.get(&subject()).unwrap().used_in_epoch, 99);

        // Two full epochs later: window lands on 7200, usage resets once.
        let anchor = book.check_and_anchor(&subject(), 50, 7200).unwrap();
        assert_eq!(anchor, Some(7200));

        book.apply_usage(&subject(), 7200, 50, 7200);
        let budget = book.get(&subject()).unwrap();
        assert_eq!(budget.epoch_start, 7200);
        assert_eq!(budget.used_in_epoch, 50);
    }

    #[test]
    fn reservation_over_cap_is_rejected() {
        let mut book = BudgetBook::new();
        book.configure(subject(), 100, 3600, 0).unwrap();
        book.apply_usage(&subject(), 0, 99, 10);

        let err = book.check_and_anchor(&subject(), 2, 20).unwrap_err();
        assert!(matches!(
            err,
            SponsorError::BudgetExceeded { cap: 100, used: 99, requested: 2, .. }
        ));
    }

    #[test]
    fn stale_anchor_is_skipped() {
        let mut book = BudgetBook::new();
        book.configure(subject(), 100, 3600, 0).unwrap();

        let anchor = book.check_and_anchor(&subject(), 10, 100).unwrap().unwrap();
        // Epoch rolls before settlement arrives.
        book.apply_usage(&subject(), anchor, 10, 3600);
        assert_eq!(book.get(&subject()).unwrap().used_in_epoch, 0);
    }

    #[test]
    fn unmetered_subject_has_no_anchor() {
        let mut book = BudgetBook::new();
        assert_eq!(book.check_and_anchor(&subject(), 10, 0).unwrap(), None);
    }

    #[test]
    fn epoch_length_bounds_are_enforced() {
        let mut book = BudgetBook::new();
        assert!(book.configure(subject(), 100, 59, 0).is_err());
        assert!(book
            .configure(subject(), 100, MAX_EPOCH_LEN_SECS + 1, 0)
            .is_err());
        assert!(book.configure(subject(), 100, 60, 0).is_ok());
    }

    #[test]
    fn repositioning_epoch_start_resets_usage() {
        let mut book = BudgetBook::new();
        book.configure(subject(), 100, 3600, 0).unwrap();
        book.apply_usage(&subject(), 0, 40, 10);

        book.set_epoch_start(&subject(), 1000).unwrap();
        let budget = book.get(&subject()).unwrap();
        assert_eq!(budget.epoch_start, 1000);
        assert_eq!(budget.used_in_epoch, 0);
    }
}
