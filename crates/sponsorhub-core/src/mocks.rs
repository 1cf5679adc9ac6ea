use crate::clock::Clock;
use crate::error::PaymentError;
use crate::traits::{RelayerPayments, RoleDirectory};
use ed25519_dalek::VerifyingKey;
use sponsorhub_types::{AccountId, RoleId};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// In-memory role and key directory for tests and gateway harnesses.
#[derive(Debug, Default)]
pub struct InMemoryRoleDirectory {
    memberships: HashSet<(AccountId, RoleId)>,
    keys: HashMap<AccountId, VerifyingKey>,
}

impl InMemoryRoleDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&mut self, account: AccountId, role: RoleId) {
        self.memberships.insert((account, role));
    }

    pub fn revoke(&mut self, account: &AccountId, role: &RoleId) {
        self.memberships.remove(&(account.clone(), *role));
    }

    pub fn register_key(&mut self, account: AccountId, key: VerifyingKey) {
        self.keys.insert(account, key);
    }
}

impl RoleDirectory for InMemoryRoleDirectory {
    fn holds_role(&self, account: &AccountId, role: &RoleId) -> bool {
        self.memberships.contains(&(account.clone(), *role))
    }

    fn verifying_key(&self, account: &AccountId) -> Option<VerifyingKey> {
        self.keys.get(account).copied()
    }
}

/// Payment port that records every tip, optionally failing on command.
#[derive(Debug, Default)]
pub struct RecordingPayments {
    paid: Mutex<Vec<(AccountId, u64)>>,
    fail: Mutex<bool>,
}

impl RecordingPayments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    pub fn paid(&self) -> Vec<(AccountId, u64)> {
        self.paid.lock().unwrap().clone()
    }
}

impl RelayerPayments for RecordingPayments {
    fn pay(&self, relayer: &AccountId, amount: u64) -> Result<(), PaymentError> {
        if *self.fail.lock().unwrap() {
            return Err(PaymentError::Rejected("recording payments set to fail".into()));
        }
        self.paid.lock().unwrap().push((relayer.clone(), amount));
        Ok(())
    }
}

/// Manually advanced clock for exact epoch arithmetic in tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn at(now: u64) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_unix(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_grants_and_revokes() {
        let mut directory = InMemoryRoleDirectory::new();
        let account = AccountId::new("alice");
        let role = RoleId(3);

        assert!(!directory.holds_role(&account, &role));
        directory.grant(account.clone(), role);
        assert!(directory.holds_role(&account, &role));
        directory.revoke(&account, &role);
        assert!(!directory.holds_role(&account, &role));
    }

    #[test]
    fn recording_payments_toggles_failure() {
        let payments = RecordingPayments::new();
        let relayer = AccountId::new("relayer");

        payments.pay(&relayer, 5).unwrap();
        payments.fail_next(true);
        assert!(payments.pay(&relayer, 5).is_err());
        assert_eq!(payments.paid(), vec![(relayer, 5)]);
    }

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::at(100);
        clock.advance(50);
        assert_eq!(clock.now_unix(), 150);
    }
}
