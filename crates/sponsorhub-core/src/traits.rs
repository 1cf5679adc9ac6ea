use crate::error::PaymentError;
use ed25519_dalek::VerifyingKey;
use sponsorhub_types::{AccountId, RoleId};

/// External role-membership and key directory.
///
/// Role assignment lives outside the hub; the hub only asks whether an
/// account currently holds a role and which verifying key it registered.
pub trait RoleDirectory: Send + Sync {
    fn holds_role(&self, account: &AccountId, role: &RoleId) -> bool;

    /// Registered Ed25519 key for the account, used to verify vouchers.
    fn verifying_key(&self, account: &AccountId) -> Option<VerifyingKey>;
}

/// Outbound payment port for the bounty path.
///
/// Failures here are non-fatal to settlement; the hub logs and moves on.
pub trait RelayerPayments: Send + Sync {
    fn pay(&self, relayer: &AccountId, amount: u64) -> Result<(), PaymentError>;
}
