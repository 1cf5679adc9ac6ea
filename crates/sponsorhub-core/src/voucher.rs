use crate::error::SponsorError;
use crate::traits::RoleDirectory;
use ed25519_dalek::{Signature, Verifier};
use serde::{Deserialize, Serialize};
use sponsorhub_types::{AccountId, OrgId, RoleId, SignedVoucher};
use std::collections::HashSet;

/// Digest a voucher commits to: org, beneficiary, expiry, and network id,
/// length-prefixed so field boundaries cannot be confused.
pub fn voucher_digest(
    org: OrgId,
    beneficiary: &AccountId,
    expiry: u64,
    network_id: &str,
) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&org.0.to_le_bytes());
    hasher.update(&(beneficiary.0.len() as u64).to_le_bytes());
    hasher.update(beneficiary.0.as_bytes());
    hasher.update(&expiry.to_le_bytes());
    hasher.update(&(network_id.len() as u64).to_le_bytes());
    hasher.update(network_id.as_bytes());
    *hasher.finalize().as_bytes()
}

/// Org-scoped one-time-use tracking for vouchers.
///
/// Consumption is irreversible and keyed by beneficiary, so the same
/// signature can never sponsor the same account twice under one org. A
/// different org keeps its own set, so re-vouching there is allowed.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VoucherAuthority {
    consumed: HashSet<AccountId>,
}

impl VoucherAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_consumed(&self, beneficiary: &AccountId) -> bool {
        self.consumed.contains(beneficiary)
    }

    /// Verify a voucher without consuming it.
    ///
    /// Checks, in order: voucher role configured, signer currently holds
    /// it, signature valid over the voucher digest, not expired, not yet
    /// consumed for this beneficiary.
    #[allow(clippy::too_many_arguments)]
    pub fn verify(
        &self,
        org: OrgId,
        voucher_role: Option<RoleId>,
        beneficiary: &AccountId,
        voucher: &SignedVoucher,
        roles: &dyn RoleDirectory,
        network_id: &str,
        now: u64,
    ) -> Result<(), SponsorError> {
        let role = voucher_role.ok_or(SponsorError::VoucherRoleNotConfigured(org))?;

        if !roles.holds_role(&voucher.signer, &role) {
            return Err(SponsorError::RoleCheckFailed {
                account: voucher.signer.clone(),
                role,
            });
        }

        let key = roles
            .verifying_key(&voucher.signer)
            .ok_or(SponsorError::VoucherBadSignature)?;
        let sig_bytes: [u8; 64] = voucher
            .signature
            .as_slice()
            .try_into()
            .map_err(|_| SponsorError::VoucherBadSignature)?;
        let signature = Signature::from_bytes(&sig_bytes);

        let digest = voucher_digest(org, beneficiary, voucher.expiry, network_id);
        key.verify(&digest, &signature)
            .map_err(|_| SponsorError::VoucherBadSignature)?;

        if now > voucher.expiry {
            return Err(SponsorError::VoucherExpired {
                expiry: voucher.expiry,
                now,
            });
        }

        if self.is_consumed(beneficiary) {
            return Err(SponsorError::VoucherAlreadyUsed {
                org,
                beneficiary: beneficiary.clone(),
            });
        }

        Ok(())
    }

    /// Mark the beneficiary's voucher consumed. Called only after the whole
    /// admission pipeline has passed, so a rejected request never burns a
    /// voucher.
    pub fn consume(&mut self, beneficiary: AccountId) {
        self.consumed.insert(beneficiary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::InMemoryRoleDirectory;
    use ed25519_dalek::{Signer, SigningKey};
    use rand::rngs::OsRng;

    const NETWORK: &str = "testnet";

    fn signed_voucher(
        key: &SigningKey,
        signer: &AccountId,
        org: OrgId,
        beneficiary: &AccountId,
        expiry: u64,
    ) -> SignedVoucher {
        let digest = voucher_digest(org, beneficiary, expiry, NETWORK);
        SignedVoucher {
            signer: signer.clone(),
            expiry,
            signature: key.sign(&digest).to_bytes().to_vec(),
        }
    }

    fn setup() -> (SigningKey, AccountId, RoleId, InMemoryRoleDirectory) {
        let key = SigningKey::generate(&mut OsRng);
        let signer = AccountId::new("sponsor");
        let role = RoleId(9);
        let mut roles = InMemoryRoleDirectory::new();
        roles.grant(signer.clone(), role);
        roles.register_key(signer.clone(), key.verifying_key());
        (key, signer, role, roles)
    }

    #[test]
    fn valid_voucher_verifies_once_per_org() {
        let (key, signer, role, roles) = setup();
        let org = OrgId(1);
        let beneficiary = AccountId::new("newcomer");
        let voucher = signed_voucher(&key, &signer, org, &beneficiary, 1_000);

        let mut authority = VoucherAuthority::new();
        authority
            .verify(org, Some(role), &beneficiary, &voucher, &roles, NETWORK, 500)
            .unwrap();
        authority.consume(beneficiary.clone());

        let err = authority
            .verify(org, Some(role), &beneficiary, &voucher, &roles, NETWORK, 500)
            .unwrap_err();
        assert!(matches!(err, SponsorError::VoucherAlreadyUsed { .. }));
    }

    #[test]
    fn consumption_is_scoped_per_org() {
        let (key, signer, role, roles) = setup();
        let beneficiary = AccountId::new("newcomer");

        let org_a = OrgId(1);
        let voucher_a = signed_voucher(&key, &signer, org_a, &beneficiary, 1_000);
        let mut authority_a = VoucherAuthority::new();
        authority_a
            .verify(org_a, Some(role), &beneficiary, &voucher_a, &roles, NETWORK, 10)
            .unwrap();
        authority_a.consume(beneficiary.clone());

        // Fresh voucher for the same beneficiary under a different org.
        let org_b = OrgId(2);
        let voucher_b = signed_voucher(&key, &signer, org_b, &beneficiary, 1_000);
        let authority_b = VoucherAuthority::new();
        assert!(authority_b
            .verify(org_b, Some(role), &beneficiary, &voucher_b, &roles, NETWORK, 10)
            .is_ok());
    }

    #[test]
    fn digest_binds_the_org() {
        let (key, signer, role, roles) = setup();
        let beneficiary = AccountId::new("newcomer");
        let voucher = signed_voucher(&key, &signer, OrgId(1), &beneficiary, 1_000);

        // Replaying the same signature against another org fails: the
        // digest differs, so verification does.
        let authority = VoucherAuthority::new();
        let err = authority
            .verify(OrgId(2), Some(role), &beneficiary, &voucher, &roles, NETWORK, 10)
            .unwrap_err();
        assert!(matches!(err, SponsorError::VoucherBadSignature));
    }

    #[test]
    fn expired_voucher_is_rejected() {
        let (key, signer, role, roles) = setup();
        let org = OrgId(1);
        let beneficiary = AccountId::new("newcomer");
        let voucher = signed_voucher(&key, &signer, org, &beneficiary, 100);

        let authority = VoucherAuthority::new();
        let err = authority
            .verify(org, Some(role), &beneficiary, &voucher, &roles, NETWORK, 101)
            .unwrap_err();
        assert!(matches!(err, SponsorError::VoucherExpired { expiry: 100, now: 101 }));
    }

    #[test]
    fn unconfigured_voucher_role_is_rejected() {
        let (key, signer, _role, roles) = setup();
        let org = OrgId(1);
        let beneficiary = AccountId::new("newcomer");
        let voucher = signed_voucher(&key, &signer, org, &beneficiary, 1_000);

        let authority = VoucherAuthority::new();
        let err = authority
            .verify(org, None, &beneficiary, &voucher, &roles, NETWORK, 10)
            .unwrap_err();
        assert!(matches!(err, SponsorError::VoucherRoleNotConfigured(_)));
    }

    #[test]
    fn signer_without_role_is_rejected() {
        let (key, signer, role, _) = setup();
        let org = OrgId(1);
        let beneficiary = AccountId::new("newcomer");
        let voucher = signed_voucher(&key, &signer, org, &beneficiary, 1_000);

        // Directory that knows the key but no longer grants the role.
        let mut roles = InMemoryRoleDirectory::new();
        roles.register_key(signer, key.verifying_key());

        let authority = VoucherAuthority::new();
        let err = authority
            .verify(org, Some(role), &beneficiary, &voucher, &roles, NETWORK, 10)
            .unwrap_err();
        assert!(matches!(err, SponsorError::RoleCheckFailed { .. }));
    }
}
