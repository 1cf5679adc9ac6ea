use crate::ids::{AccountId, OrgId, RoleId, Selector, TargetId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One resolved (target, operation) pair.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallRef {
    pub target: TargetId,
    pub selector: Selector,
}

impl CallRef {
    pub fn new(target: TargetId, selector: Selector) -> Self {
        Self { target, selector }
    }
}

/// The call addressing conventions the Gateway forwards.
///
/// `TopLevel` is the coarse mode: the inner operation is opaque, so policy
/// resolution falls back to the wildcard selector for the target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallEnvelope {
    Direct { target: TargetId, selector: Selector },
    Batch { calls: Vec<CallRef> },
    TopLevel { target: TargetId },
}

impl CallEnvelope {
    /// Resolve to the effective (target, selector) pairs policy is checked
    /// against. An empty batch resolves to an empty set, which the hub
    /// rejects as malformed.
    pub fn resolve(&self) -> Vec<CallRef> {
        match self {
            Self::Direct { target, selector } => {
                vec![CallRef::new(target.clone(), selector.clone())]
            }
            Self::Batch { calls } => calls.clone(),
            Self::TopLevel { target } => vec![CallRef::new(target.clone(), Selector::wildcard())],
        }
    }
}

/// Price/resource parameters declared up front, each individually capped
/// per org by the fee cap table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    pub unit_cost: u64,
    pub priority_cost: u64,
    pub exec_cost: u64,
    pub verify_cost: u64,
    pub pre_cost: u64,
}

/// A one-time, expiring, signed sponsorship credential.
///
/// The signature covers `blake3(org ‖ beneficiary ‖ expiry ‖ network_id)`
/// and must verify against the registered key of `signer`, who must hold
/// the org's voucher role at validation time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedVoucher {
    pub signer: AccountId,
    pub expiry: u64,
    /// 64-byte Ed25519 signature.
    pub signature: Vec<u8>,
}

/// Who the operation is sponsored as.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectClaim {
    /// The sender acts for itself.
    SelfAccount { account: AccountId },
    /// The sender claims membership of an org role.
    RoleMember { account: AccountId, role: RoleId },
    /// A newcomer carrying a voucher from a role holder.
    Vouched {
        beneficiary: AccountId,
        voucher: SignedVoucher,
    },
    /// Accountless bootstrap path; no org applies.
    Onboarding,
}

/// Execution result reported back by the Gateway at settlement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure,
}

/// Verified request envelope handed over by the Gateway.
///
/// Transport-layer signature verification has already happened; `sender`
/// is the authenticated originating account.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub correlation_id: String,
    pub org: Option<OrgId>,
    pub sender: AccountId,
    pub subject: SubjectClaim,
    pub call: CallEnvelope,
    /// Ceiling the subject commits to; settlement reports actual cost.
    pub max_cost: u64,
    pub fees: FeeBreakdown,
    /// The relayer that carried the operation, eligible for a bounty tip.
    pub relayer: AccountId,
    /// Marks the operation bounty-eligible on successful settlement.
    pub bounty_tag: bool,
}

impl RequestEnvelope {
    pub fn new(
        org: Option<OrgId>,
        sender: AccountId,
        subject: SubjectClaim,
        call: CallEnvelope,
        max_cost: u64,
    ) -> Self {
        Self {
            correlation_id: Uuid::new_v4().to_string(),
            org,
            sender: sender.clone(),
            subject,
            call,
            max_cost,
            fees: FeeBreakdown::default(),
            relayer: sender,
            bounty_tag: false,
        }
    }

    pub fn with_fees(mut self, fees: FeeBreakdown) -> Self {
        self.fees = fees;
        self
    }

    pub fn with_relayer(mut self, relayer: AccountId, bounty_tag: bool) -> Self {
        self.relayer = relayer;
        self.bounty_tag = bounty_tag;
        self
    }
}
