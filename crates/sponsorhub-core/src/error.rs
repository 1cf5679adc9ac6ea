use sponsorhub_types::{AccountId, OrgId, RoleId, Selector, SubjectKey, TargetId};
use thiserror::Error;

/// Errors from the sponsorship hub.
///
/// Every `validate`-phase error aborts with zero state mutation. A
/// `SettlementShortfall` aborts the whole settlement, partial updates
/// included.
#[derive(Debug, Error)]
pub enum SponsorError {
    #[error("organization already registered: {0}")]
    DuplicateOrg(OrgId),

    #[error("unknown organization: {0}")]
    UnknownOrg(OrgId),

    #[error("organization is paused: {0}")]
    OrgPaused(OrgId),

    #[error("caller {0} is not the gateway")]
    NotGateway(AccountId),

    #[error("caller {0} is not the global admin")]
    NotGlobalAdmin(AccountId),

    #[error("account {account} does not hold required role {role}")]
    RoleCheckFailed { account: AccountId, role: RoleId },

    #[error("subject claim does not match authenticated sender {sender}")]
    SubjectMismatch { sender: AccountId },

    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("rule denies {target} {selector}")]
    RuleDenied { target: TargetId, selector: Selector },

    #[error("requested max cost {requested} exceeds rule cost hint {hint} for {target} {selector}")]
    CostHintExceeded {
        target: TargetId,
        selector: Selector,
        hint: u64,
        requested: u64,
    },

    #[error("fee component '{component}' is {requested}, cap is {cap}")]
    FeeCapExceeded {
        component: &'static str,
        cap: u64,
        requested: u64,
    },

    #[error("budget exceeded for {subject}: used {used} + requested {requested} > cap {cap}")]
    BudgetExceeded {
        subject: SubjectKey,
        cap: u64,
        used: u64,
        requested: u64,
    },

    #[error("insufficient funding capacity for {org}: requested {requested}, capacity {capacity}")]
    InsufficientFunds {
        org: OrgId,
        requested: u64,
        capacity: u64,
    },

    #[error("grace spend cap exceeded for {org}: used {used} + requested {requested} > cap {cap}")]
    GraceSpendExceeded {
        org: OrgId,
        cap: u64,
        used: u64,
        requested: u64,
    },

    #[error("organization banned from mutual aid: {0}")]
    BannedFromAid(OrgId),

    #[error("voucher role not configured for {0}")]
    VoucherRoleNotConfigured(OrgId),

    #[error("voucher signature verification failed")]
    VoucherBadSignature,

    #[error("voucher expired at {expiry}, now {now}")]
    VoucherExpired { expiry: u64, now: u64 },

    #[error("voucher already used for {beneficiary} under {org}")]
    VoucherAlreadyUsed {
        org: OrgId,
        beneficiary: AccountId,
    },

    #[error("accountless onboarding is disabled")]
    OnboardingDisabled,

    #[error("onboarding cost {requested} exceeds per-creation cap {cap}")]
    OnboardingCostCap { cap: u64, requested: u64 },

    #[error("onboarding daily creation limit reached ({limit})")]
    OnboardingDailyLimit { limit: u32 },

    #[error("mutual-aid pool balance {balance} cannot cover {requested}")]
    PoolInsufficient { balance: u64, requested: u64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("settlement shortfall for {org}: {uncovered} uncovered after deposit and aid headroom")]
    SettlementShortfall { org: OrgId, uncovered: u64 },
}

/// Bounty payment failures. Logged and swallowed by settlement, never
/// propagated.
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("relayer payment rejected: {0}")]
    Rejected(String),

    #[error("payment transport failed: {0}")]
    Transport(String),
}
