//! Sponsorship and metering hub.
//!
//! Decides, for each operation request forwarded by the trusted Gateway,
//! whether its cost will be covered, by whom, and under which limits:
//!
//! - **RuleTable** — per-(org, target, operation) allow/deny policy
//! - **FeeCapTable** — per-org ceilings on declared price parameters
//! - **BudgetLedger** — rolling-epoch usage caps per subject
//! - **VoucherAuthority** — signed one-time onboarding credentials
//! - **OrgFinancialLedger** — deposits, spend, tiered match allowance
//! - **MutualAidPool** — shared fund, fee skim, grace and ban state
//! - **OnboardingSubsidizer** — accountless bootstrap path
//! - **BountyDisburser** — best-effort relayer tips from the hub float
//! - **SponsorshipHub** — the two-phase validate/settle orchestrator
//!
//! ## Invariants
//!
//! - `spent <= deposited` for every org after every settlement.
//! - `validate` mutates nothing on failure; a settlement shortfall aborts
//!   the whole settlement with no partial counters committed.
//! - Vouchers are one-time per (org, beneficiary); consumption is
//!   irreversible and org-scoped.
//! - Epoch usage from stale continuation tokens is dropped silently via
//!   the anchor comparison, never double-counted.

#![deny(unsafe_code)]

pub mod bounty;
pub mod budget;
pub mod clock;
pub mod error;
pub mod fee_caps;
pub mod financials;
pub mod hub;
pub mod mocks;
pub mod onboarding;
pub mod pool;
pub mod registry;
pub mod rules;
pub mod traits;
pub mod voucher;

pub use bounty::BountyPolicy;
pub use budget::{Budget, BudgetBook, MAX_EPOCH_LEN_SECS, MIN_EPOCH_LEN_SECS};
pub use clock::{Clock, SystemClock};
pub use error::{PaymentError, SponsorError};
pub use fee_caps::FeeCaps;
pub use financials::{OrgFinancials, SettlementSplit, PERIOD_LEN_SECS};
pub use hub::{ContinuationToken, HubConfig, SponsorshipHub};
pub use onboarding::{OnboardingConfig, OnboardingSubsidizer};
pub use pool::{GracePeriodConfig, MutualAidPool, PoolStatus, BPS_DENOMINATOR};
pub use registry::Organization;
pub use rules::{Rule, RuleTable};
pub use traits::{RelayerPayments, RoleDirectory};
pub use voucher::{voucher_digest, VoucherAuthority};
