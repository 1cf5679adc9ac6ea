use crate::budget::{Budget, BudgetBook};
use crate::clock::Clock;
use crate::error::SponsorError;
use crate::fee_caps::FeeCaps;
use crate::financials::{OrgFinancials, SettlementSplit};
use crate::onboarding::{OnboardingConfig, OnboardingSubsidizer};
use crate::pool::{GracePeriodConfig, MutualAidPool, PoolStatus};
use crate::registry::Organization;
use crate::rules::{Rule, RuleTable};
use crate::traits::{RelayerPayments, RoleDirectory};
use crate::voucher::VoucherAuthority;
use crate::bounty::BountyPolicy;
use serde::{Deserialize, Serialize};
use sponsorhub_types::{
    AccountId, Outcome, OrgId, RequestEnvelope, RoleId, Selector, SubjectClaim, SubjectKey,
    TargetId,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, info, warn};

/// Hub construction parameters.
#[derive(Clone, Debug)]
pub struct HubConfig {
    /// The only caller allowed into `validate`/`settle`.
    pub gateway: AccountId,
    /// Holder of the global setters.
    pub global_admin: AccountId,
    /// Bound into voucher digests so credentials cannot cross networks.
    pub network_id: String,
    pub pool_fee_basis_points: u16,
    pub grace: GracePeriodConfig,
    pub onboarding: OnboardingConfig,
}

/// Opaque continuation between `validate` and its paired `settle`.
///
/// Carries exactly what settlement needs to re-derive its state: the org
/// (or the onboarding sentinel `None`), subject key, epoch anchor,
/// correlation id, and relayer identity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContinuationToken {
    org: Option<OrgId>,
    subject: Option<SubjectKey>,
    epoch_anchor: Option<u64>,
    correlation_id: String,
    relayer: AccountId,
    max_cost: u64,
    bounty_tag: bool,
}

impl ContinuationToken {
    pub fn org(&self) -> Option<OrgId> {
        self.org
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }
}

/// Everything mutable belonging to one org, guarded by one lock so paired
/// admission checks cannot interleave per tenant. One table per component;
/// new families extend the cell without touching existing layout.
struct OrgState {
    record: Organization,
    financials: OrgFinancials,
    rules: RuleTable,
    fee_caps: Option<FeeCaps>,
    budgets: BudgetBook,
    vouchers: VoucherAuthority,
    bounty: BountyPolicy,
}

impl OrgState {
    fn new(record: Organization, now: u64) -> Self {
        Self {
            record,
            financials: OrgFinancials::new(now),
            rules: RuleTable::new(),
            fee_caps: None,
            budgets: BudgetBook::new(),
            vouchers: VoucherAuthority::new(),
            bounty: BountyPolicy::default(),
        }
    }
}

/// Singleton state shared across orgs. Always locked after an org cell,
/// never before.
struct SharedState {
    pool: MutualAidPool,
    grace: GracePeriodConfig,
    onboarding: OnboardingSubsidizer,
    /// The hub's own float funding bounty tips; never org or pool money.
    bounty_float: u64,
}

/// The sponsorship and metering hub.
///
/// Implements the two-phase admission protocol: `validate` runs the full
/// precondition pipeline with zero mutation on failure and emits a
/// continuation token; `settle` re-derives state from the token and
/// commits budget usage, the financial split, the pool fee, and the
/// best-effort relayer bounty as one unit.
pub struct SponsorshipHub {
    gateway: AccountId,
    global_admin: AccountId,
    network_id: String,
    clock: Arc<dyn Clock>,
    roles: Arc<dyn RoleDirectory>,
    payments: Arc<dyn RelayerPayments>,
    orgs: RwLock<HashMap<OrgId, Arc<Mutex<OrgState>>>>,
    shared: Mutex<SharedState>,
}

impl SponsorshipHub {
    pub fn new(
        config: HubConfig,
        clock: Arc<dyn Clock>,
        roles: Arc<dyn RoleDirectory>,
        payments: Arc<dyn RelayerPayments>,
    ) -> Self {
        Self {
            gateway: config.gateway,
            global_admin: config.global_admin,
            network_id: config.network_id,
            clock,
            roles,
            payments,
            orgs: RwLock::new(HashMap::new()),
            shared: Mutex::new(SharedState {
                pool: MutualAidPool::new(config.pool_fee_basis_points),
                grace: config.grace,
                onboarding: OnboardingSubsidizer::new(config.onboarding),
                bounty_float: 0,
            }),
        }
    }

    // ---- registration and funding -------------------------------------

    pub fn register_org(
        &self,
        org: OrgId,
        admin_role: RoleId,
        operator_role: Option<RoleId>,
    ) -> Result<(), SponsorError> {
        self.insert_org(org, Organization::new(admin_role, operator_role, self.now()))
    }

    pub fn register_org_with_voucher(
        &self,
        org: OrgId,
        admin_role: RoleId,
        operator_role: Option<RoleId>,
        voucher_role: RoleId,
    ) -> Result<(), SponsorError> {
        let mut record = Organization::new(admin_role, operator_role, self.now());
        record.voucher_role = Some(voucher_role);
        self.insert_org(org, record)
    }

    fn insert_org(&self, org: OrgId, record: Organization) -> Result<(), SponsorError> {
        let now = self.now();
        let mut orgs = self.orgs.write().expect("org map lock poisoned");
        if orgs.contains_key(&org) {
            return Err(SponsorError::DuplicateOrg(org));
        }
        orgs.insert(org, Arc::new(Mutex::new(OrgState::new(record, now))));
        info!(%org, "organization registered");
        Ok(())
    }

    /// Permissionless deposit into an org's own reserve.
    pub fn deposit_for_org(&self, org: OrgId, amount: u64) -> Result<(), SponsorError> {
        let now = self.now();
        let cell = self.org_cell(org)?;
        let mut state = cell.lock().expect("org state lock poisoned");
        let mut shared = self.shared.lock().expect("shared state lock poisoned");

        let newly_funded = state
            .financials
            .deposit(amount, shared.grace.min_deposit, now);
        if newly_funded {
            shared.pool.funded_orgs += 1;
        }
        debug!(%org, amount, newly_funded, "deposit recorded");
        Ok(())
    }

    /// Permissionless donation straight into the mutual-aid pool.
    pub fn donate_to_pool(&self, amount: u64) {
        let mut shared = self.shared.lock().expect("shared state lock poisoned");
        shared.pool.donate(amount);
    }

    /// Top up the hub's own bounty float.
    pub fn fund_bounty_float(&self, amount: u64) {
        let mut shared = self.shared.lock().expect("shared state lock poisoned");
        shared.bounty_float += amount;
    }

    // ---- two-phase protocol -------------------------------------------

    /// Phase one: full admission pipeline. Any failure aborts before
    /// execution with no state mutation; success emits the continuation
    /// token the Gateway must settle exactly once.
    pub fn validate(
        &self,
        caller: &AccountId,
        request: &RequestEnvelope,
    ) -> Result<ContinuationToken, SponsorError> {
        self.require_gateway(caller)?;
        let now = self.now();

        if matches!(request.subject, SubjectClaim::Onboarding) {
            return self.validate_onboarding(request, now);
        }

        let org = request
            .org
            .ok_or_else(|| SponsorError::MalformedRequest("org-scoped subject without org".into()))?;
        let cell = self.org_cell(org)?;
        let mut state = cell.lock().expect("org state lock poisoned");

        if state.record.paused {
            return Err(SponsorError::OrgPaused(org));
        }

        // Subject eligibility. Voucher consumption is deferred to the end
        // of the pipeline so a later rejection never burns the credential.
        let mut consume_voucher = None;
        let subject_key = match &request.subject {
            SubjectClaim::SelfAccount { account } => {
                if *account != request.sender {
                    return Err(SponsorError::SubjectMismatch {
                        sender: request.sender.clone(),
                    });
                }
                SubjectKey::Account(account.clone())
            }
            SubjectClaim::RoleMember { account, role } => {
                if *account != request.sender {
                    return Err(SponsorError::SubjectMismatch {
                        sender: request.sender.clone(),
                    });
                }
                if !self.roles.holds_role(account, role) {
                    return Err(SponsorError::RoleCheckFailed {
                        account: account.clone(),
                        role: *role,
                    });
                }
                SubjectKey::Role(*role)
            }
            SubjectClaim::Vouched {
                beneficiary,
                voucher,
            } => {
                if *beneficiary != request.sender {
                    return Err(SponsorError::SubjectMismatch {
                        sender: request.sender.clone(),
                    });
                }
                state.vouchers.verify(
                    org,
                    state.record.voucher_role,
                    beneficiary,
                    voucher,
                    self.roles.as_ref(),
                    &self.network_id,
                    now,
                )?;
                consume_voucher = Some(beneficiary.clone());
                SubjectKey::VoucherClass
            }
            SubjectClaim::Onboarding => unreachable!("handled above"),
        };

        let calls = request.call.resolve();
        if calls.is_empty() {
            return Err(SponsorError::MalformedRequest("empty batch call".into()));
        }
        state.rules.check(&calls, request.max_cost)?;

        if let Some(caps) = &state.fee_caps {
            caps.check(&request.fees)?;
        }

        let epoch_anchor = state
            .budgets
            .check_and_anchor(&subject_key, request.max_cost, now)?;

        {
            let shared = self.shared.lock().expect("shared state lock poisoned");
            state.financials.roll_period(now);
            let in_grace = state.record.in_grace(now, shared.grace.grace_secs());
            funding_capacity_check(
                org,
                &state.record,
                &state.financials,
                in_grace,
                &shared.grace,
                shared.pool.balance,
                request.max_cost,
            )?;
        }

        if let Some(beneficiary) = consume_voucher {
            state.vouchers.consume(beneficiary);
        }

        info!(
            %org,
            subject = %subject_key,
            correlation_id = %request.correlation_id,
            max_cost = request.max_cost,
            "request admitted"
        );

        Ok(ContinuationToken {
            org: Some(org),
            subject: Some(subject_key),
            epoch_anchor,
            correlation_id: request.correlation_id.clone(),
            relayer: request.relayer.clone(),
            max_cost: request.max_cost,
            bounty_tag: request.bounty_tag,
        })
    }

    fn validate_onboarding(
        &self,
        request: &RequestEnvelope,
        now: u64,
    ) -> Result<ContinuationToken, SponsorError> {
        let shared = self.shared.lock().expect("shared state lock poisoned");
        shared
            .onboarding
            .admit(now, request.max_cost, shared.pool.balance)?;

        info!(
            correlation_id = %request.correlation_id,
            max_cost = request.max_cost,
            "onboarding request admitted"
        );

        Ok(ContinuationToken {
            org: None,
            subject: None,
            epoch_anchor: None,
            correlation_id: request.correlation_id.clone(),
            relayer: request.relayer.clone(),
            max_cost: request.max_cost,
            bounty_tag: request.bounty_tag,
        })
    }

    /// Phase two: settle the actual cost reported by the Gateway.
    ///
    /// The settlement commits as one unit. A funding shortfall aborts the
    /// whole call with nothing recorded; only the bounty tip afterwards is
    /// best-effort.
    pub fn settle(
        &self,
        caller: &AccountId,
        token: &ContinuationToken,
        actual_cost: u64,
        outcome: Outcome,
    ) -> Result<(), SponsorError> {
        self.require_gateway(caller)?;
        let now = self.now();

        let Some(org) = token.org else {
            return self.settle_onboarding(token, actual_cost, now);
        };

        let cell = self.org_cell(org)?;
        let mut state = cell.lock().expect("org state lock poisoned");
        let mut shared = self.shared.lock().expect("shared state lock poisoned");

        state.financials.roll_period(now);
        let in_grace = state.record.in_grace(now, shared.grace.grace_secs());

        // Plan the entire financial movement before committing anything,
        // so a shortfall leaves budgets and ledgers untouched.
        let split = if in_grace {
            // Grace settlement is pure pool money, so a ban landing after
            // validation still blocks it here.
            if state.record.banned_from_aid {
                return Err(SponsorError::BannedFromAid(org));
            }
            if shared.pool.balance < actual_cost {
                return Err(SponsorError::SettlementShortfall {
                    org,
                    uncovered: actual_cost - shared.pool.balance,
                });
            }
            SettlementSplit {
                from_deposits: 0,
                from_pool: actual_cost,
            }
        } else {
            // A banned org plans against an empty pool: the whole cost has
            // to come out of deposit headroom or the settlement aborts.
            let pool_budget = if state.record.banned_from_aid {
                0
            } else {
                shared.pool.balance
            };
            state
                .financials
                .plan_split(org, actual_cost, shared.grace.min_deposit, pool_budget)?
        };

        if let (Some(subject), Some(anchor)) = (&token.subject, token.epoch_anchor) {
            state.budgets.apply_usage(subject, anchor, actual_cost, now);
        }
        state.financials.apply_split(split);
        // Planned against the live balance under the same locks, so the
        // draw cannot underflow.
        shared.pool.balance -= split.from_pool;
        let fee = shared.pool.collect_fee(actual_cost);

        info!(
            %org,
            correlation_id = %token.correlation_id,
            actual_cost,
            from_deposits = split.from_deposits,
            from_pool = split.from_pool,
            fee,
            in_grace,
            "settlement committed"
        );

        if outcome == Outcome::Success && token.bounty_tag {
            self.disburse_bounty(&mut state, &mut shared, token, actual_cost);
        }
        Ok(())
    }

    fn settle_onboarding(
        &self,
        token: &ContinuationToken,
        actual_cost: u64,
        now: u64,
    ) -> Result<(), SponsorError> {
        let mut shared = self.shared.lock().expect("shared state lock poisoned");
        shared.pool.draw(actual_cost)?;
        shared.onboarding.record_creation(now);

        info!(
            correlation_id = %token.correlation_id,
            actual_cost,
            "onboarding settlement committed"
        );
        Ok(())
    }

    fn disburse_bounty(
        &self,
        state: &mut OrgState,
        shared: &mut SharedState,
        token: &ContinuationToken,
        actual_cost: u64,
    ) {
        let tip = state.bounty.tip_for(actual_cost, shared.bounty_float);
        if tip == 0 {
            return;
        }
        match self.payments.pay(&token.relayer, tip) {
            Ok(()) => {
                shared.bounty_float -= tip;
                state.bounty.total_paid += tip;
                debug!(relayer = %token.relayer, tip, "bounty paid");
            }
            Err(err) => {
                warn!(
                    relayer = %token.relayer,
                    tip,
                    error = %err,
                    "bounty payment failed; settlement unaffected"
                );
            }
        }
    }

    // ---- org-scoped setters (admin or operator) -----------------------

    pub fn set_rule(
        &self,
        caller: &AccountId,
        org: OrgId,
        target: TargetId,
        selector: Selector,
        rule: Rule,
    ) -> Result<(), SponsorError> {
        self.with_operator(caller, org, |state| {
            state.rules.set(target, selector, rule);
            Ok(())
        })
    }

    pub fn set_rules_batch(
        &self,
        caller: &AccountId,
        org: OrgId,
        entries: Vec<(TargetId, Selector, Rule)>,
    ) -> Result<(), SponsorError> {
        self.with_operator(caller, org, |state| {
            state.rules.set_batch(entries);
            Ok(())
        })
    }

    pub fn clear_rule(
        &self,
        caller: &AccountId,
        org: OrgId,
        target: &TargetId,
        selector: &Selector,
    ) -> Result<(), SponsorError> {
        self.with_operator(caller, org, |state| {
            state.rules.clear(target, selector);
            Ok(())
        })
    }

    pub fn set_budget(
        &self,
        caller: &AccountId,
        org: OrgId,
        subject: SubjectKey,
        cap_per_epoch: u64,
        epoch_len: u64,
    ) -> Result<(), SponsorError> {
        let now = self.now();
        self.with_operator(caller, org, |state| {
            state.budgets.configure(subject, cap_per_epoch, epoch_len, now)
        })
    }

    pub fn set_epoch_start(
        &self,
        caller: &AccountId,
        org: OrgId,
        subject: &SubjectKey,
        epoch_start: u64,
    ) -> Result<(), SponsorError> {
        self.with_operator(caller, org, |state| {
            state.budgets.set_epoch_start(subject, epoch_start)
        })
    }

    pub fn set_fee_caps(
        &self,
        caller: &AccountId,
        org: OrgId,
        caps: FeeCaps,
    ) -> Result<(), SponsorError> {
        self.with_operator(caller, org, |state| {
            state.fee_caps = Some(caps);
            Ok(())
        })
    }

    pub fn set_bounty(
        &self,
        caller: &AccountId,
        org: OrgId,
        enabled: bool,
        max_absolute: u64,
        pct_cap_basis_points: u16,
    ) -> Result<(), SponsorError> {
        self.with_operator(caller, org, |state| {
            state
                .bounty
                .configure(enabled, max_absolute, pct_cap_basis_points)
        })
    }

    // ---- org-scoped setters (admin only) ------------------------------

    pub fn set_pause(
        &self,
        caller: &AccountId,
        org: OrgId,
        paused: bool,
    ) -> Result<(), SponsorError> {
        self.with_admin(caller, org, |state| {
            state.record.paused = paused;
            Ok(())
        })
    }

    pub fn set_operator_role(
        &self,
        caller: &AccountId,
        org: OrgId,
        operator_role: Option<RoleId>,
    ) -> Result<(), SponsorError> {
        self.with_admin(caller, org, |state| {
            state.record.operator_role = operator_role;
            Ok(())
        })
    }

    pub fn set_voucher_role(
        &self,
        caller: &AccountId,
        org: OrgId,
        voucher_role: Option<RoleId>,
    ) -> Result<(), SponsorError> {
        self.with_admin(caller, org, |state| {
            state.record.voucher_role = voucher_role;
            Ok(())
        })
    }

    // ---- global-admin setters -----------------------------------------

    pub fn set_grace_period_config(
        &self,
        caller: &AccountId,
        config: GracePeriodConfig,
    ) -> Result<(), SponsorError> {
        self.require_global_admin(caller)?;
        let mut shared = self.shared.lock().expect("shared state lock poisoned");
        shared.grace = config;
        Ok(())
    }

    pub fn set_ban_from_aid(
        &self,
        caller: &AccountId,
        org: OrgId,
        banned: bool,
    ) -> Result<(), SponsorError> {
        self.require_global_admin(caller)?;
        let cell = self.org_cell(org)?;
        let mut state = cell.lock().expect("org state lock poisoned");
        state.record.banned_from_aid = banned;
        info!(%org, banned, "aid ban updated");
        Ok(())
    }

    pub fn set_pool_fee_bps(
        &self,
        caller: &AccountId,
        fee_basis_points: u16,
    ) -> Result<(), SponsorError> {
        self.require_global_admin(caller)?;
        let mut shared = self.shared.lock().expect("shared state lock poisoned");
        shared.pool.set_fee_basis_points(fee_basis_points)
    }

    pub fn set_onboarding_config(
        &self,
        caller: &AccountId,
        config: OnboardingConfig,
    ) -> Result<(), SponsorError> {
        self.require_global_admin(caller)?;
        let mut shared = self.shared.lock().expect("shared state lock poisoned");
        shared.onboarding.set_config(config);
        Ok(())
    }

    // ---- read accessors -----------------------------------------------

    pub fn organization(&self, org: OrgId) -> Result<Organization, SponsorError> {
        self.read_org(org, |state| state.record)
    }

    pub fn financials(&self, org: OrgId) -> Result<OrgFinancials, SponsorError> {
        self.read_org(org, |state| state.financials)
    }

    pub fn budget(&self, org: OrgId, subject: &SubjectKey) -> Result<Option<Budget>, SponsorError> {
        self.read_org(org, |state| state.budgets.get(subject).copied())
    }

    pub fn rule(
        &self,
        org: OrgId,
        target: &TargetId,
        selector: &Selector,
    ) -> Result<Option<Rule>, SponsorError> {
        self.read_org(org, |state| state.rules.get(target, selector).copied())
    }

    pub fn fee_caps(&self, org: OrgId) -> Result<Option<FeeCaps>, SponsorError> {
        self.read_org(org, |state| state.fee_caps)
    }

    pub fn bounty_policy(&self, org: OrgId) -> Result<BountyPolicy, SponsorError> {
        self.read_org(org, |state| state.bounty)
    }

    pub fn voucher_consumed(
        &self,
        org: OrgId,
        beneficiary: &AccountId,
    ) -> Result<bool, SponsorError> {
        self.read_org(org, |state| state.vouchers.is_consumed(beneficiary))
    }

    pub fn pool_status(&self) -> PoolStatus {
        self.shared
            .lock()
            .expect("shared state lock poisoned")
            .pool
            .status()
    }

    pub fn grace_config(&self) -> GracePeriodConfig {
        self.shared.lock().expect("shared state lock poisoned").grace
    }

    pub fn onboarding_config(&self) -> OnboardingConfig {
        self.shared
            .lock()
            .expect("shared state lock poisoned")
            .onboarding
            .config()
    }

    pub fn onboarding_created_today(&self) -> u32 {
        let now = self.now();
        self.shared
            .lock()
            .expect("shared state lock poisoned")
            .onboarding
            .created_today(now)
    }

    pub fn bounty_float(&self) -> u64 {
        self.shared
            .lock()
            .expect("shared state lock poisoned")
            .bounty_float
    }

    // ---- internals ----------------------------------------------------

    fn now(&self) -> u64 {
        self.clock.now_unix()
    }

    fn org_cell(&self, org: OrgId) -> Result<Arc<Mutex<OrgState>>, SponsorError> {
        self.orgs
            .read()
            .expect("org map lock poisoned")
            .get(&org)
            .cloned()
            .ok_or(SponsorError::UnknownOrg(org))
    }

    fn require_gateway(&self, caller: &AccountId) -> Result<(), SponsorError> {
        if *caller != self.gateway {
            return Err(SponsorError::NotGateway(caller.clone()));
        }
        Ok(())
    }

    fn require_global_admin(&self, caller: &AccountId) -> Result<(), SponsorError> {
        if *caller != self.global_admin {
            return Err(SponsorError::NotGlobalAdmin(caller.clone()));
        }
        Ok(())
    }

    fn read_org<T>(
        &self,
        org: OrgId,
        f: impl FnOnce(&OrgState) -> T,
    ) -> Result<T, SponsorError> {
        let cell = self.org_cell(org)?;
        let state = cell.lock().expect("org state lock poisoned");
        Ok(f(&state))
    }

    fn with_admin<T>(
        &self,
        caller: &AccountId,
        org: OrgId,
        f: impl FnOnce(&mut OrgState) -> Result<T, SponsorError>,
    ) -> Result<T, SponsorError> {
        let cell = self.org_cell(org)?;
        let mut state = cell.lock().expect("org state lock poisoned");
        if !self.roles.holds_role(caller, &state.record.admin_role) {
            return Err(SponsorError::RoleCheckFailed {
                account: caller.clone(),
                role: state.record.admin_role,
            });
        }
        f(&mut state)
    }

    fn with_operator<T>(
        &self,
        caller: &AccountId,
        org: OrgId,
        f: impl FnOnce(&mut OrgState) -> Result<T, SponsorError>,
    ) -> Result<T, SponsorError> {
        let cell = self.org_cell(org)?;
        let mut state = cell.lock().expect("org state lock poisoned");
        let record = state.record;
        let authorized = self.roles.holds_role(caller, &record.admin_role)
            || record
                .operator_role
                .map(|role| self.roles.holds_role(caller, &role))
                .unwrap_or(false);
        if !authorized {
            return Err(SponsorError::RoleCheckFailed {
                account: caller.clone(),
                role: record.admin_role,
            });
        }
        f(&mut state)
    }
}

/// Validate-phase funding plausibility.
///
/// In grace the whole requested cost is pool money governed by the flat
/// per-period cap. Post-grace the org self-funds up to its available
/// balance; only the remainder needs mutual aid, bounded by the remaining
/// allowance and the live pool balance.
fn funding_capacity_check(
    org: OrgId,
    record: &Organization,
    financials: &OrgFinancials,
    in_grace: bool,
    grace: &GracePeriodConfig,
    pool_balance: u64,
    requested: u64,
) -> Result<(), SponsorError> {
    if in_grace {
        if record.banned_from_aid {
            return Err(SponsorError::BannedFromAid(org));
        }
        let used = financials.aid_used_this_period;
        if used + requested > grace.max_spend_during_grace {
            return Err(SponsorError::GraceSpendExceeded {
                org,
                cap: grace.max_spend_during_grace,
                used,
                requested,
            });
        }
        if pool_balance < requested {
            return Err(SponsorError::PoolInsufficient {
                balance: pool_balance,
                requested,
            });
        }
        return Ok(());
    }

    let available = financials.available();
    if requested <= available {
        return Ok(());
    }
    if record.banned_from_aid {
        return Err(SponsorError::BannedFromAid(org));
    }
    let aid_cap = financials
        .remaining_allowance(grace.min_deposit)
        .min(pool_balance);
    let needed = requested - available;
    if needed > aid_cap {
        return Err(SponsorError::InsufficientFunds {
            org,
            requested,
            capacity: available + aid_cap,
        });
    }
    Ok(())
}
