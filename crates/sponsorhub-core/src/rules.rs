use crate::error::SponsorError;
use serde::{Deserialize, Serialize};
use sponsorhub_types::{CallRef, Selector, TargetId};
use std::collections::HashMap;

/// Allow/deny entry for one (target, selector) pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub allowed: bool,
    /// Optional ceiling on the requested max cost for operations matching
    /// this rule.
    pub cost_hint: Option<u64>,
}

impl Rule {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            cost_hint: None,
        }
    }

    pub fn allow_with_hint(cost_hint: u64) -> Self {
        Self {
            allowed: true,
            cost_hint: Some(cost_hint),
        }
    }

    pub fn deny() -> Self {
        Self {
            allowed: false,
            cost_hint: None,
        }
    }
}

/// Per-org policy table keyed by (target, selector).
///
/// Lookup falls back from the exact selector to the target's wildcard
/// entry. No matching entry means denied; orgs opt targets in explicitly.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RuleTable {
    rules: HashMap<(TargetId, Selector), Rule>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, target: TargetId, selector: Selector, rule: Rule) {
        self.rules.insert((target, selector), rule);
    }

    pub fn set_batch(&mut self, entries: Vec<(TargetId, Selector, Rule)>) {
        for (target, selector, rule) in entries {
            self.set(target, selector, rule);
        }
    }

    pub fn clear(&mut self, target: &TargetId, selector: &Selector) {
        self.rules.remove(&(target.clone(), selector.clone()));
    }

    pub fn get(&self, target: &TargetId, selector: &Selector) -> Option<&Rule> {
        self.rules.get(&(target.clone(), selector.clone()))
    }

    fn lookup(&self, call: &CallRef) -> Option<&Rule> {
        self.get(&call.target, &call.selector)
            .or_else(|| self.get(&call.target, &Selector::wildcard()))
    }

    /// Check every resolved pair of the call envelope against the table.
    pub fn check(&self, calls: &[CallRef], max_cost: u64) -> Result<(), SponsorError> {
        for call in calls {
            let rule = self.lookup(call).ok_or_else(|| SponsorError::RuleDenied {
                target: call.target.clone(),
                selector: call.selector.clone(),
            })?;

            if !rule.allowed {
                return Err(SponsorError::RuleDenied {
                    target: call.target.clone(),
                    selector: call.selector.clone(),
                });
            }

            if let Some(hint) = rule.cost_hint {
                if max_cost > hint {
                    return Err(SponsorError::CostHintExceeded {
                        target: call.target.clone(),
                        selector: call.selector.clone(),
                        hint,
                        requested: max_cost,
                    });
                }
            }
        }
        Ok(())
    }
}
