use crate::error::SponsorError;
use serde::{Deserialize, Serialize};
use sponsorhub_types::FeeBreakdown;

/// Per-org ceilings over the declared price/resource parameters.
///
/// An org with no caps configured is unrestricted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeCaps {
    pub max_unit_cost: u64,
    pub max_priority_cost: u64,
    pub max_exec_cost: u64,
    pub max_verify_cost: u64,
    pub max_pre_cost: u64,
}

impl FeeCaps {
    pub fn check(&self, fees: &FeeBreakdown) -> Result<(), SponsorError> {
        let checks: [(&'static str, u64, u64); 5] = [
            ("unit", fees.unit_cost, self.max_unit_cost),
            ("priority", fees.priority_cost, self.max_priority_cost),
            ("exec", fees.exec_cost, self.max_exec_cost),
            ("verify", fees.verify_cost, self.max_verify_cost),
            ("pre", fees.pre_cost, self.max_pre_cost),
        ];

        for (component, requested, cap) in checks {
            if requested > cap {
                return Err(SponsorError::FeeCapExceeded {
                    component,
                    cap,
                    requested,
                });
            }
        }
        Ok(())
    }
}
