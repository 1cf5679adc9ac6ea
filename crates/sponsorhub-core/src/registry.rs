use serde::{Deserialize, Serialize};
use sponsorhub_types::RoleId;

/// Registered tenant record.
///
/// Created once, never deleted; lifecycle is pause and aid-ban only. Role
/// membership itself lives in the external directory — the record stores
/// which role ids gate which operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub admin_role: RoleId,
    pub operator_role: Option<RoleId>,
    pub voucher_role: Option<RoleId>,
    pub paused: bool,
    pub registered_at: u64,
    pub banned_from_aid: bool,
}

impl Organization {
    pub fn new(admin_role: RoleId, operator_role: Option<RoleId>, registered_at: u64) -> Self {
        Self {
            admin_role,
            operator_role,
            voucher_role: None,
            paused: false,
            registered_at,
            banned_from_aid: false,
        }
    }

    /// Whether the org is still inside its initial grace window.
    pub fn in_grace(&self, now: u64, grace_secs: u64) -> bool {
        now < self.registered_at + grace_secs
    }
}
