use serde::{Deserialize, Serialize};

/// Tenant identifier, assigned once at registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrgId(pub u64);

/// Externally verified account identity (the Gateway resolves these).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(pub String);

/// Role class resolved through the external role-membership directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoleId(pub u64);

/// Callable target (contract / service) addressed by an operation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(pub String);

/// Operation selector within a target. The wildcard selector matches any
/// operation on the target and backs the coarse top-level addressing mode.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Selector(pub String);

impl Selector {
    pub const WILDCARD: &'static str = "*";

    pub fn wildcard() -> Self {
        Self(Self::WILDCARD.to_string())
    }

    pub fn is_wildcard(&self) -> bool {
        self.0 == Self::WILDCARD
    }
}

/// The unit being rate-limited within an org: a concrete account, every
/// holder of a role, or the voucher-sponsored newcomer class as a whole.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKey {
    Account(AccountId),
    Role(RoleId),
    VoucherClass,
}

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TargetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl Selector {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for OrgId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "org:{}", self.0)
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "acct:{}", self.0)
    }
}

impl std::fmt::Display for RoleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "role:{}", self.0)
    }
}

impl std::fmt::Display for TargetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "target:{}", self.0)
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sel:{}", self.0)
    }
}

impl std::fmt::Display for SubjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Account(account) => write!(f, "subject:{}", account),
            Self::Role(role) => write!(f, "subject:{}", role),
            Self::VoucherClass => write!(f, "subject:voucher-class"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_key_serialization_round_trips() {
        let key = SubjectKey::Role(RoleId(7));
        let json = serde_json::to_string(&key).unwrap();
        let restored: SubjectKey = serde_json::from_str(&json).unwrap();
        assert_eq!(key, restored);
    }

    #[test]
    fn wildcard_selector_detected() {
        assert!(Selector::wildcard().is_wildcard());
        assert!(!Selector::new("transfer").is_wildcard());
    }

    #[test]
    fn display_formats() {
        assert_eq!(OrgId(3).to_string(), "org:3");
        assert_eq!(AccountId::new("alice").to_string(), "acct:alice");
        assert_eq!(
            SubjectKey::VoucherClass.to_string(),
            "subject:voucher-class"
        );
    }
}
