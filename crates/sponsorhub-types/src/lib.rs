//! Shared types for the sponsorship hub.
//!
//! Strong-typed ids, the Gateway request envelope, call addressing, and
//! subject claims. The core crate consumes these; nothing here carries
//! behavior beyond construction, resolution, and display.

#![deny(unsafe_code)]

pub mod envelope;
pub mod ids;

pub use envelope::{
    CallEnvelope, CallRef, FeeBreakdown, Outcome, RequestEnvelope, SignedVoucher, SubjectClaim,
};
pub use ids::{AccountId, OrgId, RoleId, Selector, SubjectKey, TargetId};
