//! Authorization policy engine for the MFI suite.
//!
//! All policy decisions are pure functions over static configuration: a
//! role registry, an explicit permission matrix, a prefix-matched route
//! table, and the loan-approval ceiling rule. Nothing here performs IO,
//! retries, or logging; callers own recovery and rendering. Ambiguous
//! input always resolves to denial.

mod approval;
mod error;
mod permission;
mod role;
mod routes;

pub use approval::{ApprovalCeiling, BRANCH_APPROVAL_CEILING, approval_ceiling, can_approve_loan};
pub use error::PolicyError;
pub use permission::{Action, Resource, has_permission, require_permission, subject_has_permission};
pub use role::Role;
pub use routes::{PageDecision, RedirectPolicy, RouteRule, RouteTable, can_access_page};
