use thiserror::Error;

use crate::permission::{Action, Resource};

/// Outcome taxonomy for policy evaluation.
///
/// `PermissionDenied` is an expected outcome and only surfaces through the
/// `require_*` helpers; the boolean forms report denial as a plain value.
/// `InvalidArgument` marks caller errors that must never be silently
/// coerced into a decision.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("action {action} denied for resource {resource}")]
    PermissionDenied { resource: Resource, action: Action },
}
