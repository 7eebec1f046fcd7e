use crate::{error::PolicyError, role::Role};

/// Branch-manager approval ceiling in base currency units. The bound is
/// inclusive: a loan of exactly this amount is approvable at branch level.
pub const BRANCH_APPROVAL_CEILING: f64 = 50_000.0;

/// Per-role monetary ceiling for loan approval.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ApprovalCeiling {
    Unlimited,
    UpTo(f64),
    Denied,
}

pub fn approval_ceiling(role: Role) -> ApprovalCeiling {
    match role {
        Role::Admin | Role::AreaManager => ApprovalCeiling::Unlimited,
        Role::BranchManager => ApprovalCeiling::UpTo(BRANCH_APPROVAL_CEILING),
        Role::FieldOfficer => ApprovalCeiling::Denied,
    }
}

/// Decide whether `role` may approve a loan of `amount`.
///
/// The amount must be finite and non-negative; anything else is a caller
/// error and never coerced into a decision.
pub fn can_approve_loan(role: Role, amount: f64) -> Result<bool, PolicyError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(PolicyError::InvalidArgument(
            "loan amount must be finite and non-negative",
        ));
    }
    Ok(match approval_ceiling(role) {
        ApprovalCeiling::Unlimited => true,
        ApprovalCeiling::UpTo(ceiling) => amount <= ceiling,
        ApprovalCeiling::Denied => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ceiling_is_inclusive_at_the_boundary() {
        assert_eq!(can_approve_loan(Role::BranchManager, 50_000.0), Ok(true));
        assert_eq!(can_approve_loan(Role::BranchManager, 50_000.01), Ok(false));
        assert_eq!(can_approve_loan(Role::BranchManager, 49_999.99), Ok(true));
    }

    #[test]
    fn only_unlimited_roles_clear_the_boundary() {
        for role in Role::ALL {
            let above = can_approve_loan(role, 50_000.01).unwrap();
            let expected = matches!(role, Role::Admin | Role::AreaManager);
            assert_eq!(above, expected, "role {role}");
        }
    }

    #[test]
    fn field_officers_never_approve() {
        assert_eq!(can_approve_loan(Role::FieldOfficer, 0.0), Ok(false));
        assert_eq!(can_approve_loan(Role::FieldOfficer, 1.0), Ok(false));
    }

    #[test]
    fn unlimited_roles_approve_any_amount() {
        for role in [Role::Admin, Role::AreaManager] {
            assert_eq!(can_approve_loan(role, 0.0), Ok(true));
            assert_eq!(can_approve_loan(role, 10_000_000.0), Ok(true));
        }
    }

    #[test]
    fn malformed_amounts_are_rejected() {
        for role in Role::ALL {
            for amount in [-0.01, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
                assert!(matches!(
                    can_approve_loan(role, amount),
                    Err(PolicyError::InvalidArgument(_))
                ));
            }
        }
    }
}
