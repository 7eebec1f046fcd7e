//! Cross-table invariants: the route table, the permission matrix, and the
//! approval ceilings are defined independently but must agree with each
//! other for every role.

use platform_authz::{
    Action, ApprovalCeiling, Resource, Role, RouteTable, approval_ceiling, can_access_page,
    can_approve_loan, has_permission, subject_has_permission,
};

/// Resource displayed by each admin page subtree.
const PAGE_RESOURCES: [(&str, Resource); 4] = [
    ("/admin/staffs", Resource::Staff),
    ("/admin/logs", Resource::Logs),
    ("/admin/reports", Resource::Reports),
    ("/admin", Resource::Loans),
];

/// A role admitted to a page must hold the read grant for the resource the
/// page displays; otherwise the route table leaks data the matrix denies.
#[test]
fn route_table_never_outruns_the_matrix() {
    let table = RouteTable::default();
    for rule in table.rules() {
        let resource = PAGE_RESOURCES
            .iter()
            .find(|(prefix, _)| rule.prefix.starts_with(prefix))
            .map(|(_, resource)| *resource);
        let Some(resource) = resource else { continue };
        for role in rule.roles {
            assert!(
                has_permission(*role, resource, Action::Read),
                "{role} is admitted to {} but cannot read {resource}",
                rule.prefix,
            );
        }
    }
}

const SAMPLE_AMOUNTS: [f64; 6] = [0.0, 1.0, 49_999.99, 50_000.0, 50_000.01, 2_000_000.0];

fn dominates(a: Role, b: Role) -> bool {
    match (approval_ceiling(a), approval_ceiling(b)) {
        (ApprovalCeiling::Unlimited, _) => true,
        (_, ApprovalCeiling::Denied) => true,
        (ApprovalCeiling::UpTo(a), ApprovalCeiling::UpTo(b)) => a >= b,
        (ApprovalCeiling::Denied, _) | (ApprovalCeiling::UpTo(_), ApprovalCeiling::Unlimited) => {
            false
        }
    }
}

/// If A's ceiling dominates B's, every amount B may approve, A may too.
#[test]
fn approval_is_monotone_in_the_ceiling() {
    for a in Role::ALL {
        for b in Role::ALL {
            if !dominates(a, b) {
                continue;
            }
            for amount in SAMPLE_AMOUNTS {
                let b_approves = can_approve_loan(b, amount).unwrap();
                let a_approves = can_approve_loan(a, amount).unwrap();
                assert!(
                    !b_approves || a_approves,
                    "{b} approves {amount} but {a} does not",
                );
            }
        }
    }
}

#[test]
fn area_managers_approve_everything_branch_managers_can() {
    for amount in SAMPLE_AMOUNTS {
        if can_approve_loan(Role::BranchManager, amount).unwrap() {
            assert!(can_approve_loan(Role::AreaManager, amount).unwrap());
        }
    }
}

/// The matrix is total: every triple evaluates, no triple panics, and an
/// absent subject holds nothing anywhere.
#[test]
fn default_deny_is_total_over_the_key_space() {
    for resource in Resource::ALL {
        for action in Action::ALL {
            assert!(!subject_has_permission(None, resource, action));
            for role in Role::ALL {
                // Pure-function property: re-evaluation never flips.
                let first = has_permission(role, resource, action);
                assert_eq!(first, has_permission(role, resource, action));
            }
        }
    }
}

/// Approval capability in the matrix and the monetary rule must agree on
/// who can approve at all.
#[test]
fn approval_grant_and_ceiling_agree() {
    for role in Role::ALL {
        let has_grant = has_permission(role, Resource::Loans, Action::Approve);
        let ceiling_allows = !matches!(approval_ceiling(role), ApprovalCeiling::Denied);
        assert_eq!(has_grant, ceiling_allows, "role {role}");
    }
}

#[test]
fn unauthenticated_sessions_only_reach_public_pages() {
    assert_eq!(can_access_page(None, "/login"), Ok(true));
    assert_eq!(can_access_page(None, "/admin/dashboard"), Ok(false));
    // Repeated evaluation is stable.
    assert_eq!(can_access_page(None, "/admin/dashboard"), Ok(false));
}
