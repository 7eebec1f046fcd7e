use serde::{Deserialize, Serialize};

use crate::{error::PolicyError, role::Role};

/// Protected entity category.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Loans,
    Members,
    Staff,
    Reports,
    Logs,
}

impl Resource {
    pub const ALL: [Resource; 5] = [
        Resource::Loans,
        Resource::Members,
        Resource::Staff,
        Resource::Reports,
        Resource::Logs,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Loans => "loans",
            Resource::Members => "members",
            Resource::Staff => "staff",
            Resource::Reports => "reports",
            Resource::Logs => "logs",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == value)
    }
}

/// Operation category.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    Read,
    Update,
    Approve,
    Delete,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Create,
        Action::Read,
        Action::Update,
        Action::Approve,
        Action::Delete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Approve => "approve",
            Action::Delete => "delete",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == value)
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Evaluate the permission matrix for one (role, resource, action) triple.
///
/// The matrix is an explicit grant table per role. Every combination not
/// listed is denied; there is exactly one outcome per triple. Field
/// officers originate loans and member records in the field, branch
/// managers additionally amend and approve within their branch, area
/// managers supervise (read, amend, approve loans; read members and
/// reports) without originating records, and admin holds every grant
/// including staff and audit-log management.
pub fn has_permission(role: Role, resource: Resource, action: Action) -> bool {
    use Action::*;
    use Resource::*;
    match role {
        Role::Admin => true,
        Role::AreaManager => matches!(
            (resource, action),
            (Loans, Read)
                | (Loans, Update)
                | (Loans, Approve)
                | (Members, Read)
                | (Reports, Read)
        ),
        Role::BranchManager => matches!(
            (resource, action),
            (Loans, Create)
                | (Loans, Read)
                | (Loans, Update)
                | (Loans, Approve)
                | (Members, Create)
                | (Members, Read)
                | (Members, Update)
                | (Reports, Read)
        ),
        Role::FieldOfficer => matches!(
            (resource, action),
            (Loans, Create)
                | (Loans, Read)
                | (Members, Create)
                | (Members, Read)
                | (Members, Update)
        ),
    }
}

/// Matrix lookup for a possibly-unauthenticated subject. No role means no
/// permissions, for every resource and action.
pub fn subject_has_permission(role: Option<Role>, resource: Resource, action: Action) -> bool {
    role.is_some_and(|role| has_permission(role, resource, action))
}

/// Rejection-signal form for action handlers: `Ok(())` on allow, a
/// `PermissionDenied` carrying the refused pair on deny.
pub fn require_permission(role: Role, resource: Resource, action: Action) -> Result<(), PolicyError> {
    if has_permission(role, resource, action) {
        Ok(())
    } else {
        Err(PolicyError::PermissionDenied { resource, action })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_officers_originate_loans_but_never_touch_staff() {
        assert!(has_permission(Role::FieldOfficer, Resource::Loans, Action::Create));
        assert!(!has_permission(Role::FieldOfficer, Resource::Staff, Action::Delete));
    }

    #[test]
    fn staff_and_logs_are_admin_only() {
        for role in Role::ALL {
            for action in Action::ALL {
                let expected = role == Role::Admin;
                assert_eq!(has_permission(role, Resource::Staff, action), expected);
                assert_eq!(has_permission(role, Resource::Logs, action), expected);
            }
        }
    }

    #[test]
    fn admin_holds_every_grant() {
        for resource in Resource::ALL {
            for action in Action::ALL {
                assert!(has_permission(Role::Admin, resource, action));
            }
        }
    }

    #[test]
    fn approval_grant_requires_manager_rank() {
        assert!(!has_permission(Role::FieldOfficer, Resource::Loans, Action::Approve));
        assert!(has_permission(Role::BranchManager, Resource::Loans, Action::Approve));
        assert!(has_permission(Role::AreaManager, Resource::Loans, Action::Approve));
    }

    #[test]
    fn no_role_means_no_permissions() {
        for resource in Resource::ALL {
            for action in Action::ALL {
                assert!(!subject_has_permission(None, resource, action));
            }
        }
    }

    #[test]
    fn require_permission_reports_the_refused_pair() {
        let err = require_permission(Role::FieldOfficer, Resource::Staff, Action::Delete)
            .expect_err("field officers must not delete staff");
        assert_eq!(
            err,
            PolicyError::PermissionDenied {
                resource: Resource::Staff,
                action: Action::Delete,
            }
        );
        assert!(require_permission(Role::Admin, Resource::Staff, Action::Delete).is_ok());
    }

    #[test]
    fn evaluation_is_idempotent() {
        for role in Role::ALL {
            for resource in Resource::ALL {
                for action in Action::ALL {
                    let first = has_permission(role, resource, action);
                    let second = has_permission(role, resource, action);
                    assert_eq!(first, second);
                }
            }
        }
    }
}
