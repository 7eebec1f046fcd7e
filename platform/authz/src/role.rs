use serde::{Deserialize, Serialize};

/// Staff role, fixed at the session store and never mutated here.
///
/// The registry is closed: unrecognized role strings are absorbed at the
/// parse boundary (`from_str` returns `None`) and every caller treats a
/// missing role as unauthenticated.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    FieldOfficer,
    BranchManager,
    AreaManager,
    Admin,
}

impl Role {
    /// Every role, in ascending rank order.
    pub const ALL: [Role; 4] = [
        Role::FieldOfficer,
        Role::BranchManager,
        Role::AreaManager,
        Role::Admin,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::FieldOfficer => "field_officer",
            Role::BranchManager => "branch_manager",
            Role::AreaManager => "area_manager",
            Role::Admin => "admin",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "field_officer" => Some(Role::FieldOfficer),
            "branch_manager" => Some(Role::BranchManager),
            "area_manager" => Some(Role::AreaManager),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    /// Coarse seniority, for ordering and display only. Permissions come
    /// from the explicit matrix, never from rank.
    pub fn rank(self) -> u8 {
        match self {
            Role::FieldOfficer => 1,
            Role::BranchManager => 2,
            Role::AreaManager => 3,
            Role::Admin => 4,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
