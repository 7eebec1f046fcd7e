use once_cell::sync::Lazy;

use crate::{error::PolicyError, role::Role};

/// One route rule: a path prefix and the roles allowed under it.
#[derive(Clone, Debug)]
pub struct RouteRule {
    pub prefix: &'static str,
    pub roles: &'static [Role],
}

const STAFF_ROLES: &[Role] = &[
    Role::FieldOfficer,
    Role::BranchManager,
    Role::AreaManager,
    Role::Admin,
];
const REPORT_ROLES: &[Role] = &[Role::BranchManager, Role::AreaManager, Role::Admin];
const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// Prefix-matched page-access table.
///
/// Rules are kept sorted by descending prefix length so the most specific
/// rule wins (`/admin/staffs` before the `/admin` catch-all). A pathname
/// that matches no rule is denied when it falls under a protected
/// namespace and public otherwise.
#[derive(Clone, Debug)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
    protected: Vec<&'static str>,
}

static DEFAULT_TABLE: Lazy<RouteTable> = Lazy::new(|| {
    RouteTable::new(
        vec![
            RouteRule { prefix: "/admin/staffs", roles: ADMIN_ONLY },
            RouteRule { prefix: "/admin/logs", roles: ADMIN_ONLY },
            RouteRule { prefix: "/admin/settings", roles: ADMIN_ONLY },
            RouteRule { prefix: "/admin/reports", roles: REPORT_ROLES },
            RouteRule { prefix: "/admin", roles: STAFF_ROLES },
        ],
        vec!["/admin"],
    )
});

impl Default for RouteTable {
    fn default() -> Self {
        DEFAULT_TABLE.clone()
    }
}

impl RouteTable {
    pub fn new(mut rules: Vec<RouteRule>, protected: Vec<&'static str>) -> Self {
        rules.sort_by_key(|rule| std::cmp::Reverse(rule.prefix.len()));
        Self { rules, protected }
    }

    /// Longest-prefix resolution of a pathname for an optional role.
    ///
    /// An empty pathname or one without a leading slash is a caller error,
    /// not a denial.
    pub fn can_access(&self, role: Option<Role>, pathname: &str) -> Result<bool, PolicyError> {
        validate_pathname(pathname)?;
        match self.rules.iter().find(|rule| pathname.starts_with(rule.prefix)) {
            Some(rule) => Ok(role.is_some_and(|role| rule.roles.contains(&role))),
            None => Ok(!self.is_protected(pathname)),
        }
    }

    /// Guard outcome for page loads, with the configured redirect targets.
    pub fn decide(
        &self,
        role: Option<Role>,
        pathname: &str,
        redirects: &RedirectPolicy,
    ) -> Result<PageDecision, PolicyError> {
        if self.can_access(role, pathname)? {
            return Ok(PageDecision::Allow);
        }
        Ok(match role {
            None => PageDecision::RedirectToLogin {
                login_path: redirects.login_path.clone(),
                next: pathname.to_string(),
            },
            Some(_) => PageDecision::RedirectToLanding {
                landing_path: redirects.landing_path.clone(),
            },
        })
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    fn is_protected(&self, pathname: &str) -> bool {
        self.protected.iter().any(|ns| pathname.starts_with(ns))
    }
}

/// Resolve a pathname against the default route table.
pub fn can_access_page(role: Option<Role>, pathname: &str) -> Result<bool, PolicyError> {
    DEFAULT_TABLE.can_access(role, pathname)
}

fn validate_pathname(pathname: &str) -> Result<(), PolicyError> {
    if pathname.is_empty() {
        return Err(PolicyError::InvalidArgument("pathname must not be empty"));
    }
    if !pathname.starts_with('/') {
        return Err(PolicyError::InvalidArgument(
            "pathname must start with a slash",
        ));
    }
    Ok(())
}

/// Where to send a denied page load. Both targets are configuration, not
/// policy: the engine only reports which one applies.
#[derive(Clone, Debug)]
pub struct RedirectPolicy {
    pub login_path: String,
    pub landing_path: String,
}

impl Default for RedirectPolicy {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            landing_path: "/dashboard".to_string(),
        }
    }
}

/// Outcome of a page guard check. Login redirects carry the originally
/// requested pathname so the caller can preserve it as a return-to
/// parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageDecision {
    Allow,
    RedirectToLogin { login_path: String, next: String },
    RedirectToLanding { landing_path: String },
}
