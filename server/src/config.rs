use std::collections::HashMap;

use anyhow::{Result, anyhow, bail};
use platform_authn::{CurrentUser, SessionClient, SessionStore};
use platform_authz::{RedirectPolicy, Role};
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub cors_allowed_origins: Vec<String>,
    pub redirects: RedirectPolicy,
    pub session_cookie: String,
    session_api_url: Option<String>,
    session_api_token: Option<String>,
    fixed_sessions: HashMap<String, CurrentUser>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .filter_map(|s| {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
            .collect::<Vec<_>>();

        let redirects = RedirectPolicy {
            login_path: std::env::var("LOGIN_PATH").unwrap_or_else(|_| "/login".into()),
            landing_path: std::env::var("LANDING_PATH").unwrap_or_else(|_| "/dashboard".into()),
        };

        let session_cookie =
            std::env::var("SESSION_COOKIE").unwrap_or_else(|_| "mfi_session".into());

        let session_api_url = std::env::var("SESSION_API_URL").ok();
        let session_api_token = std::env::var("SESSION_API_KEY").ok();
        let fixed_sessions = match std::env::var("FIXED_SESSIONS") {
            Ok(raw) => parse_fixed_sessions(&raw)?,
            Err(_) => HashMap::new(),
        };

        Ok(Self {
            cors_allowed_origins,
            redirects,
            session_cookie,
            session_api_url,
            session_api_token,
            fixed_sessions,
        })
    }

    /// Pick the session source: fixed dev sessions when configured,
    /// otherwise the hosted session API.
    pub fn session_store(&self) -> Result<SessionStore> {
        if !self.fixed_sessions.is_empty() {
            return Ok(SessionStore::Fixed(self.fixed_sessions.clone()));
        }
        let base_url = self
            .session_api_url
            .clone()
            .ok_or_else(|| anyhow!("either SESSION_API_URL or FIXED_SESSIONS must be set"))?;
        Ok(SessionStore::Remote(SessionClient::new(
            base_url,
            self.session_api_token.clone(),
        )))
    }
}

/// Parse `token:role[:uuid]` pairs, comma separated. Dev-only convenience;
/// unknown roles are a configuration error rather than a silent deny.
fn parse_fixed_sessions(raw: &str) -> Result<HashMap<String, CurrentUser>> {
    let mut sessions = HashMap::new();
    for entry in raw.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let mut parts = entry.split(':');
        let token = parts
            .next()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| anyhow!("FIXED_SESSIONS entry missing token: {entry}"))?;
        let role_str = parts
            .next()
            .ok_or_else(|| anyhow!("FIXED_SESSIONS entry missing role: {entry}"))?;
        let role = Role::from_str(role_str)
            .ok_or_else(|| anyhow!("FIXED_SESSIONS entry has unknown role {role_str}"))?;
        let user_id = match parts.next() {
            Some(id) => Uuid::parse_str(id)
                .map_err(|_| anyhow!("FIXED_SESSIONS entry has invalid uuid: {entry}"))?,
            None => Uuid::new_v4(),
        };
        if parts.next().is_some() {
            bail!("FIXED_SESSIONS entry has trailing fields: {entry}");
        }
        sessions.insert(token.to_string(), CurrentUser { user_id, role });
    }
    Ok(sessions)
}

#[cfg(test)]
impl AppConfig {
    pub(crate) fn for_tests() -> Self {
        Self {
            cors_allowed_origins: Vec::new(),
            redirects: RedirectPolicy::default(),
            session_cookie: "mfi_session".into(),
            session_api_url: None,
            session_api_token: None,
            fixed_sessions: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_sessions_parse_role_and_optional_uuid() {
        let id = Uuid::new_v4();
        let raw = format!("tok-a:admin,tok-b:branch_manager:{id}");
        let sessions = parse_fixed_sessions(&raw).unwrap();
        assert_eq!(sessions["tok-a"].role, Role::Admin);
        assert_eq!(sessions["tok-b"].role, Role::BranchManager);
        assert_eq!(sessions["tok-b"].user_id, id);
    }

    #[test]
    fn unknown_fixed_session_roles_fail_fast() {
        assert!(parse_fixed_sessions("tok:superuser").is_err());
        assert!(parse_fixed_sessions(":admin").is_err());
    }
}
