//! Session resolution for the MFI suite.
//!
//! Authentication itself lives in the hosted auth service; this crate only
//! answers "who does this session token belong to". Every upstream failure
//! is surfaced as [`AuthnError`] so callers can apply the deny-by-default
//! posture: an unreachable session store is never an implicit allow.

use std::collections::HashMap;

use platform_authz::Role;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AuthnError {
    #[error("session store unreachable: {0}")]
    StoreUnreachable(#[source] reqwest::Error),
    #[error("malformed profile payload: {0}")]
    MalformedProfile(#[source] reqwest::Error),
}

/// Authenticated caller as reported by the session store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: Uuid,
    pub role: Role,
}

/// Profile shape returned by the hosted auth service.
#[derive(Debug, Deserialize)]
struct ProfilePayload {
    id: Uuid,
    role: String,
}

/// Client for the hosted session API.
#[derive(Clone, Debug)]
pub struct SessionClient {
    http: reqwest::Client,
    base_url: String,
    service_token: Option<String>,
}

impl SessionClient {
    pub fn new(base_url: impl Into<String>, service_token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            service_token,
        }
    }

    /// Resolve a bearer token to its profile. `Ok(None)` covers both an
    /// unknown/expired token and a profile carrying a role this deployment
    /// does not recognize.
    pub async fn current_user(&self, token: &str) -> Result<Option<CurrentUser>, AuthnError> {
        let url = format!("{}/auth/v1/user", self.base_url.trim_end_matches('/'));
        let mut request = self.http.get(&url).bearer_auth(token);
        if let Some(service_token) = &self.service_token {
            request = request.header("apikey", service_token);
        }
        let response = request.send().await.map_err(AuthnError::StoreUnreachable)?;
        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response
            .error_for_status()
            .map_err(AuthnError::StoreUnreachable)?;
        let profile: ProfilePayload = response
            .json()
            .await
            .map_err(AuthnError::MalformedProfile)?;
        Ok(accept_profile(profile.id, &profile.role))
    }
}

/// Session source used by the server: the hosted store in production, a
/// fixed token map for tests and local development.
#[derive(Clone, Debug)]
pub enum SessionStore {
    Remote(SessionClient),
    Fixed(HashMap<String, CurrentUser>),
}

impl SessionStore {
    pub async fn resolve(&self, token: &str) -> Result<Option<CurrentUser>, AuthnError> {
        match self {
            SessionStore::Remote(client) => client.current_user(token).await,
            SessionStore::Fixed(sessions) => Ok(sessions.get(token).cloned()),
        }
    }
}

fn accept_profile(user_id: Uuid, role: &str) -> Option<CurrentUser> {
    match Role::from_str(role) {
        Some(role) => Some(CurrentUser { user_id, role }),
        None => {
            warn!(%user_id, role, "profile carries an unknown role; treating as unauthenticated");
            None
        }
    }
}
