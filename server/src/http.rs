use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::{self, HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use platform_api::{ApiError, ApiResult};
use platform_authn::{CurrentUser, SessionStore};
use platform_authz::{
    Action, ApprovalCeiling, PageDecision, Resource, Role, RouteTable, approval_ceiling,
    can_approve_loan, require_permission,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sessions: Arc<SessionStore>,
    pub routes: RouteTable,
}

#[derive(Clone, Debug)]
pub struct ServeConfig {
    addr: SocketAddr,
}

impl ServeConfig {
    pub fn new(host: IpAddr, port: u16) -> Self {
        Self {
            addr: SocketAddr::from((host, port)),
        }
    }
}

pub async fn serve(config: ServeConfig, state: AppState) -> anyhow::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    info!(%config.addr, "authorization service listening");
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();
    let allow_origin = if allowed.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(allowed)
    };
    CorsLayer::new()
        .allow_credentials(true)
        .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION])
        .allow_methods([Method::POST, Method::GET])
        .allow_origin(allow_origin)
}

pub fn build_router(state: AppState) -> Router {
    let request_id = MakeRequestUuid;
    let header_name = HeaderName::from_static("x-request-id");
    Router::new()
        .route("/health", get(health_handler))
        .route("/v1/me", get(me_handler))
        .route("/v1/authorize/page", get(authorize_page_handler))
        .route("/v1/authorize/action", post(authorize_action_handler))
        .route("/v1/authorize/loan", post(authorize_loan_handler))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(header_name.clone(), request_id))
                .layer(PropagateRequestIdLayer::new(header_name))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.cors_allowed_origins)),
        )
        .with_state(state)
}

/// Bearer token if present, session cookie otherwise. The cookie is only
/// read here; issuing and refreshing it belongs to the session store.
fn extract_token(state: &AppState, headers: &HeaderMap, jar: &CookieJar) -> Option<String> {
    let bearer = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| {
            let (scheme, token) = value.split_once(' ')?;
            scheme
                .eq_ignore_ascii_case("bearer")
                .then(|| token.trim().to_string())
        });
    bearer.or_else(|| {
        jar.get(&state.config.session_cookie)
            .map(|cookie| cookie.value().to_string())
    })
}

/// Resolve the caller. Any session-store failure downgrades to
/// unauthenticated so an unreachable store can never turn into an allow.
async fn current_user(state: &AppState, headers: &HeaderMap, jar: &CookieJar) -> Option<CurrentUser> {
    let token = extract_token(state, headers, jar)?;
    match state.sessions.resolve(&token).await {
        Ok(user) => user,
        Err(err) => {
            warn!(error = %err, "session resolution failed; treating as unauthenticated");
            None
        }
    }
}

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        ok: true,
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    version: &'static str,
}

async fn me_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> ApiResult<Json<MePayload>> {
    let user = current_user(&state, &headers, &jar)
        .await
        .ok_or(ApiError::Unauthorized)?;
    Ok(Json(MePayload {
        user_id: user.user_id,
        role: user.role,
    }))
}

#[derive(Serialize)]
struct MePayload {
    user_id: Uuid,
    role: Role,
}

#[derive(Deserialize)]
struct PageQuery {
    path: String,
}

async fn authorize_page_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> ApiResult<Response> {
    let user = current_user(&state, &headers, &jar).await;
    let decision = state
        .routes
        .decide(user.map(|u| u.role), &query.path, &state.config.redirects)
        .map_err(ApiError::from)?;
    Ok(match decision {
        PageDecision::Allow => StatusCode::NO_CONTENT.into_response(),
        PageDecision::RedirectToLogin { login_path, next } => {
            Redirect::to(&login_redirect(&login_path, &next)).into_response()
        }
        PageDecision::RedirectToLanding { landing_path } => {
            Redirect::to(&landing_path).into_response()
        }
    })
}

/// Append the originally requested pathname as a `next` parameter.
fn login_redirect(login_path: &str, next: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("next", next)
        .finish();
    format!("{login_path}?{query}")
}

#[derive(Deserialize)]
struct ActionRequest {
    resource: String,
    action: String,
}

async fn authorize_action_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Json(request): Json<ActionRequest>,
) -> ApiResult<StatusCode> {
    let user = current_user(&state, &headers, &jar)
        .await
        .ok_or(ApiError::Unauthorized)?;
    let resource = Resource::from_str(&request.resource)
        .ok_or_else(|| ApiError::InvalidInput(format!("unknown resource {}", request.resource)))?;
    let action = Action::from_str(&request.action)
        .ok_or_else(|| ApiError::InvalidInput(format!("unknown action {}", request.action)))?;
    require_permission(user.role, resource, action)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
struct LoanApprovalRequest {
    amount: f64,
}

#[derive(Serialize)]
struct LoanApprovalResponse {
    approved: bool,
    /// Per-role ceiling; absent for unlimited approvers.
    ceiling: Option<f64>,
}

async fn authorize_loan_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Json(request): Json<LoanApprovalRequest>,
) -> ApiResult<Json<LoanApprovalResponse>> {
    let user = current_user(&state, &headers, &jar)
        .await
        .ok_or(ApiError::Unauthorized)?;
    let approved = can_approve_loan(user.role, request.amount)?;
    let ceiling = match approval_ceiling(user.role) {
        ApprovalCeiling::Unlimited => None,
        ApprovalCeiling::UpTo(ceiling) => Some(ceiling),
        ApprovalCeiling::Denied => Some(0.0),
    };
    Ok(Json(LoanApprovalResponse { approved, ceiling }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        signal(SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    ctrl_c.await;

    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    };
}
