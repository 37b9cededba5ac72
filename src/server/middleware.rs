//! Gate middleware
//!
//! Runs once per response: resolves the visitor's session cookie, extracts
//! the principal, evaluates the gate and either passes the response through
//! or replaces it with a redirect to the login prompt. Redirects always
//! carry `Cache-Control: no-store`.

use crate::auth::Principal;
use crate::config::StoreErrorPolicy;
use crate::gate::{Decision, GateRequest};
use crate::server::{AppState, SessionId};
use crate::session::cookie;
use axum::{
    body::Body,
    extract::State,
    http::{
        HeaderMap, HeaderValue, Request, StatusCode,
        header::{AUTHORIZATION, CACHE_CONTROL, LOCATION, SET_COOKIE},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

/// Extract the bearer principal from the `Authorization` header.
pub fn principal_from_headers(headers: &HeaderMap) -> Principal {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(Principal::with_bearer)
        .unwrap_or_else(Principal::anonymous)
}

pub async fn protect_pages(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let protection = &state.config.protection;

    // Resolve the session id up front so the login handler can rely on it.
    let existing = cookie::session_id_from_headers(req.headers(), &protection.session_cookie);
    let issued = existing.is_none();
    let session_id = existing.unwrap_or_else(cookie::new_session_id);
    req.extensions_mut().insert(SessionId(session_id.clone()));

    let path = req.uri().path().to_string();
    let original_url = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| path.clone());

    // The login endpoint itself must stay reachable or the redirect loops.
    let decision = if path == protection.login_path {
        Decision::Allow
    } else {
        let principal = principal_from_headers(req.headers());
        let gate_request = GateRequest {
            path: &path,
            original_url: &original_url,
            session_id: Some(&session_id),
            principal: &principal,
        };

        match state.gate.evaluate(&gate_request).await {
            Ok(decision) => decision,
            Err(e) => match protection.on_store_error {
                StoreErrorPolicy::Allow => {
                    warn!(error = %e, path, "Gate evaluation failed, failing open");
                    Decision::Allow
                }
                StoreErrorPolicy::Deny => {
                    error!(error = %e, path, "Gate evaluation failed, failing closed");
                    return attach_cookie(
                        (StatusCode::SERVICE_UNAVAILABLE, "Page protection unavailable")
                            .into_response(),
                        protection.session_cookie.as_str(),
                        &session_id,
                        issued,
                    );
                }
            },
        }
    };

    let response = match decision {
        Decision::Allow => next.run(req).await,
        Decision::RedirectToLogin { location, .. } => redirect_to_login(&location),
    };

    attach_cookie(
        response,
        protection.session_cookie.as_str(),
        &session_id,
        issued,
    )
}

/// Build the 302 redirect replacing the protected response.
fn redirect_to_login(location: &str) -> Response {
    let mut response = StatusCode::FOUND.into_response();
    if let Ok(value) = HeaderValue::from_str(location) {
        response.headers_mut().insert(LOCATION, value);
    }
    // Never let a cache replay this redirect to another visitor.
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn attach_cookie(
    mut response: Response,
    cookie_name: &str,
    session_id: &str,
    issued: bool,
) -> Response {
    if issued
        && let Ok(value) = HeaderValue::from_str(&cookie::set_cookie_value(cookie_name, session_id))
    {
        response.headers_mut().append(SET_COOKIE, value);
    }
    response
}
