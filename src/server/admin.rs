//! Protected page administration API
//!
//! JSON CRUD for protected-page records, guarded by the admin bearer token.
//! Paths are validated the same way the original entry form validates them:
//! trimmed, absolute, wildcard stripped before the routability probe, and
//! duplicates rejected across alias forms. Password hashes never leave the
//! store through this API.

use crate::auth::{ADMINISTER_PAGES, password::hash_password};
use crate::error::StoreError;
use crate::gate::validate_rule_path;
use crate::server::{AppState, middleware::principal_from_headers};
use axum::{
    Json,
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Serialize)]
pub struct PageSummary {
    pub pid: u64,
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct CreatePageRequest {
    pub path: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePageRequest {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
struct ApiError {
    error: String,
}

fn api_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ApiError {
            error: message.into(),
        }),
    )
        .into_response()
}

fn store_error_response(err: StoreError) -> Response {
    match err {
        StoreError::NotFound { .. } => api_error(StatusCode::NOT_FOUND, err.to_string()),
        StoreError::DuplicatePath { .. } => api_error(StatusCode::CONFLICT, err.to_string()),
        _ => api_error(StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
    }
}

/// Require the admin capability for everything below `/admin`.
pub async fn require_admin(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let principal = principal_from_headers(req.headers());
    if state
        .permissions
        .has_capability(&principal, ADMINISTER_PAGES)
    {
        next.run(req).await
    } else {
        api_error(StatusCode::UNAUTHORIZED, "admin token required")
    }
}

/// GET /admin/pages
pub async fn list_pages(State(state): State<AppState>) -> Response {
    match state.store.list_rules().await {
        Ok(rules) => Json(
            rules
                .into_iter()
                .map(|r| PageSummary {
                    pid: r.pid,
                    path: r.path,
                })
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => store_error_response(e),
    }
}

/// POST /admin/pages
pub async fn create_page(
    State(state): State<AppState>,
    Json(request): Json<CreatePageRequest>,
) -> Response {
    if request.password.is_empty() {
        return api_error(StatusCode::BAD_REQUEST, "password must not be empty");
    }

    let path = match validate_rule_path(&request.path, |_| true) {
        Ok(path) => path,
        Err(e) => return api_error(StatusCode::BAD_REQUEST, e.to_string()),
    };

    if let Err(response) = reject_duplicates(&state, &path, None).await {
        return response;
    }

    match state
        .store
        .insert(path.clone(), hash_password(&request.password))
        .await
    {
        Ok(pid) => {
            info!(pid, path, "Protected page created");
            (
                StatusCode::CREATED,
                Json(PageSummary { pid, path }),
            )
                .into_response()
        }
        Err(e) => store_error_response(e),
    }
}

/// PUT /admin/pages/{pid}
pub async fn update_page(
    State(state): State<AppState>,
    Path(pid): Path<u64>,
    Json(request): Json<UpdatePageRequest>,
) -> Response {
    let path = match &request.path {
        Some(raw) => match validate_rule_path(raw, |_| true) {
            Ok(path) => Some(path),
            Err(e) => return api_error(StatusCode::BAD_REQUEST, e.to_string()),
        },
        None => None,
    };

    if let Some(path) = &path
        && let Err(response) = reject_duplicates(&state, path, Some(pid)).await
    {
        return response;
    }

    let password_hash = request
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .map(hash_password);

    match state.store.update(pid, path, password_hash).await {
        Ok(()) => {
            info!(pid, "Protected page updated");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => store_error_response(e),
    }
}

/// DELETE /admin/pages/{pid}
pub async fn delete_page(State(state): State<AppState>, Path(pid): Path<u64>) -> Response {
    match state.store.remove(pid).await {
        Ok(()) => {
            info!(pid, "Protected page deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => store_error_response(e),
    }
}

/// A path collides when the path itself, its canonical form or its public
/// alias is already registered to a different record.
async fn reject_duplicates(
    state: &AppState,
    path: &str,
    exclude_pid: Option<u64>,
) -> Result<(), Response> {
    let mut candidates = vec![path.to_string()];
    let canonical = state.aliases.canonical_of(path);
    if canonical != path {
        candidates.push(canonical);
    }
    let alias = state.aliases.alias_of(path);
    if alias != path && !candidates.contains(&alias) {
        candidates.push(alias);
    }

    for candidate in candidates {
        match state.store.find_by_path(&candidate).await {
            Ok(Some(existing)) if Some(existing) != exclude_pid => {
                return Err(api_error(
                    StatusCode::CONFLICT,
                    format!(
                        "Duplicate path entry is not allowed. There is already a path or its alias at '{candidate}'."
                    ),
                ));
            }
            Ok(_) => {}
            Err(e) => return Err(store_error_response(e)),
        }
    }

    Ok(())
}
