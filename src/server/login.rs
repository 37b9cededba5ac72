//! Protected page login endpoint
//!
//! GET renders the password prompt for a protected page; POST verifies the
//! submitted password, records the unlock for the visitor's session and
//! sends them back to the page they originally requested.

use crate::auth::password::verify_password;
use crate::server::{AppState, SessionId};
use axum::{
    Form,
    extract::{Extension, Query, State},
    http::{HeaderValue, StatusCode, header::LOCATION},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub protected_page: Option<u64>,
    pub destination: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub password: String,
    pub protected_page: u64,
    #[serde(default)]
    pub destination: Option<String>,
}

/// Render the password prompt.
pub async fn login_form(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
) -> Response {
    let Some(pid) = query.protected_page else {
        return (StatusCode::NOT_FOUND, "Protected page not found").into_response();
    };

    match state.store.get(pid).await {
        Ok(Some(_)) => Html(render_form(
            &state.config.protection.login_path,
            pid,
            query.destination.as_deref(),
            None,
        ))
        .into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Protected page not found").into_response(),
        Err(e) => {
            warn!(error = %e, pid, "Store unavailable while rendering login form");
            (StatusCode::SERVICE_UNAVAILABLE, "Page protection unavailable").into_response()
        }
    }
}

/// Verify a password submission and unlock the page for this session.
pub async fn login_submit(
    State(state): State<AppState>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    Form(form): Form<LoginForm>,
) -> Response {
    let page = match state.store.get(form.protected_page).await {
        Ok(Some(page)) => page,
        Ok(None) => {
            return (StatusCode::NOT_FOUND, "Protected page not found").into_response();
        }
        Err(e) => {
            warn!(error = %e, pid = form.protected_page, "Store unavailable during login");
            return (StatusCode::SERVICE_UNAVAILABLE, "Page protection unavailable")
                .into_response();
        }
    };

    if !verify_password(&form.password, &page.password_hash) {
        info!(pid = page.pid, "Rejected protected page password attempt");
        return Html(render_form(
            &state.config.protection.login_path,
            page.pid,
            form.destination.as_deref(),
            Some("Invalid password. Please try again."),
        ))
        .into_response();
    }

    state.sessions.unlock(&session_id, page.pid);
    info!(pid = page.pid, "Protected page unlocked for session");

    let destination = safe_destination(form.destination.as_deref());
    let mut response = StatusCode::SEE_OTHER.into_response();
    if let Ok(value) = HeaderValue::from_str(&destination) {
        response.headers_mut().insert(LOCATION, value);
    }
    response
}

/// Restrict post-login redirects to site-relative paths.
///
/// Anything with an authority or scheme part would make the login form an
/// open redirector.
fn safe_destination(destination: Option<&str>) -> String {
    match destination {
        Some(d) if d.starts_with('/') && !d.starts_with("//") && !d.contains("/\\") => {
            d.to_string()
        }
        _ => "/".to_string(),
    }
}

fn render_form(login_path: &str, pid: u64, destination: Option<&str>, error: Option<&str>) -> String {
    let action = format!(
        "{}{}",
        login_path,
        crate::util::QueryBuilder::new()
            .param("destination", destination.unwrap_or("/"))
            .param("protected_page", pid)
            .build()
    );

    let error_block = match error {
        Some(message) => format!(r#"<p class="error">{}</p>"#, escape_html(message)),
        None => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Protected page</title>
<style>
body {{ font-family: sans-serif; max-width: 26rem; margin: 4rem auto; }}
.error {{ color: #b00020; }}
input[type=password] {{ width: 100%; padding: 0.4rem; }}
button {{ margin-top: 0.8rem; padding: 0.4rem 1.2rem; }}
</style>
</head>
<body>
<h1>This page is protected</h1>
<p>Enter the password to view this page.</p>
{error_block}
<form method="post" action="{action}">
<input type="password" name="password" autofocus required>
<input type="hidden" name="protected_page" value="{pid}">
<input type="hidden" name="destination" value="{destination}">
<button type="submit">Unlock</button>
</form>
</body>
</html>
"#,
        error_block = error_block,
        action = escape_html(&action),
        pid = pid,
        destination = escape_html(destination.unwrap_or("/")),
    )
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_destination_accepts_relative_paths() {
        assert_eq!(safe_destination(Some("/private/x")), "/private/x");
        assert_eq!(safe_destination(Some("/a?b=c")), "/a?b=c");
    }

    #[test]
    fn test_safe_destination_rejects_external_targets() {
        assert_eq!(safe_destination(Some("//evil.example")), "/");
        assert_eq!(safe_destination(Some("https://evil.example")), "/");
        assert_eq!(safe_destination(Some("/\\evil.example")), "/");
        assert_eq!(safe_destination(None), "/");
    }

    #[test]
    fn test_render_form_escapes_destination() {
        let html = render_form("/protected-page", 3, Some(r#""><script>"#), None);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_render_form_includes_error() {
        let html = render_form("/protected-page", 3, Some("/x"), Some("Invalid password"));
        assert!(html.contains("Invalid password"));
        assert!(html.contains(r#"class="error""#));
    }
}
