//! Session cookie plumbing
//!
//! Visitors are tracked by an opaque random id in an `HttpOnly` cookie. The
//! id carries no meaning on its own; it only keys the unlock store.

use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;

/// Generate a fresh opaque session id (128 bits, URL-safe base64).
pub fn new_session_id() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Extract the session id from the request's `Cookie` header, if present.
pub fn session_id_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let raw = headers.get(COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == cookie_name && !value.is_empty()).then(|| value.to_string())
    })
}

/// Build the `Set-Cookie` value for a newly issued session id.
///
/// `HttpOnly` keeps the id away from scripts; `SameSite=Lax` still lets the
/// login redirect round-trip carry it.
pub fn set_cookie_value(cookie_name: &str, session_id: &str) -> String {
    format!("{cookie_name}={session_id}; Path=/; HttpOnly; SameSite=Lax")
}
