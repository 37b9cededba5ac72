//! Path protection gate
//!
//! The core of the crate: given a request path, decide whether it is guarded
//! by a protected-page record and whether the current session has already
//! unlocked it.
//!
//! ## Decision model
//!
//! ```text
//! bypass capability?      -- yes -->  Allow
//!        | no
//! alias-resolve + lowercase + normalize
//!        |
//! first matching rule?    -- none -->  Allow
//!        | matched pid
//! session unlocked pid?   -- yes -->  Allow
//!        | no
//! RedirectToLogin(pid) + cache-suppression signal
//! ```
//!
//! Evaluation is pure and idempotent per request: the same path, session
//! unlock set and rule set always produce the same decision. Collaborator
//! failures are surfaced as [`crate::error::GateError`] rather than silently
//! treated as "no protected pages"; the HTTP layer maps them to fail-open or
//! fail-closed per configuration.

pub mod engine;
pub mod matcher;
pub mod paths;
pub mod types;

pub use engine::AccessGate;
pub use matcher::find_match;
pub use paths::{normalize_request_path, strip_wildcard, validate_rule_path};
pub use types::{CacheSuppressor, Decision, GateRequest, LogOnlySuppressor};
