//! Gate core types

use crate::auth::Principal;
use tracing::debug;

/// Result of one gate evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The response passes through untouched.
    Allow,
    /// The response is replaced with a redirect to the login prompt.
    RedirectToLogin {
        /// Id of the protected page that matched.
        pid: u64,
        /// Fully built redirect target, login path plus query string.
        location: String,
    },
}

impl Decision {
    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Decision::RedirectToLogin { .. })
    }
}

/// Everything the gate needs to know about one request.
#[derive(Debug)]
pub struct GateRequest<'a> {
    /// Raw request path as received, before alias resolution.
    pub path: &'a str,
    /// Original URL (path and query) used as the login destination.
    pub original_url: &'a str,
    /// Session id from the visitor's cookie, if one was presented.
    pub session_id: Option<&'a str>,
    /// The requesting principal.
    pub principal: &'a Principal,
}

/// Fire-and-forget signal telling the response pipeline to never cache the
/// current response.
///
/// Invoked exactly when a [`Decision::RedirectToLogin`] is produced. A cached
/// redirect served to a different visitor would leak the gate state across
/// sessions, so suppression is mandatory, not an optimization.
pub trait CacheSuppressor: Send + Sync {
    fn suppress(&self);
}

/// Suppressor for deployments without a shared response cache: the redirect
/// response itself already carries `Cache-Control: no-store`, so the signal
/// only needs a trace.
#[derive(Debug, Default)]
pub struct LogOnlySuppressor;

impl CacheSuppressor for LogOnlySuppressor {
    fn suppress(&self) {
        debug!("Response caching suppressed for protected page redirect");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_predicates() {
        assert!(Decision::Allow.is_allow());
        assert!(!Decision::Allow.is_redirect());

        let redirect = Decision::RedirectToLogin {
            pid: 3,
            location: "/protected-page?destination=%2Fx&protected_page=3".into(),
        };
        assert!(redirect.is_redirect());
        assert!(!redirect.is_allow());
    }
}
