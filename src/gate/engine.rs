//! Access gate
//!
//! Orchestrates the per-response decision: bypass check, alias resolution,
//! match lookup, session-unlock check, redirect construction. All
//! collaborators are injected, so the gate is unit-testable with fakes and
//! carries no hidden global state.

use crate::alias::AliasResolver;
use crate::auth::{BYPASS_PROTECTION, PermissionCheck};
use crate::error::GateError;
use crate::gate::matcher;
use crate::gate::paths::normalize_request_path;
use crate::gate::types::{CacheSuppressor, Decision, GateRequest};
use crate::session::SessionUnlocks;
use crate::store::PageStore;
use crate::util::QueryBuilder;
use std::sync::Arc;
use tracing::{debug, trace};

/// The protection gate, evaluated once per outbound response.
pub struct AccessGate {
    store: Arc<dyn PageStore>,
    sessions: Arc<dyn SessionUnlocks>,
    aliases: Arc<dyn AliasResolver>,
    permissions: Arc<dyn PermissionCheck>,
    cache: Arc<dyn CacheSuppressor>,
    login_path: String,
}

impl AccessGate {
    pub fn new(
        store: Arc<dyn PageStore>,
        sessions: Arc<dyn SessionUnlocks>,
        aliases: Arc<dyn AliasResolver>,
        permissions: Arc<dyn PermissionCheck>,
        cache: Arc<dyn CacheSuppressor>,
        login_path: impl Into<String>,
    ) -> Self {
        Self {
            store,
            sessions,
            aliases,
            permissions,
            cache,
            login_path: login_path.into(),
        }
    }

    /// The login endpoint redirects point at.
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Evaluate the gate for one request.
    ///
    /// Reads a fresh rule snapshot from the store on every call; a store
    /// failure is returned to the caller rather than treated as "no rules".
    pub async fn evaluate(&self, request: &GateRequest<'_>) -> Result<Decision, GateError> {
        if self
            .permissions
            .has_capability(request.principal, BYPASS_PROTECTION)
        {
            trace!(path = request.path, "Bypass capability held, gate skipped");
            return Ok(Decision::Allow);
        }

        // Normalize before the alias lookup: the alias table is keyed by
        // normalized paths, so a trailing slash or stray casing on the raw
        // request must not sidestep it.
        let candidate = self
            .aliases
            .alias_of(&normalize_request_path(request.path));

        let rules = self.store.list_rules().await?;
        let Some(rule) = matcher::find_match(&candidate, &rules) else {
            trace!(%candidate, "Path is not protected");
            return Ok(Decision::Allow);
        };

        if let Some(session_id) = request.session_id
            && self.sessions.is_unlocked(session_id, rule.pid)
        {
            debug!(pid = rule.pid, %candidate, "Session already unlocked");
            return Ok(Decision::Allow);
        }

        // The redirect must never be cached and replayed to another visitor.
        self.cache.suppress();

        let location = format!(
            "{}{}",
            self.login_path,
            QueryBuilder::new()
                .param("destination", request.original_url)
                .param("protected_page", rule.pid)
                .build()
        );

        debug!(pid = rule.pid, %candidate, "Redirecting to protected page login");

        Ok(Decision::RedirectToLogin {
            pid: rule.pid,
            location,
        })
    }
}
