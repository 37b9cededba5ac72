//! Principals and capability checks
//!
//! The gate asks exactly one permission question: does the requesting
//! principal hold the bypass capability? Holders never see the gate at all.
//! Password hashing for protected pages lives in [`password`].

pub mod password;

use crate::util::SecretString;

/// Capability id exempting its holder from all page protection checks.
pub const BYPASS_PROTECTION: &str = "bypass pages password protection";

/// Capability id for managing protected page records.
pub const ADMINISTER_PAGES: &str = "administer protected pages";

/// The principal behind a request, as extracted from HTTP headers.
#[derive(Debug, Clone, Default)]
pub struct Principal {
    /// Bearer token from the `Authorization` header, if any.
    pub bearer: Option<String>,
}

impl Principal {
    /// An unauthenticated visitor.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_bearer(token: impl Into<String>) -> Self {
        Self {
            bearer: Some(token.into()),
        }
    }
}

/// Decides whether a principal holds a named capability.
pub trait PermissionCheck: Send + Sync {
    fn has_capability(&self, principal: &Principal, capability: &str) -> bool;
}

/// Token-based permissions from configuration.
///
/// A request bearing the bypass token holds [`BYPASS_PROTECTION`]; one
/// bearing the admin token holds both [`ADMINISTER_PAGES`] and
/// [`BYPASS_PROTECTION`]. With no tokens configured, nobody holds anything.
#[derive(Debug, Default)]
pub struct TokenPermissions {
    bypass_token: Option<SecretString>,
    admin_token: Option<SecretString>,
}

impl TokenPermissions {
    pub fn new(bypass_token: Option<SecretString>, admin_token: Option<SecretString>) -> Self {
        Self {
            bypass_token,
            admin_token,
        }
    }

    fn bearer_matches(principal: &Principal, token: &Option<SecretString>) -> bool {
        match (&principal.bearer, token) {
            // Timing must not reveal how much of a guessed token matched.
            (Some(bearer), Some(token)) => password::constant_time_eq(
                bearer.as_bytes(),
                token.expose_secret().as_bytes(),
            ),
            _ => false,
        }
    }
}

impl PermissionCheck for TokenPermissions {
    fn has_capability(&self, principal: &Principal, capability: &str) -> bool {
        match capability {
            BYPASS_PROTECTION => {
                Self::bearer_matches(principal, &self.bypass_token)
                    || Self::bearer_matches(principal, &self.admin_token)
            }
            ADMINISTER_PAGES => Self::bearer_matches(principal, &self.admin_token),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn permissions() -> TokenPermissions {
        TokenPermissions::new(
            Some(SecretString::new("bypass-secret")),
            Some(SecretString::new("admin-secret")),
        )
    }

    #[test]
    fn test_anonymous_holds_nothing() {
        let perms = permissions();
        let anon = Principal::anonymous();
        assert!(!perms.has_capability(&anon, BYPASS_PROTECTION));
        assert!(!perms.has_capability(&anon, ADMINISTER_PAGES));
    }

    #[test]
    fn test_bypass_token_grants_bypass_only() {
        let perms = permissions();
        let principal = Principal::with_bearer("bypass-secret");
        assert!(perms.has_capability(&principal, BYPASS_PROTECTION));
        assert!(!perms.has_capability(&principal, ADMINISTER_PAGES));
    }

    #[test]
    fn test_admin_token_grants_both() {
        let perms = permissions();
        let principal = Principal::with_bearer("admin-secret");
        assert!(perms.has_capability(&principal, BYPASS_PROTECTION));
        assert!(perms.has_capability(&principal, ADMINISTER_PAGES));
    }

    #[test]
    fn test_token_prefixes_and_extensions_rejected() {
        let perms = permissions();
        for guess in ["admin", "admin-secret-x", "", "admin-secreT"] {
            let principal = Principal::with_bearer(guess);
            assert!(
                !perms.has_capability(&principal, ADMINISTER_PAGES),
                "{guess:?} must not match"
            );
        }
    }

    #[test]
    fn test_unconfigured_tokens_deny_everything() {
        let perms = TokenPermissions::default();
        let principal = Principal::with_bearer("anything");
        assert!(!perms.has_capability(&principal, BYPASS_PROTECTION));
    }

    #[test]
    fn test_unknown_capability_denied() {
        let perms = permissions();
        let principal = Principal::with_bearer("admin-secret");
        assert!(!perms.has_capability(&principal, "make coffee"));
    }
}
