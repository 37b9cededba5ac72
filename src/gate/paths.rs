//! Path normalization and rule-path validation
//!
//! Candidates fed to the matcher always have a leading slash, no trailing
//! slash, and are lowercase. Rule paths entered through the admin API go
//! through the same normalization plus a routability probe: the wildcard
//! marker is stripped by a pure function before probing, so the probe itself
//! stays wildcard-agnostic.

use crate::error::PathRuleError;

/// Normalize a request path into matcher-candidate form.
pub fn normalize_request_path(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return "/".to_string();
    }
    let mut normalized = trimmed.to_lowercase();
    if !normalized.starts_with('/') {
        normalized.insert(0, '/');
    }
    normalized
}

/// Remove all wildcard markers from a path.
///
/// Used to turn a pattern like `/private/*` into a probe-able plain path
/// before asking whether it is routable.
pub fn strip_wildcard(path: &str) -> String {
    path.replace('*', "")
}

/// Validate and normalize a protected path rule entered by an administrator.
///
/// `is_routable` is the injected probe deciding whether a plain (wildcard
/// stripped) path exists on the site. Returns the normalized, lowercased
/// form to store.
pub fn validate_rule_path(
    raw: &str,
    is_routable: impl Fn(&str) -> bool,
) -> Result<String, PathRuleError> {
    let trimmed = raw.trim();
    let entered = match trimmed.trim_end_matches([' ', '\\', '/']) {
        // The site root is a legitimate rule; it must survive slash trimming.
        "" if trimmed.starts_with('/') => "/",
        entered => entered,
    };

    if entered.is_empty() {
        return Err(PathRuleError::Empty);
    }
    if !entered.starts_with('/') {
        return Err(PathRuleError::MissingLeadingSlash);
    }

    let probe = {
        let stripped = strip_wildcard(entered);
        let stripped = stripped.trim_end_matches('/');
        if stripped.is_empty() {
            "/".to_string()
        } else {
            stripped.to_string()
        }
    };
    if !is_routable(&probe) {
        return Err(PathRuleError::NotRoutable {
            path: entered.to_string(),
        });
    }

    Ok(entered.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/Foo/Bar", "/foo/bar")]
    #[case("/foo/", "/foo")]
    #[case("/foo///", "/foo")]
    #[case("/", "/")]
    #[case("", "/")]
    #[case("  /Spaced  ", "/spaced")]
    #[case("no-slash", "/no-slash")]
    fn normalizes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_request_path(input), expected);
    }

    #[test]
    fn test_strip_wildcard() {
        assert_eq!(strip_wildcard("/private/*"), "/private/");
        assert_eq!(strip_wildcard("/pri*vate*"), "/private");
        assert_eq!(strip_wildcard("/plain"), "/plain");
    }

    #[test]
    fn test_validate_accepts_and_lowercases() {
        let path = validate_rule_path("/New-Events/*", |_| true).unwrap();
        assert_eq!(path, "/new-events/*");
    }

    #[test]
    fn test_validate_trims_trailing_junk() {
        let path = validate_rule_path("/events/ \\/", |_| true).unwrap();
        assert_eq!(path, "/events");
    }

    #[test]
    fn test_validate_accepts_site_root() {
        assert_eq!(validate_rule_path("/", |_| true).unwrap(), "/");
        assert_eq!(validate_rule_path(" / ", |_| true).unwrap(), "/");

        let probed = std::cell::RefCell::new(String::new());
        validate_rule_path("/", |p| {
            *probed.borrow_mut() = p.to_string();
            true
        })
        .unwrap();
        assert_eq!(probed.into_inner(), "/");
    }

    #[test]
    fn test_validate_requires_leading_slash() {
        assert!(matches!(
            validate_rule_path("events", |_| true),
            Err(PathRuleError::MissingLeadingSlash)
        ));
    }

    #[test]
    fn test_validate_rejects_empty() {
        assert!(matches!(
            validate_rule_path("   ", |_| true),
            Err(PathRuleError::Empty)
        ));
    }

    #[test]
    fn test_validate_probes_without_wildcard() {
        let probed = std::cell::RefCell::new(String::new());
        let result = validate_rule_path("/private/*", |p| {
            *probed.borrow_mut() = p.to_string();
            true
        });
        assert!(result.is_ok());
        assert_eq!(probed.into_inner(), "/private");
    }

    #[test]
    fn test_validate_unroutable_rejected() {
        assert!(matches!(
            validate_rule_path("/nowhere", |_| false),
            Err(PathRuleError::NotRoutable { .. })
        ));
    }
}
