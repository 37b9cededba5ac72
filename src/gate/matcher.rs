//! Protected path matching
//!
//! Decides which protected-page rule, if any, guards a candidate path. Rules
//! are shell-style glob patterns with pinned semantics: `*` matches any
//! sequence of characters including the empty string and `/`; there is no
//! `?`, no character classes and no brace expansion. Patterns are translated
//! to anchored regexes, so matching is always full-string.
//!
//! Case-insensitivity comes from lowercasing both sides, not from regex
//! flags: candidates arrive lowercased and stored paths are lowercased here
//! before translation.

use crate::store::PageRule;
use regex::Regex;
use thiserror::Error;
use tracing::warn;

/// Why a stored pattern could not be used for matching.
///
/// Malformed patterns are skipped, never fatal: a single broken record must
/// not abort matching for the others.
#[derive(Error, Debug)]
pub enum PatternError {
    #[error("pattern must start with '/'")]
    MissingLeadingSlash,

    #[error("pattern does not translate to a valid regex: {0}")]
    Regex(#[from] regex::Error),
}

/// Translate a glob pattern into an anchored [`Regex`].
pub fn glob_to_regex(pattern: &str) -> Result<Regex, PatternError> {
    if !pattern.starts_with('/') {
        return Err(PatternError::MissingLeadingSlash);
    }

    let mut translated = String::with_capacity(pattern.len() + 4);
    translated.push('^');
    for chunk in pattern.split_inclusive('*') {
        match chunk.strip_suffix('*') {
            Some(literal) => {
                translated.push_str(&regex::escape(literal));
                translated.push_str(".*");
            }
            None => translated.push_str(&regex::escape(chunk)),
        }
    }
    translated.push('$');

    Ok(Regex::new(&translated)?)
}

/// Find the first rule guarding `candidate`.
///
/// `candidate` must be alias-resolved, lowercased and slash-normalized
/// (leading slash, no trailing slash). Per rule, in the order given:
///
/// 1. glob full-match of the rule's pattern against the candidate;
/// 2. the implicit-wildcard rule: a record registered as `{candidate}/*`
///    guards the bare candidate itself too.
///
/// The first hit wins. Stores return rules ascending by pid, so the oldest
/// matching record takes precedence.
pub fn find_match<'a>(candidate: &str, rules: &'a [PageRule]) -> Option<&'a PageRule> {
    let implicit = format!("{candidate}/*");

    for rule in rules {
        let pattern = rule.path.to_lowercase();

        match glob_to_regex(&pattern) {
            Ok(re) => {
                if re.is_match(candidate) {
                    return Some(rule);
                }
            }
            Err(error) => {
                warn!(pid = rule.pid, pattern = %rule.path, %error,
                    "Skipping malformed protected path pattern");
            }
        }

        if pattern == implicit {
            return Some(rule);
        }
    }

    None
}
