//! Utility functions shared across the application.

mod secret;

pub use secret::SecretString;

use std::fmt::Display;

/// Builder for URL query strings.
///
/// Parameters are URL-encoded and joined in insertion order.
///
/// # Example
/// ```ignore
/// let query = QueryBuilder::new()
///     .param("destination", "/private/report?year=2025")
///     .param("protected_page", 4)
///     .build();
/// // "?destination=%2Fprivate%2Freport%3Fyear%3D2025&protected_page=4"
/// ```
#[derive(Default)]
pub struct QueryBuilder {
    params: Vec<(String, String)>,
}

impl QueryBuilder {
    /// Create a new empty query builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter.
    pub fn param(mut self, key: &str, value: impl Display) -> Self {
        self.params.push((
            key.to_string(),
            urlencoding::encode(&value.to_string()).into_owned(),
        ));
        self
    }

    /// Build the query string.
    ///
    /// Returns an empty string if no parameters were added,
    /// otherwise returns "?key1=value1&key2=value2...".
    pub fn build(self) -> String {
        if self.params.is_empty() {
            String::new()
        } else {
            format!(
                "?{}",
                self.params
                    .into_iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect::<Vec<_>>()
                    .join("&")
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_builder_empty() {
        assert_eq!(QueryBuilder::new().build(), "");
    }

    #[test]
    fn test_query_builder_encodes_values() {
        let query = QueryBuilder::new()
            .param("destination", "/private/a?x=1")
            .param("protected_page", 3)
            .build();
        assert_eq!(query, "?destination=%2Fprivate%2Fa%3Fx%3D1&protected_page=3");
    }
}
